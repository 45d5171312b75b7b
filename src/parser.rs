use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::block::{Block, ListItem, Span, plain_text};

/// Strip YAML frontmatter from the beginning of markdown content
fn strip_frontmatter(markdown: &str) -> &str {
    if !markdown.starts_with("---") {
        return markdown;
    }
    // Find the closing ---
    if let Some(end) = markdown[3..].find("\n---") {
        // Skip past the closing --- and any trailing newline
        let after_frontmatter = &markdown[3 + end + 4..];
        after_frontmatter.trim_start_matches('\n')
    } else {
        markdown
    }
}

/// Parse markdown text into a flat list of blocks.
///
/// Never fails: input the grammar does not recognize ends up as paragraph text.
pub fn parse(markdown: &str) -> Vec<Block> {
    let markdown = strip_frontmatter(markdown);
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let parser = Parser::new_ext(markdown, options);
    let mut blocks = Vec::new();
    let mut state = ParseState::default();

    for event in parser {
        process_event(event, &mut state, &mut blocks);
    }

    blocks
}

#[derive(Default)]
struct ParseState {
    // Current inline content being built
    spans: Vec<Span>,
    // Parent span buffers while inside bold, italic, links and images
    span_stack: Vec<Vec<Span>>,
    // Destinations of the open links/images, innermost last
    url_stack: Vec<String>,

    // Current heading level (if in a heading)
    heading_level: Option<u8>,

    // Code block state
    in_code_block: bool,
    code_language: Option<String>,
    code_content: String,

    // List state, one frame per open list
    list_stack: Vec<ListFrame>,

    // Block quote state
    quote_depth: usize,
    quote_lines: Vec<Vec<Span>>,

    // Table state
    in_table: bool,
    table_headers: Vec<Vec<Span>>,
    table_rows: Vec<Vec<Vec<Span>>>,
    current_row: Vec<Vec<Span>>,
    in_table_head: bool,
}

struct ListFrame {
    ordered: bool,
    current: Option<PendingItem>,
}

#[derive(Default)]
struct PendingItem {
    checked: Option<bool>,
    content: Vec<Span>,
}

impl ParseState {
    fn in_quote(&self) -> bool {
        self.quote_depth > 0
    }

    fn push_text(&mut self, text: &str) {
        if let Some(Span::Text(last)) = self.spans.last_mut() {
            last.push_str(text);
        } else {
            self.spans.push(Span::Text(text.to_string()));
        }
    }

    fn open_span(&mut self) {
        self.span_stack.push(std::mem::take(&mut self.spans));
    }

    fn close_span(&mut self, wrap: impl FnOnce(Vec<Span>) -> Span) {
        let inner = std::mem::take(&mut self.spans);
        if let Some(mut parent) = self.span_stack.pop() {
            parent.push(wrap(inner));
            self.spans = parent;
        }
    }
}

fn process_event(event: Event, state: &mut ParseState, blocks: &mut Vec<Block>) {
    match event {
        // Headings
        Event::Start(Tag::Heading { level, .. }) => {
            state.heading_level = Some(heading_level_to_u8(level));
        }
        Event::End(TagEnd::Heading(_)) => {
            if let Some(level) = state.heading_level.take() {
                let content = std::mem::take(&mut state.spans);
                if state.in_quote() || !state.list_stack.is_empty() {
                    finish_paragraph(content, state, blocks);
                } else {
                    blocks.push(Block::Heading { level, content });
                }
            }
        }

        // Paragraphs
        Event::Start(Tag::Paragraph) => {}
        Event::End(TagEnd::Paragraph) => {
            let content = std::mem::take(&mut state.spans);
            finish_paragraph(content, state, blocks);
        }

        // Raw HTML is kept as literal text
        Event::Start(Tag::HtmlBlock) => {}
        Event::End(TagEnd::HtmlBlock) => {
            let content = std::mem::take(&mut state.spans);
            let text = plain_text(&content);
            let text = text.trim_end();
            if !text.is_empty() {
                finish_paragraph(vec![Span::Text(text.to_string())], state, blocks);
            }
        }
        Event::Html(html) | Event::InlineHtml(html) => {
            state.push_text(&html);
        }

        // Text content
        Event::Text(text) => {
            if state.in_code_block {
                state.code_content.push_str(&text);
            } else {
                state.push_text(&text);
            }
        }

        // Inline code
        Event::Code(code) => {
            state.spans.push(Span::Code(code.into_string()));
        }

        // Bold
        Event::Start(Tag::Strong) => state.open_span(),
        Event::End(TagEnd::Strong) => state.close_span(Span::Bold),

        // Italic
        Event::Start(Tag::Emphasis) => state.open_span(),
        Event::End(TagEnd::Emphasis) => state.close_span(Span::Italic),

        // Strikethrough
        Event::Start(Tag::Strikethrough) => state.open_span(),
        Event::End(TagEnd::Strikethrough) => state.close_span(Span::Strikethrough),

        // Links
        Event::Start(Tag::Link { dest_url, .. }) => {
            state.url_stack.push(dest_url.into_string());
            state.open_span();
        }
        Event::End(TagEnd::Link) => {
            let url = state.url_stack.pop().unwrap_or_default();
            state.close_span(|content| Span::Link { url, content });
        }

        // Images: the alt text arrives as inline events between start and end
        Event::Start(Tag::Image { dest_url, .. }) => {
            state.url_stack.push(dest_url.into_string());
            state.open_span();
        }
        Event::End(TagEnd::Image) => {
            let url = state.url_stack.pop().unwrap_or_default();
            state.close_span(|alt| Span::Image {
                url,
                alt: plain_text(&alt),
            });
        }

        // Code blocks
        Event::Start(Tag::CodeBlock(kind)) => {
            flush_list_item(state, blocks);
            state.in_code_block = true;
            state.code_language = match kind {
                CodeBlockKind::Fenced(lang) => {
                    let lang = lang.trim().to_string();
                    if lang.is_empty() { None } else { Some(lang) }
                }
                CodeBlockKind::Indented => None,
            };
            state.code_content.clear();
        }
        Event::End(TagEnd::CodeBlock) => {
            state.in_code_block = false;
            let content = std::mem::take(&mut state.code_content);
            let language = state.code_language.take();
            if state.in_quote() {
                for line in content.lines().filter(|line| !line.trim().is_empty()) {
                    state.quote_lines.push(vec![Span::Code(line.to_string())]);
                }
            } else {
                blocks.push(Block::CodeBlock { language, content });
            }
        }

        // Lists. Items are emitted flat, each carrying its nesting depth.
        Event::Start(Tag::List(first_item)) => {
            if !state.in_quote() {
                flush_list_item(state, blocks);
                state.list_stack.push(ListFrame {
                    ordered: first_item.is_some(),
                    current: None,
                });
            }
        }
        Event::End(TagEnd::List(_)) => {
            if !state.in_quote() {
                state.list_stack.pop();
            }
        }

        Event::Start(Tag::Item) => {
            if !state.in_quote() {
                if let Some(list) = state.list_stack.last_mut() {
                    list.current = Some(PendingItem::default());
                }
            }
        }
        Event::End(TagEnd::Item) => {
            let remaining = std::mem::take(&mut state.spans);
            if state.in_quote() {
                if !remaining.is_empty() {
                    state.quote_lines.push(remaining);
                }
            } else if let Some(list) = state.list_stack.last_mut() {
                let item = match list.current.take() {
                    Some(mut item) => {
                        item.content.extend(remaining);
                        Some(item)
                    }
                    // The item was already flushed ahead of a nested block;
                    // trailing text becomes an item of its own.
                    None if !remaining.is_empty() => Some(PendingItem {
                        checked: None,
                        content: remaining,
                    }),
                    None => None,
                };
                if let Some(item) = item {
                    push_list_item(item, state, blocks);
                }
            }
        }

        // Task list checkboxes
        Event::TaskListMarker(checked) => {
            if state.in_quote() {
                return;
            }
            if let Some(list) = state.list_stack.last_mut() {
                if let Some(item) = list.current.as_mut() {
                    item.checked = Some(checked);
                }
            }
        }

        // Block quotes. Nested quotes are flattened into the outermost one.
        Event::Start(Tag::BlockQuote(_)) => {
            if !state.in_quote() {
                flush_list_item(state, blocks);
            }
            state.quote_depth += 1;
        }
        Event::End(TagEnd::BlockQuote(_)) => {
            state.quote_depth = state.quote_depth.saturating_sub(1);
            if !state.in_quote() {
                let lines = std::mem::take(&mut state.quote_lines);
                if !lines.is_empty() {
                    blocks.push(Block::Blockquote { lines });
                }
            }
        }

        // Tables
        Event::Start(Tag::Table(_)) => {
            flush_list_item(state, blocks);
            flush_quote(state, blocks);
            state.in_table = true;
            state.table_headers.clear();
            state.table_rows.clear();
        }
        Event::End(TagEnd::Table) => {
            state.in_table = false;
            let headers = std::mem::take(&mut state.table_headers);
            let rows = std::mem::take(&mut state.table_rows);
            blocks.push(Block::Table { headers, rows });
        }

        Event::Start(Tag::TableHead) => {
            state.in_table_head = true;
            state.current_row.clear();
        }
        Event::End(TagEnd::TableHead) => {
            state.in_table_head = false;
            state.table_headers = std::mem::take(&mut state.current_row);
        }

        Event::Start(Tag::TableRow) => {
            state.current_row.clear();
        }
        Event::End(TagEnd::TableRow) => {
            if !state.in_table_head {
                let row = std::mem::take(&mut state.current_row);
                state.table_rows.push(row);
            }
        }

        Event::Start(Tag::TableCell) => {
            state.spans.clear();
        }
        Event::End(TagEnd::TableCell) => {
            let cell_content = std::mem::take(&mut state.spans);
            state.current_row.push(cell_content);
        }

        // Horizontal rule
        Event::Rule => {
            flush_list_item(state, blocks);
            flush_quote(state, blocks);
            blocks.push(Block::Rule);
        }

        // Soft/hard breaks
        Event::SoftBreak => {
            state.push_text(" ");
        }
        Event::HardBreak => {
            state.spans.push(Span::LineBreak);
        }

        // Ignore other events
        _ => {}
    }
}

/// Route a finished run of inline content to wherever it belongs: the open
/// block quote, the open list item, or a new top-level block.
fn finish_paragraph(content: Vec<Span>, state: &mut ParseState, blocks: &mut Vec<Block>) {
    if content.is_empty() {
        return;
    }
    if state.in_quote() {
        state.quote_lines.push(content);
        return;
    }
    if let Some(list) = state.list_stack.last_mut() {
        let item = list.current.get_or_insert_with(PendingItem::default);
        if !item.content.is_empty() {
            item.content.push(Span::LineBreak);
        }
        item.content.extend(content);
        return;
    }

    if let [Span::Image { url, alt }] = content.as_slice() {
        blocks.push(Block::Image {
            url: url.clone(),
            alt: alt.clone(),
        });
    } else {
        blocks.push(Block::Paragraph { content });
    }
}

/// Emit the open list item ahead of a nested block so document order holds.
fn flush_list_item(state: &mut ParseState, blocks: &mut Vec<Block>) {
    if state.in_quote() || state.list_stack.is_empty() {
        return;
    }
    let pending = state
        .list_stack
        .last_mut()
        .and_then(|list| list.current.take());
    let mut item = pending.unwrap_or_default();
    item.content.append(&mut state.spans);
    if !item.content.is_empty() || item.checked.is_some() {
        push_list_item(item, state, blocks);
    }
}

/// Tables and rules have no quoted form in Jira, so they split the quote:
/// the lines gathered so far are emitted first and a new quote run follows.
fn flush_quote(state: &mut ParseState, blocks: &mut Vec<Block>) {
    if state.in_quote() && !state.quote_lines.is_empty() {
        let lines = std::mem::take(&mut state.quote_lines);
        blocks.push(Block::Blockquote { lines });
    }
}

fn push_list_item(item: PendingItem, state: &ParseState, blocks: &mut Vec<Block>) {
    let ordered = state.list_stack.last().is_some_and(|list| list.ordered);
    blocks.push(Block::ListItem(ListItem {
        ordered,
        indent: state.list_stack.len().saturating_sub(1),
        checked: item.checked,
        content: item.content,
    }));
}

fn heading_level_to_u8(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
