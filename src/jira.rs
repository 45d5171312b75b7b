use crate::block::{Block, ListItem, Span, plain_text};
use crate::config::Config;
use crate::tree::{Heading, Node, Section};

/// Convert a filtered section tree to Jira text formatting notation
pub fn emit(root: &Section, config: &Config) -> String {
    let mut writer = Writer {
        config,
        out: String::new(),
        list_markers: Vec::new(),
        in_list: false,
        in_link: false,
    };
    writer.section(root);
    writer.out
}

struct Writer<'a> {
    config: &'a Config,
    out: String,
    // Markers of the enclosing list levels, outermost first
    list_markers: Vec<char>,
    in_list: bool,
    in_link: bool,
}

impl Writer<'_> {
    /// Separate blocks with a blank line; list items only with a newline.
    fn begin_block(&mut self, list_item: bool) {
        if !self.out.is_empty() && !(list_item && self.in_list) {
            self.out.push('\n');
        }
        self.in_list = list_item;
    }

    fn section(&mut self, section: &Section) {
        if let Some(heading) = &section.heading {
            self.heading(heading);
        }
        for child in &section.children {
            match child {
                Node::Block(block) => self.block(block),
                Node::Section(section) => self.section(section),
            }
        }
    }

    fn heading(&mut self, heading: &Heading) {
        self.begin_block(false);
        // A heading ends any list, nested ones included.
        self.list_markers.clear();
        if self.config.convert_headings_to_bold {
            let content = match heading.content.as_slice() {
                [Span::Bold(inner)] => inner.as_slice(),
                content => content,
            };
            self.out.push('*');
            self.spans(content);
            self.out.push('*');
        } else {
            self.out.push_str(&format!("h{}. ", heading.level));
            self.spans(&heading.content);
        }
        self.out.push('\n');
    }

    fn block(&mut self, block: &Block) {
        match block {
            Block::Heading { level, content } => {
                // Headings normally live on sections; a stray one still renders.
                self.heading(&Heading {
                    level: *level,
                    content: content.clone(),
                });
            }
            Block::Paragraph { content } => {
                self.begin_block(false);
                self.line(content);
                self.out.push('\n');
            }
            Block::ListItem(item) => {
                self.begin_block(true);
                self.list_item(item);
            }
            Block::CodeBlock { language, content } => {
                self.begin_block(false);
                match language {
                    Some(lang) => self.out.push_str(&format!("{{code:{lang}}}\n")),
                    None => self.out.push_str("{code}\n"),
                }
                self.out.push_str(content);
                if !content.is_empty() && !content.ends_with('\n') {
                    self.out.push('\n');
                }
                self.out.push_str("{code}\n");
            }
            Block::Image { url, alt } => {
                self.begin_block(false);
                self.image(url, alt);
                self.out.push('\n');
            }
            Block::Table { headers, rows } => {
                if headers.is_empty() && rows.is_empty() {
                    return;
                }
                self.begin_block(false);
                self.table(headers, rows);
            }
            Block::Blockquote { lines } => {
                self.begin_block(false);
                for line in lines {
                    self.out.push_str("bq. ");
                    self.line(line);
                    self.out.push('\n');
                }
            }
            Block::Rule => {
                self.begin_block(false);
                self.out.push_str("----\n");
            }
        }
    }

    fn list_item(&mut self, item: &ListItem) {
        let marker = if item.ordered { '#' } else { '*' };
        // Parent levels keep their own marker so mixed lists render as `#*`.
        self.list_markers.truncate(item.indent);
        while self.list_markers.len() < item.indent {
            self.list_markers.push(marker);
        }
        self.list_markers.push(marker);

        self.out.extend(self.list_markers.iter());
        self.out.push(' ');
        match item.checked {
            Some(true) => self.out.push_str("(/) "),
            Some(false) => self.out.push_str("( ) "),
            None => {}
        }
        self.spans(&item.content);
        self.out.push('\n');
    }

    fn table(&mut self, headers: &[Vec<Span>], rows: &[Vec<Vec<Span>>]) {
        if !headers.is_empty() {
            for cell in headers {
                self.out.push_str("||");
                self.cell(cell);
            }
            self.out.push_str("||\n");
        }
        for row in rows {
            for cell in row {
                self.out.push('|');
                self.cell(cell);
            }
            self.out.push_str("|\n");
        }
    }

    fn cell(&mut self, cell: &[Span]) {
        // Jira collapses empty cells into their neighbours
        if cell.is_empty() {
            self.out.push(' ');
        } else {
            self.spans(cell);
        }
    }

    /// Write spans that start a line of output, escaping a leading run of
    /// text Jira would read as a block marker.
    fn line(&mut self, spans: &[Span]) {
        let start = self.out.len();
        self.spans(spans);
        if starts_with_block_marker(&self.out[start..]) {
            self.out.insert(start, '\\');
        }
    }

    fn spans(&mut self, spans: &[Span]) {
        for (i, span) in spans.iter().enumerate() {
            self.span(span, spans.get(i + 1));
        }
    }

    fn span(&mut self, span: &Span, next: Option<&Span>) {
        match span {
            Span::Text(text) => escape_into(text, &mut self.out),
            Span::Bold(inner) => self.wrapped('*', inner, next),
            Span::Italic(inner) => self.wrapped('_', inner, next),
            Span::Strikethrough(inner) => self.wrapped('-', inner, next),
            Span::Code(code) => {
                self.out.push_str("{{");
                for ch in code.chars() {
                    if matches!(ch, '{' | '}') {
                        self.out.push('\\');
                    }
                    self.out.push(ch);
                }
                self.out.push_str("}}");
            }
            Span::Link { url, content } => {
                self.out.push('[');
                let text = plain_text(content);
                if contains_image(content) || (!text.trim().is_empty() && text != *url) {
                    // `|alt=` inside the link text would split the link token
                    self.in_link = true;
                    self.spans(content);
                    self.in_link = false;
                    self.out.push('|');
                }
                self.out.push_str(url);
                self.out.push(']');
            }
            Span::Image { url, alt } => self.image(url, alt),
            Span::LineBreak => self.out.push_str("\\\\"),
        }
    }

    /// Jira only recognises `*x*` at word boundaries; inside a word the
    /// markers need braces.
    fn wrapped(&mut self, token: char, inner: &[Span], next: Option<&Span>) {
        let after_word = self.out.chars().last().is_some_and(char::is_alphanumeric);
        let before_word = next.is_some_and(starts_with_word);
        if after_word || before_word {
            self.out.push('{');
            self.out.push(token);
            self.out.push('}');
            self.spans(inner);
            self.out.push('{');
            self.out.push(token);
            self.out.push('}');
        } else {
            self.out.push(token);
            self.spans(inner);
            self.out.push(token);
        }
    }

    fn image(&mut self, url: &str, alt: &str) {
        self.out.push('!');
        self.out.push_str(url);
        let alt: String = alt.chars().filter(|ch| !matches!(ch, '!' | '|')).collect();
        let alt = alt.trim();
        if self.config.keep_image_descriptions && !self.in_link && !alt.is_empty() {
            self.out.push_str("|alt=");
            self.out.push_str(alt);
        }
        self.out.push('!');
    }
}

fn escape_into(text: &str, out: &mut String) {
    // Escape characters that open Jira markup
    let chars: Vec<char> = text.chars().collect();
    for (i, &ch) in chars.iter().enumerate() {
        let escape = match ch {
            '*' | '_' | '{' | '}' | '[' | ']' | '|' | '!' | '^' | '~' => true,
            // `-x-` and `+x+` only format at word edges; `well-known` is safe.
            '-' | '+' => {
                let prev = i.checked_sub(1).map(|p| chars[p]);
                let next = chars.get(i + 1).copied();
                let opens = !prev.is_some_and(char::is_alphanumeric)
                    && next.is_some_and(|c| !c.is_whitespace());
                let closes = prev.is_some_and(|c| !c.is_whitespace())
                    && !next.is_some_and(char::is_alphanumeric);
                opens || closes
            }
            _ => false,
        };
        if escape {
            out.push('\\');
        }
        out.push(ch);
    }
}

/// Line prefixes Jira treats as headings, quotes or list items.
fn starts_with_block_marker(line: &str) -> bool {
    let bytes = line.as_bytes();
    let heading = bytes.len() >= 4
        && bytes[0] == b'h'
        && (b'1'..=b'6').contains(&bytes[1])
        && bytes[2] == b'.'
        && bytes[3] == b' ';
    heading || ["bq. ", "- ", "* ", "# "].iter().any(|marker| line.starts_with(marker))
}

fn starts_with_word(span: &Span) -> bool {
    match span {
        Span::Text(text) => text.chars().next().is_some_and(char::is_alphanumeric),
        _ => false,
    }
}

fn contains_image(spans: &[Span]) -> bool {
    spans.iter().any(|span| match span {
        Span::Image { .. } => true,
        Span::Bold(inner) | Span::Italic(inner) | Span::Strikethrough(inner) => {
            contains_image(inner)
        }
        _ => false,
    })
}
