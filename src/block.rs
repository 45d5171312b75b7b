/// Inline text spans with formatting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    Text(String),
    Bold(Vec<Span>),
    Italic(Vec<Span>),
    Strikethrough(Vec<Span>),
    Code(String),
    Link { url: String, content: Vec<Span> },
    Image { url: String, alt: String },
    LineBreak,
}

/// A single list item. Nesting is carried by `indent` (0 for top level).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub ordered: bool,
    pub indent: usize,
    /// For task lists: None = not a task, Some(false) = unchecked, Some(true) = checked
    pub checked: Option<bool>,
    pub content: Vec<Span>,
}

/// Block-level elements parsed from Markdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading {
        level: u8,
        content: Vec<Span>,
    },
    Paragraph {
        content: Vec<Span>,
    },
    ListItem(ListItem),
    CodeBlock {
        language: Option<String>,
        content: String,
    },
    /// An image standing alone in its paragraph.
    Image {
        url: String,
        alt: String,
    },
    Table {
        headers: Vec<Vec<Span>>,
        rows: Vec<Vec<Vec<Span>>>,
    },
    Blockquote {
        lines: Vec<Vec<Span>>,
    },
    Rule,
}

/// Flatten spans to their visible text, dropping all formatting.
pub fn plain_text(spans: &[Span]) -> String {
    let mut out = String::new();
    for span in spans {
        push_plain_text(span, &mut out);
    }
    out
}

fn push_plain_text(span: &Span, out: &mut String) {
    match span {
        Span::Text(text) | Span::Code(text) => out.push_str(text),
        Span::Bold(inner) | Span::Italic(inner) | Span::Strikethrough(inner) => {
            for span in inner {
                push_plain_text(span, out);
            }
        }
        Span::Link { content, .. } => {
            for span in content {
                push_plain_text(span, out);
            }
        }
        Span::Image { alt, .. } => out.push_str(alt),
        Span::LineBreak => out.push(' '),
    }
}
