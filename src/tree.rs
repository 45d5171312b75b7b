//! Nesting of flat blocks into a section tree keyed by heading level.

use crate::block::{Block, Span, plain_text};

/// Highest heading level the notation supports.
pub const MAX_HEADING_LEVEL: u8 = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub level: u8,
    pub content: Vec<Span>,
}

impl Heading {
    /// Display text used for filter matching.
    pub fn text(&self) -> String {
        plain_text(&self.content).trim().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Block(Block),
    Section(Section),
}

/// A heading and everything it owns, in document order.
///
/// The document root is a section without a heading.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    pub heading: Option<Heading>,
    pub children: Vec<Node>,
}

impl Section {
    pub fn root() -> Self {
        Self::default()
    }

    /// Heading level, or 0 for the root.
    pub fn level(&self) -> u8 {
        self.heading.as_ref().map_or(0, |heading| heading.level)
    }

    /// Direct child sections.
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.children.iter().filter_map(|node| match node {
            Node::Section(section) => Some(section),
            Node::Block(_) => None,
        })
    }

    /// Content blocks attached directly to this section.
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.children.iter().filter_map(|node| match node {
            Node::Block(block) => Some(block),
            Node::Section(_) => None,
        })
    }
}

/// Build the section tree for a document.
///
/// A heading closes every open section at its level or deeper and opens a
/// new one under whatever remains. Levels may skip; a level-3 heading right
/// after a level-1 heading nests directly under it.
pub fn build_tree(blocks: Vec<Block>) -> Section {
    let mut stack = vec![Section::root()];

    for block in blocks {
        match block {
            Block::Heading { level, content } => {
                while stack.len() > 1 && stack.last().is_some_and(|top| top.level() >= level) {
                    close_top(&mut stack);
                }
                stack.push(Section {
                    heading: Some(Heading { level, content }),
                    children: Vec::new(),
                });
            }
            block => {
                if let Some(top) = stack.last_mut() {
                    top.children.push(Node::Block(block));
                }
            }
        }
    }

    while stack.len() > 1 {
        close_top(&mut stack);
    }
    stack.pop().unwrap_or_default()
}

fn close_top(stack: &mut Vec<Section>) {
    if let Some(section) = stack.pop() {
        if let Some(parent) = stack.last_mut() {
            parent.children.push(Node::Section(section));
        }
    }
}
