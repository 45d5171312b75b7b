mod block;
mod config;
mod error;
mod filter;
mod jira;
mod parser;
mod tree;

pub use block::{Block, ListItem, Span, plain_text};
pub use config::{Config, DEFAULT_CONFIG, ExportFormat, MAX_HEADING_SHIFT};
pub use error::{ConfigError, LoadError};
pub use filter::{apply_filters, ignore_sections, omit_headings, shift_headings};
pub use tree::{Heading, MAX_HEADING_LEVEL, Node, Section, build_tree};

/// Parse markdown text into a vector of blocks.
pub fn parse(markdown: &str) -> Vec<Block> {
    parser::parse(markdown)
}

/// Convert markdown to Jira notation using the default config.
pub fn markdown_to_jira(markdown: &str) -> String {
    let config = Config::default();
    let root = build_tree(parse(markdown));
    jira::emit(&root, &config)
}

/// Convert markdown to the notation selected by `config`.
///
/// The config is validated before anything is parsed; that is the only way
/// this can fail. Malformed markdown degrades to literal text.
pub fn convert(markdown: &str, config: &Config) -> Result<String, ConfigError> {
    let format = config.validate()?;

    let blocks = parse(markdown);
    log::debug!("parsed {} blocks", blocks.len());

    let root = apply_filters(build_tree(blocks), config);
    log::debug!(
        "emitting {} top-level nodes as {}",
        root.children.len(),
        format.as_str()
    );

    let output = match format {
        ExportFormat::Jira => jira::emit(&root, config),
    };
    Ok(output)
}
