use std::collections::HashSet;

use crate::config::Config;
use crate::tree::{MAX_HEADING_LEVEL, Node, Section};

/// Apply every configured filter to a document tree.
///
/// Ignored sections are removed first, then omitted headings are dropped,
/// then the remaining headings are shifted.
pub fn apply_filters(root: Section, config: &Config) -> Section {
    let root = ignore_sections(root, &config.ignore_sections);
    let root = omit_headings(root, &config.omit_headings);
    shift_headings(root, config.heading_shift)
}

/// Remove every section whose heading text is listed, along with its subtree.
pub fn ignore_sections(root: Section, ignored: &[String]) -> Section {
    if ignored.is_empty() {
        return root;
    }
    let ignored: HashSet<&str> = ignored.iter().map(String::as_str).collect();
    drop_ignored(root, &ignored)
}

fn drop_ignored(mut section: Section, ignored: &HashSet<&str>) -> Section {
    section.children = section
        .children
        .into_iter()
        .filter_map(|node| match node {
            Node::Section(child) => {
                if heading_matches(&child, ignored) {
                    log::debug!("ignoring section {:?}", child.heading.as_ref().map(|h| h.text()));
                    None
                } else {
                    Some(Node::Section(drop_ignored(child, ignored)))
                }
            }
            block => Some(block),
        })
        .collect();
    section
}

/// Drop the heading of every section whose heading text is listed.
///
/// The section's blocks and subsections move up into its parent, at the
/// position the section occupied.
pub fn omit_headings(root: Section, omitted: &[String]) -> Section {
    if omitted.is_empty() {
        return root;
    }
    let omitted: HashSet<&str> = omitted.iter().map(String::as_str).collect();
    splice_omitted(root, &omitted)
}

fn splice_omitted(mut section: Section, omitted: &HashSet<&str>) -> Section {
    let mut children = Vec::with_capacity(section.children.len());
    for node in section.children {
        match node {
            Node::Section(child) => {
                let child = splice_omitted(child, omitted);
                if heading_matches(&child, omitted) {
                    log::debug!("omitting heading {:?}", child.heading.as_ref().map(|h| h.text()));
                    children.extend(child.children);
                } else {
                    children.push(Node::Section(child));
                }
            }
            block => children.push(block),
        }
    }
    section.children = children;
    section
}

/// Raise every heading by `shift` levels, saturating at h6.
pub fn shift_headings(mut section: Section, shift: u8) -> Section {
    if shift == 0 {
        return section;
    }
    if let Some(heading) = section.heading.as_mut() {
        heading.level = heading.level.saturating_add(shift).min(MAX_HEADING_LEVEL);
    }
    section.children = section
        .children
        .into_iter()
        .map(|node| match node {
            Node::Section(child) => Node::Section(shift_headings(child, shift)),
            block => block,
        })
        .collect();
    section
}

fn heading_matches(section: &Section, names: &HashSet<&str>) -> bool {
    section
        .heading
        .as_ref()
        .is_some_and(|heading| names.contains(heading.text().as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{Block, Span};
    use crate::parser::parse;
    use crate::tree::build_tree;
    use pretty_assertions::assert_eq;

    const DOC: &str = "\
# Title

Intro.

## Notes

Hidden.

### Sub

Deeper.

## Summary

Done.
";

    fn tree(markdown: &str) -> Section {
        build_tree(parse(markdown))
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn heading_levels(section: &Section, out: &mut Vec<(String, u8)>) {
        if let Some(heading) = &section.heading {
            out.push((heading.text(), heading.level));
        }
        for child in section.sections() {
            heading_levels(child, out);
        }
    }

    fn paragraph(text: &str) -> Node {
        Node::Block(Block::Paragraph {
            content: vec![Span::Text(text.to_string())],
        })
    }

    #[test]
    fn ignore_drops_whole_subtree() {
        let root = ignore_sections(tree(DOC), &names(&["Notes"]));
        let title = root.sections().next().unwrap();

        let mut levels = Vec::new();
        heading_levels(&root, &mut levels);
        assert_eq!(levels, vec![("Title".to_string(), 1), ("Summary".to_string(), 2)]);
        assert_eq!(title.children.len(), 2);
        assert_eq!(title.children[0], paragraph("Intro."));
    }

    #[test]
    fn ignore_is_idempotent() {
        let ignored = names(&["Notes", "Sub"]);
        let once = ignore_sections(tree(DOC), &ignored);
        let twice = ignore_sections(once.clone(), &ignored);
        assert_eq!(once, twice);
    }

    #[test]
    fn ignore_matching_is_exact_and_case_sensitive() {
        let root = ignore_sections(tree(DOC), &names(&["notes", "Note"]));
        assert_eq!(root, tree(DOC));
    }

    #[test]
    fn omit_keeps_content_in_place() {
        let root = omit_headings(tree(DOC), &names(&["Notes"]));
        let title = root.sections().next().unwrap();

        assert_eq!(title.children.len(), 4);
        assert_eq!(title.children[0], paragraph("Intro."));
        assert_eq!(title.children[1], paragraph("Hidden."));
        let Node::Section(sub) = &title.children[2] else {
            panic!("expected the Sub section to move up");
        };
        assert_eq!(sub.heading.as_ref().unwrap().text(), "Sub");
        let Node::Section(summary) = &title.children[3] else {
            panic!("expected Summary to stay in place");
        };
        assert_eq!(summary.heading.as_ref().unwrap().text(), "Summary");
    }

    #[test]
    fn omit_nested_headings() {
        let root = omit_headings(tree(DOC), &names(&["Notes", "Sub"]));
        let title = root.sections().next().unwrap();
        assert_eq!(title.children[1], paragraph("Hidden."));
        assert_eq!(title.children[2], paragraph("Deeper."));
    }

    #[test]
    fn ignore_runs_before_omit() {
        let config = Config {
            ignore_sections: names(&["Notes"]),
            omit_headings: names(&["Sub"]),
            ..Config::default()
        };
        let root = apply_filters(tree(DOC), &config);
        let title = root.sections().next().unwrap();
        assert!(!title.children.contains(&paragraph("Deeper.")));
    }

    #[test]
    fn shift_saturates_at_six() {
        let root = shift_headings(tree("# one\n## two\n###### six\n"), 3);
        let mut levels = Vec::new();
        heading_levels(&root, &mut levels);
        assert_eq!(
            levels,
            vec![
                ("one".to_string(), 4),
                ("two".to_string(), 5),
                ("six".to_string(), 6),
            ]
        );
    }

    #[test]
    fn shift_level_six_stays_six() {
        for shift in 1..=5 {
            let root = shift_headings(tree("###### six\n"), shift);
            assert_eq!(root.sections().next().unwrap().level(), 6);
        }
    }

    #[test]
    fn refiltering_with_defaults_is_a_no_op() {
        let config = Config {
            ignore_sections: names(&["Summary"]),
            omit_headings: names(&["Notes"]),
            heading_shift: 2,
            ..Config::default()
        };
        let filtered = apply_filters(tree(DOC), &config);
        assert_eq!(apply_filters(filtered.clone(), &Config::default()), filtered);
    }
}
