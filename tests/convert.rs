use md2jira::{Config, ConfigError, Node, build_tree, convert, ignore_sections, parse};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

const NOTES_DOC: &str = "# Title\n\nSome text.\n\n## Notes\n\nHidden.\n";

#[test]
fn ignored_section_and_shift() {
    let config = Config {
        ignore_sections: list(&["Notes"]),
        heading_shift: 1,
        ..Config::default()
    };
    let output = convert(NOTES_DOC, &config).unwrap();

    assert_eq!(output, "h2. Title\n\nSome text.\n");
    assert!(!output.contains("Notes"));
    assert!(!output.contains("Hidden."));
}

#[test]
fn omitted_heading_keeps_body() {
    let config = Config {
        omit_headings: list(&["Notes"]),
        ..Config::default()
    };
    let output = convert(NOTES_DOC, &config).unwrap();

    assert_eq!(output, "h1. Title\n\nSome text.\n\nHidden.\n");
    assert!(!output.contains("Notes"));
}

#[test]
fn sections_keep_document_order() {
    let markdown = "# A\nBody A\n## B\nBody B\n# C\nBody C\n";

    let root = build_tree(parse(markdown));
    let top: Vec<String> = root
        .sections()
        .map(|s| s.heading.as_ref().unwrap().text())
        .collect();
    assert_eq!(top, vec!["A", "C"]);
    let a = root.sections().next().unwrap();
    assert!(matches!(a.children.last(), Some(Node::Section(b)) if b.heading.as_ref().unwrap().text() == "B"));

    assert_eq!(
        convert(markdown, &Config::default()).unwrap(),
        "h1. A\n\nBody A\n\nh2. B\n\nBody B\n\nh1. C\n\nBody C\n"
    );
}

#[rstest]
#[case(1, 0, 1)]
#[case(1, 5, 6)]
#[case(3, 2, 5)]
#[case(4, 4, 6)]
#[case(6, 1, 6)]
#[case(6, 5, 6)]
fn heading_shift_saturates(#[case] level: usize, #[case] shift: u8, #[case] expected: usize) {
    let markdown = format!("{} Heading\n", "#".repeat(level));
    let config = Config {
        heading_shift: shift,
        ..Config::default()
    };
    assert_eq!(
        convert(&markdown, &config).unwrap(),
        format!("h{expected}. Heading\n")
    );
}

#[rstest]
#[case(true, "!https://example.com/a.png|alt=Architecture!\n")]
#[case(false, "!https://example.com/a.png!\n")]
fn image_description_policy(#[case] keep: bool, #[case] expected: &str) {
    let config = Config {
        keep_image_descriptions: keep,
        ..Config::default()
    };
    let output = convert("![Architecture](https://example.com/a.png)", &config).unwrap();
    assert_eq!(output, expected);
    assert!(output.contains("https://example.com/a.png"));
    assert_eq!(output.contains("Architecture"), keep);
}

#[test]
fn ignore_pass_is_idempotent() {
    let root = build_tree(parse(NOTES_DOC));
    let ignored = list(&["Notes"]);
    let once = ignore_sections(root, &ignored);
    assert_eq!(ignore_sections(once.clone(), &ignored), once);
}

#[rstest]
#[case::shift_too_large(
    Config { heading_shift: 6, ..Config::default() },
    ConfigError::HeadingShiftOutOfRange(6)
)]
#[case::unknown_format(
    Config { export_format: "markdown".to_string(), ..Config::default() },
    ConfigError::UnsupportedExportFormat("markdown".to_string())
)]
fn invalid_config_is_rejected(#[case] config: Config, #[case] expected: ConfigError) {
    assert_eq!(convert("# Title", &config), Err(expected));
}

#[test]
fn invalid_config_is_rejected_even_for_empty_input() {
    let config = Config {
        heading_shift: 9,
        ..Config::default()
    };
    assert!(convert("", &config).is_err());
}

#[test]
fn empty_input_gives_empty_output() {
    assert_eq!(convert("", &Config::default()).unwrap(), "");
}

#[test]
fn full_document() {
    let markdown = "\
---
title: Release
---

# Release 2.1

Ships **faster** builds and a [changelog](https://example.com/cl).

## Changes

- Parser rewrite
  - handles `tables`
- [x] Docs

## Scratch

Internal notes.

## Example

```toml
heading_shift = 1
```

| Flag | Default |
|------|---------|
| bold | off |

> Quoted *remark*

---
";
    let config = Config {
        ignore_sections: list(&["Scratch"]),
        omit_headings: list(&["Example"]),
        heading_shift: 1,
        ..Config::default()
    };

    let expected = "\
h2. Release 2.1

Ships *faster* builds and a [changelog|https://example.com/cl].

h3. Changes

* Parser rewrite
** handles {{tables}}
* (/) Docs

{code:toml}
heading_shift = 1
{code}

||Flag||Default||
|bold|off|

bq. Quoted _remark_

----
";
    assert_eq!(convert(markdown, &config).unwrap(), expected);
}
