//! Text bank file format and entry normalization.
//!
//! A bank file is a JSON array. Each element is either a string (one entry) or
//! an array of strings (one multi-line entry, joined with `\n`). Anything else
//! is skipped. A file that is missing, unreadable or not an array reads as an
//! empty bank; failures are logged, never returned.

use itertools::Itertools;
use serde::de::IgnoredAny;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Deserialize)]
#[serde(untagged)]
enum BankItem {
    Text(String),
    Paragraphs(Vec<String>),
    Other(IgnoredAny),
}

impl BankItem {
    fn into_text(self) -> Option<String> {
        match self {
            BankItem::Text(text) => Some(text),
            BankItem::Paragraphs(lines) if !lines.is_empty() => Some(lines.join("\n")),
            BankItem::Paragraphs(_) | BankItem::Other(_) => None,
        }
    }
}

/// Unify line endings, trim trailing whitespace on every line and drop
/// leading/trailing blank lines.
pub fn normalize_entry(raw: &str) -> String {
    raw.replace("\r\n", "\n")
        .replace('\r', "\n")
        .lines()
        .map(str::trim_end)
        .join("\n")
        .trim_matches('\n')
        .to_string()
}

/// Normalize, drop empty entries and order shortest first.
///
/// The sort is stable, so equal-length entries keep their source order.
pub fn prepare_bank<I, T>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    let mut bank: Vec<String> = raw
        .into_iter()
        .map(|text| normalize_entry(text.as_ref()))
        .filter(|text| !text.is_empty())
        .collect();
    bank.sort_by_key(|text| text.chars().count());
    bank
}

/// Raw entries from bank file contents, before normalization.
pub fn parse_bank(content: &str) -> Vec<String> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    match serde_json::from_str::<Vec<BankItem>>(content) {
        Ok(items) => items.into_iter().filter_map(BankItem::into_text).collect(),
        Err(err) => {
            warn!(error = %err, "bank file is not a JSON array of texts");
            Vec::new()
        }
    }
}

pub fn read_bank_file(path: &Path) -> Vec<String> {
    if !path.exists() {
        debug!(path = %path.display(), "bank file not found");
        return Vec::new();
    }
    match fs::read_to_string(path) {
        Ok(content) => parse_bank(&content),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to read bank file");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn test_normalize_line_endings() {
        assert_eq!(normalize_entry("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn test_normalize_trims_trailing_whitespace_and_blank_edges() {
        let raw = "\n  \n  first line   \nsecond\t\n\n \n";
        assert_eq!(normalize_entry(raw), "  first line\nsecond");
    }

    #[test]
    fn test_normalize_keeps_inner_blank_lines() {
        assert_eq!(normalize_entry("one\n\ntwo"), "one\n\ntwo");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let samples = [
            "",
            "plain",
            "\r\n\r\nHello  \r\nworld\r\n\r\n",
            "  indented\n\n\tmixed \t\n",
            "\u{00e9}t\u{00e9}  \r",
        ];
        for raw in samples {
            let once = normalize_entry(raw);
            assert_eq!(normalize_entry(&once), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn test_prepare_bank_sorts_by_char_count_stably() {
        let bank = prepare_bank(["ccc", "a", "bb", "zz", "\u{00e9}\u{00e9}"]);
        assert_eq!(bank, vec!["a", "bb", "zz", "\u{00e9}\u{00e9}", "ccc"]);
    }

    #[test]
    fn test_prepare_bank_drops_blank_entries() {
        let bank = prepare_bank(["", "  \n \r\n", "text"]);
        assert_eq!(bank, vec!["text"]);
    }

    #[test]
    fn test_parse_strings_and_groups() {
        let raw = parse_bank(r#"["one", ["first", "second"], 3, [], [1, 2], {"k": "v"}]"#);
        assert_eq!(raw, vec!["one".to_string(), "first\nsecond".to_string()]);
    }

    #[test]
    fn test_parse_strips_bom() {
        let raw = parse_bank("\u{feff}[\"hi\"]");
        assert_eq!(raw, vec!["hi".to_string()]);
    }

    #[test]
    fn test_parse_malformed_is_empty() {
        assert!(parse_bank("not json").is_empty());
        assert!(parse_bank(r#"{"texts": ["a"]}"#).is_empty());
        assert!(parse_bank("").is_empty());
    }

    #[test]
    fn test_read_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        assert!(read_bank_file(&dir.path().join("nope.json")).is_empty());
    }

    #[test]
    fn test_read_bank_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"["beta", "alpha"]"#).unwrap();
        assert_eq!(read_bank_file(file.path()), vec!["beta", "alpha"]);
    }
}
