//! Bibliographic fields from the text of an article's first page.

use lazy_static::lazy_static;
use regex::Regex;
use muse_core::ArticleMetadata;

lazy_static! {
    static ref YEAR: Regex = Regex::new(r"\b(?:19|20)\d{2}\b").unwrap();
    static ref VOLUME: Regex = Regex::new(r"Volume\s*(\d+)").unwrap();
    static ref ISSUE: Regex = Regex::new(r"Issue\s*(\d+)").unwrap();
    static ref NUMBER: Regex = Regex::new(r"\bNo\.?\s*(\d+)").unwrap();
}

fn first_capture(re: &Regex, text: &str) -> String {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Title and authors are the first two non-empty lines; the numeric fields
/// are the first match of their pattern anywhere on the page. Anything that
/// does not match is left empty.
pub fn extract_metadata(first_page: &str) -> ArticleMetadata {
    let mut lines = first_page.lines().map(str::trim).filter(|l| !l.is_empty());
    let title = lines.next().unwrap_or_default().to_string();
    let authors = lines.next().unwrap_or_default().to_string();

    ArticleMetadata {
        title,
        authors,
        year: YEAR
            .find(first_page)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default(),
        volume: first_capture(&VOLUME, first_page),
        issue: first_capture(&ISSUE, first_page),
        journal_issue: first_capture(&NUMBER, first_page),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_golem_first_page() {
        let meta = extract_metadata("The Golem and the Machine\nJ. Rosen\nVolume 12, Issue 3, 2020");
        assert_eq!(meta.title, "The Golem and the Machine");
        assert_eq!(meta.authors, "J. Rosen");
        assert_eq!(meta.year, "2020");
        assert_eq!(meta.volume, "12");
        assert_eq!(meta.issue, "3");
        assert_eq!(meta.journal_issue, "");
    }

    #[test]
    fn test_no_digits_leaves_numeric_fields_empty() {
        let meta = extract_metadata("\n  A Title Only  \n\nSomebody\nno numbers at all here");
        assert_eq!(meta.title, "A Title Only");
        assert_eq!(meta.authors, "Somebody");
        assert_eq!(meta.year, "");
        assert_eq!(meta.volume, "");
        assert_eq!(meta.issue, "");
        assert_eq!(meta.journal_issue, "");
    }

    #[test]
    fn test_number_and_embedded_years() {
        let meta = extract_metadata("Title\nAuthor\nJQR No. 7 (id 120245) published 1999");
        assert_eq!(meta.journal_issue, "7");
        assert_eq!(meta.year, "1999");
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(extract_metadata(""), ArticleMetadata::default());
    }
}
