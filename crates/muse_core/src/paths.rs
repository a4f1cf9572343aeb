//! Deterministic on-disk layout for downloads and mirrored summaries.

use std::path::{Path, PathBuf};
use crate::types::{Article, IssueInfo};

/// Make a name safe to use as a single path segment: drop everything outside
/// `[A-Za-z0-9_\- ]`, then turn each whitespace run into one underscore.
pub fn sanitize_segment(name: &str) -> String {
    let kept: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | ' '))
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join("_")
}

/// `<base>/<journal>/<year>/volume_<volume>/<month>`
pub fn issue_folder(base: &Path, journal: &str, issue: &IssueInfo) -> PathBuf {
    base.join(sanitize_segment(journal))
        .join(sanitize_segment(&issue.year))
        .join(format!("volume_{}", sanitize_segment(&issue.volume)))
        .join(sanitize_segment(&issue.month))
}

/// `<root>/<journal>/<title>[_<authors>].txt`
///
/// A title with nothing left after sanitizing (e.g. Hebrew script) is
/// replaced by the stem of the article's file, which is unique per article.
pub fn summary_mirror_path(root: &Path, article: &Article) -> PathBuf {
    let mut title = sanitize_segment(&article.title);
    if title.is_empty() {
        title = Path::new(&article.file_path)
            .file_stem()
            .map(|stem| sanitize_segment(&stem.to_string_lossy()))
            .filter(|stem| !stem.is_empty())
            .unwrap_or_else(|| "untitled".to_string());
    }
    let authors = sanitize_segment(&article.authors);
    let file_name = if authors.is_empty() {
        format!("{}.txt", title)
    } else {
        format!("{}_{}.txt", title, authors)
    };
    root.join(sanitize_segment(&article.journal)).join(file_name)
}
