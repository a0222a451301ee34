//! Free-text search over gallery descriptions.

use regex::{Regex, RegexBuilder};
use std::sync::Arc;

use onereel_core::MediaItem;

use crate::gallery::GallerySnapshot;

/// A compiled, case-insensitive search query.
///
/// Blank queries match everything. Queries that aren't valid regex syntax
/// are matched as literal text instead of failing.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    raw: String,
    pattern: Option<Regex>,
}

impl SearchQuery {
    pub fn new(query: &str) -> Self {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Self {
                raw: String::new(),
                pattern: None,
            };
        }

        let pattern = match compile(trimmed) {
            Ok(re) => re,
            Err(err) => {
                tracing::debug!(query = trimmed, error = %err, "Query is not a valid pattern, matching literally");
                // Escaped patterns only fail on the compiled size limit.
                match compile(&regex::escape(trimmed)) {
                    Ok(re) => re,
                    Err(_) => {
                        return Self {
                            raw: trimmed.to_string(),
                            pattern: None,
                        }
                    }
                }
            }
        };

        Self {
            raw: trimmed.to_string(),
            pattern: Some(pattern),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_blank(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn is_match(&self, description: &str) -> bool {
        match &self.pattern {
            Some(re) => re.is_match(description),
            None if self.raw.is_empty() => true,
            None => description
                .to_lowercase()
                .contains(&self.raw.to_lowercase()),
        }
    }
}

fn compile(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

/// Whether `item` should be shown for `query`.
pub fn matches(item: &MediaItem, query: &str) -> bool {
    SearchQuery::new(query).is_match(item.description())
}

/// Matching entries of `snapshot`, in slot order.
pub fn filter_gallery(snapshot: &GallerySnapshot, query: &SearchQuery) -> Vec<(usize, Arc<MediaItem>)> {
    snapshot
        .occupied()
        .filter(|(_, item)| query.is_match(item.description()))
        .map(|(index, item)| (index, item.clone()))
        .collect()
}
