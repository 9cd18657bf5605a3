// src/record.rs
use serde::{Deserialize, Serialize};

/// Author shown when an upstream record carries no usable byline.
pub const DEFAULT_AUTHOR: &str = "Editorial Team";

/// Which upstream an aggregated record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Origin {
    Primary,
    Secondary,
    FallbackStatic,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Primary => "primary",
            Origin::Secondary => "secondary",
            Origin::FallbackStatic => "fallback-static",
        }
    }

    /// Parse a query-parameter origin hint. Unknown values are `None`
    /// so a bad hint widens the search instead of failing it.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "primary" => Some(Origin::Primary),
            "secondary" => Some(Origin::Secondary),
            "fallback-static" => Some(Origin::FallbackStatic),
            _ => None,
        }
    }
}

/// Cover image with an always-absolute URL (see `normalize::absolutize`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    pub alt_text: String,
}

/// Canonical post-normalization content record. Immutable once built;
/// a fresh set is constructed on every aggregation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRecord {
    /// Unique within its origin namespace; never empty.
    pub id: String,
    pub title: String,
    /// Plain text, bounded length, never cut mid-word.
    pub summary: String,
    /// Sanitized HTML fragment.
    pub body: String,
    /// Unix seconds.
    pub published_at: u64,
    /// Human-readable date derived from `published_at`.
    pub display_date: String,
    pub author: String,
    pub image: Option<Image>,
    pub origin: Origin,
    /// Natural key for de-duplication: slug when the upstream has one,
    /// otherwise `<origin>-<id>`.
    pub source_key: String,
}

impl ContentRecord {
    /// Static stand-ins served only when every upstream fetch came back
    /// empty, so list pages never render a blank state on an outage.
    pub fn placeholders() -> Vec<ContentRecord> {
        vec![
            ContentRecord {
                id: "placeholder-1".to_string(),
                title: "Finding the Right Neighborhood".to_string(),
                summary: "What to weigh when choosing where to put down roots: schools, commute, and the feel of a street on a Sunday morning.".to_string(),
                body: "<p>What to weigh when choosing where to put down roots: schools, commute, and the feel of a street on a Sunday morning.</p>".to_string(),
                published_at: 1_700_000_000,
                display_date: "November 14, 2023".to_string(),
                author: DEFAULT_AUTHOR.to_string(),
                image: None,
                origin: Origin::FallbackStatic,
                source_key: "finding-the-right-neighborhood".to_string(),
            },
            ContentRecord {
                id: "placeholder-2".to_string(),
                title: "Preparing Your Home for Sale".to_string(),
                summary: "Small repairs and honest staging move a listing faster than any filter on the photos.".to_string(),
                body: "<p>Small repairs and honest staging move a listing faster than any filter on the photos.</p>".to_string(),
                published_at: 1_690_000_000,
                display_date: "July 22, 2023".to_string(),
                author: DEFAULT_AUTHOR.to_string(),
                image: None,
                origin: Origin::FallbackStatic,
                source_key: "preparing-your-home-for-sale".to_string(),
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_parse_is_case_insensitive_and_lenient() {
        assert_eq!(Origin::parse("Primary"), Some(Origin::Primary));
        assert_eq!(Origin::parse(" secondary "), Some(Origin::Secondary));
        assert_eq!(Origin::parse("wordpress"), None);
    }

    #[test]
    fn placeholders_are_well_formed() {
        let ph = ContentRecord::placeholders();
        assert_eq!(ph.len(), 2);
        for rec in ph {
            assert!(!rec.id.is_empty());
            assert!(!rec.source_key.is_empty());
            assert_eq!(rec.origin, Origin::FallbackStatic);
        }
    }
}
