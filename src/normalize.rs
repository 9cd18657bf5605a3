// src/normalize.rs
//
// Maps the heterogeneous raw shapes the upstream content APIs return
// (rendered-HTML wrapped fields, flat fields, nested image objects,
// string-only image fields) into the canonical `ContentRecord`.
// Field variants are probed from fixed priority tables; a record without
// a usable identifier normalizes to `None` and is skipped by callers.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use once_cell::sync::OnceCell;
use regex::Regex;
use serde_json::Value;
use time::{format_description::well_known::Rfc2822, OffsetDateTime, UtcOffset};

use crate::record::{ContentRecord, Image, Origin, DEFAULT_AUTHOR};

/// Character budget for the plain-text summary.
pub const SUMMARY_BUDGET: usize = 150;

const ID_KEYS: &[&str] = &["id", "_id", "ID"];
const TITLE_KEYS: &[&str] = &["title", "name", "headline"];
const SUMMARY_KEYS: &[&str] = &["excerpt", "summary", "description"];
const BODY_KEYS: &[&str] = &["content", "body", "text"];
const DATE_KEYS: &[&str] = &["date", "published_at", "publishedAt", "pub_date", "created_at"];
const IMAGE_URL_KEYS: &[&str] = &["src", "url", "source_url"];

/// `normalize(raw, origin) -> Option<ContentRecord>`; pure, no side effects.
/// `base_url` is the owning source's base, used to absolutize image paths.
pub fn normalize(raw: &Value, origin: Origin, base_url: &str) -> Option<ContentRecord> {
    let id = probe_id(raw)?;

    let title_raw = probe_text(raw, TITLE_KEYS).unwrap_or_default();
    let title = strip_html(&title_raw);
    let title = if title.is_empty() { "Untitled".to_string() } else { title };

    let body = probe_text(raw, BODY_KEYS)
        .map(|b| sanitize_html(&b))
        .unwrap_or_default();

    // Explicit excerpt preferred; otherwise synthesize from the body text.
    let summary_src = probe_text(raw, SUMMARY_KEYS).unwrap_or_else(|| body.clone());
    let summary = truncate_at_word(&strip_html(&summary_src), SUMMARY_BUDGET);

    let published_at = probe_published_at(raw);

    let author = probe_author(raw).unwrap_or_else(|| DEFAULT_AUTHOR.to_string());

    let image = probe_image(raw, &title, base_url);

    let source_key = match probe_slug(raw) {
        Some(slug) => slug,
        None => format!("{}-{}", origin.as_str(), id),
    };

    Some(ContentRecord {
        display_date: display_date(published_at),
        id,
        title,
        summary,
        body,
        published_at,
        author,
        image,
        origin,
        source_key,
    })
}

/// Identifier is the one mandatory field; numbers are stringified.
fn probe_id(raw: &Value) -> Option<String> {
    for key in ID_KEYS {
        match raw.get(key) {
            Some(Value::String(s)) if !s.trim().is_empty() => return Some(s.trim().to_string()),
            Some(Value::Number(n)) => return Some(n.to_string()),
            // Mongo extended JSON: {"_id": {"$oid": "..."}}
            Some(Value::Object(o)) => {
                if let Some(Value::String(s)) = o.get("$oid") {
                    if !s.trim().is_empty() {
                        return Some(s.trim().to_string());
                    }
                }
            }
            _ => {}
        }
    }
    None
}

fn probe_slug(raw: &Value) -> Option<String> {
    match raw.get("slug") {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

/// Probe `keys` in priority order; a hit may be a plain string or a
/// CMS-style `{"rendered": "..."}` wrapper.
fn probe_text(raw: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        match raw.get(key) {
            Some(Value::String(s)) if !s.trim().is_empty() => return Some(s.clone()),
            Some(Value::Object(o)) => {
                if let Some(Value::String(s)) = o.get("rendered") {
                    if !s.trim().is_empty() {
                        return Some(s.clone());
                    }
                }
            }
            _ => {}
        }
    }
    None
}

fn probe_author(raw: &Value) -> Option<String> {
    match raw.get("author") {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(strip_html(s)),
        // Nested author object from the secondary API.
        Some(Value::Object(o)) => match o.get("name") {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(strip_html(s)),
            _ => None,
        },
        // A bare numeric author is a CMS user id, useless for display.
        _ => match raw.get("author_name") {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(strip_html(s)),
            _ => None,
        },
    }
}

/// Image resolution, in fixed priority order:
/// 1. `image` as a bare string URL;
/// 2. `image` as an object, probing `src` / `url` / `source_url`;
/// 3. CMS embedded media: `_embedded["wp:featuredmedia"][0].source_url`
///    or `embedded.featuredMedia[0].source_url`.
/// Alt text falls back to the record title. `None` when nothing resolves,
/// so the caller may apply a placeholder.
fn probe_image(raw: &Value, title: &str, base_url: &str) -> Option<Image> {
    if let Some(v) = raw.get("image") {
        match v {
            Value::String(s) if !s.trim().is_empty() => {
                return Some(Image {
                    url: absolutize(s.trim(), base_url),
                    alt_text: title.to_string(),
                });
            }
            Value::Object(o) => {
                for key in IMAGE_URL_KEYS {
                    if let Some(Value::String(s)) = o.get(*key) {
                        if !s.trim().is_empty() {
                            let alt = match o.get("alt").or_else(|| o.get("alt_text")) {
                                Some(Value::String(a)) if !a.trim().is_empty() => a.clone(),
                                _ => title.to_string(),
                            };
                            return Some(Image {
                                url: absolutize(s.trim(), base_url),
                                alt_text: alt,
                            });
                        }
                    }
                }
            }
            _ => {}
        }
    }

    let embedded = raw
        .pointer("/_embedded/wp:featuredmedia/0/source_url")
        .or_else(|| raw.pointer("/embedded/featuredMedia/0/source_url"));
    if let Some(Value::String(s)) = embedded {
        if !s.trim().is_empty() {
            return Some(Image {
                url: absolutize(s.trim(), base_url),
                alt_text: title.to_string(),
            });
        }
    }

    None
}

/// Image-relay convention: already-absolute URLs pass through,
/// protocol-relative ones get `https:`, and bare paths join the owning
/// source's base URL. The result is always fetchable as-is.
pub fn absolutize(url: &str, base_url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        return url.to_string();
    }
    if let Some(rest) = url.strip_prefix("//") {
        return format!("https://{rest}");
    }
    let base = base_url.trim_end_matches('/');
    if url.starts_with('/') {
        // Keep only scheme://host from the base for rooted paths.
        let host = base
            .find("://")
            .and_then(|i| base[i + 3..].find('/').map(|j| &base[..i + 3 + j]))
            .unwrap_or(base);
        format!("{host}{url}")
    } else {
        format!("{base}/{url}")
    }
}

/// Decode HTML entities, drop tags, collapse whitespace. Plain text out.
pub fn strip_html(s: &str) -> String {
    let decoded = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[^>]+>").unwrap());
    let stripped = re_tags.replace_all(&decoded, " ");

    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").unwrap());
    re_ws.replace_all(&stripped, " ").trim().to_string()
}

/// Keep the HTML fragment but drop script blocks and comments (comments
/// carry the upstream CMS's record-identification markup).
pub fn sanitize_html(s: &str) -> String {
    static RE_SCRIPT: OnceCell<Regex> = OnceCell::new();
    let re_script =
        RE_SCRIPT.get_or_init(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script>").unwrap());
    let out = re_script.replace_all(s, "");

    static RE_COMMENT: OnceCell<Regex> = OnceCell::new();
    let re_comment = RE_COMMENT.get_or_init(|| Regex::new(r"(?s)<!--.*?-->").unwrap());
    re_comment.replace_all(&out, "").trim().to_string()
}

/// Truncate to `budget` characters at the nearest trailing space (never
/// mid-word) and append an ellipsis. A single token longer than the
/// budget runs to its own end instead of being cut inside the word.
pub fn truncate_at_word(s: &str, budget: usize) -> String {
    if s.chars().count() <= budget {
        return s.to_string();
    }
    let cut: String = s.chars().take(budget).collect();
    if let Some(pos) = cut.rfind(' ') {
        return format!("{}…", cut[..pos].trim_end());
    }
    // No break inside the budget: extend to the first space past it,
    // or keep the whole text when it never breaks.
    match s.char_indices().skip(budget).find(|&(_, c)| c == ' ') {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s.to_string(),
    }
}

/// Published timestamp from any known field, any known format.
/// Unparseable dates become 0 and sort last rather than dropping the record.
fn probe_published_at(raw: &Value) -> u64 {
    for key in DATE_KEYS {
        match raw.get(key) {
            Some(Value::Number(n)) => {
                if let Some(ts) = n.as_u64() {
                    return ts;
                }
            }
            Some(Value::String(s)) => {
                if let Some(ts) = parse_timestamp(s) {
                    return ts;
                }
            }
            _ => {}
        }
    }
    0
}

fn parse_timestamp(s: &str) -> Option<u64> {
    let s = s.trim();
    // RFC 3339 with offset.
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return u64::try_from(dt.timestamp()).ok();
    }
    // CMS-style naive local time, treated as UTC.
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return u64::try_from(naive.and_utc().timestamp()).ok();
    }
    // RFC 2822 (feed-style dates).
    OffsetDateTime::parse(s, &Rfc2822)
        .ok()
        .map(|dt| dt.to_offset(UtcOffset::UTC).unix_timestamp())
        .and_then(|x| u64::try_from(x).ok())
}

pub fn display_date(ts: u64) -> String {
    match Utc.timestamp_opt(ts as i64, 0).single() {
        Some(dt) => dt.format("%B %-d, %Y").to_string(),
        None => String::new(),
    }
}
