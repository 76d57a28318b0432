//! Listing response decoding
//!
//! Endpoints answer with either the classic jQuery File Tree HTML fragment
//!
//! ```text
//! <ul class="jqueryFileTree" style="display: none;">
//!   <li class="directory collapsed"><a href="#" rel="/data/">data</a></li>
//!   <li class="file ext_txt"><a href="#" rel="/notes.txt">notes.txt</a></li>
//! </ul>
//! ```
//!
//! or a JSON array of `{"path", "kind", "name"?}` objects. Both decode to a
//! [`Listing`] in document order.

use super::{EntryKind, Listing, ListingEntry, ListingError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

static UL_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<ul\b").expect("valid regex"));
static LI_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<li\b([^>]*)>(.*?)</li\s*>").expect("valid regex"));
static CLASS_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bclass\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid regex")
});
static REL_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\brel\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid regex")
});
static ANCHOR_TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<a\b[^>]*>(.*?)</a\s*>").expect("valid regex"));
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));
static ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);").expect("valid regex"));

#[derive(Debug, Deserialize)]
struct JsonEntry {
    path: String,
    kind: EntryKind,
    #[serde(default)]
    name: String,
}

/// Decode a listing response body
///
/// A blank body is an empty directory.
///
/// # Errors
///
/// Returns [`ListingError::Parse`] when the body is neither a listing
/// fragment nor a JSON listing, or when an item lacks a kind or a path.
pub fn parse_listing(body: &str) -> Result<Listing, ListingError> {
    let trimmed = body.trim_start();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    if trimmed.starts_with('[') {
        return parse_json(trimmed);
    }
    parse_fragment(body)
}

fn parse_json(body: &str) -> Result<Listing, ListingError> {
    let entries: Vec<JsonEntry> = serde_json::from_str(body)
        .map_err(|e| ListingError::parse(format!("invalid JSON listing: {}", e)))?;
    Ok(entries
        .into_iter()
        .map(|e| ListingEntry::new(&e.path, e.name, e.kind))
        .collect())
}

fn first_group(re: &Regex, haystack: &str) -> Option<String> {
    re.captures(haystack).and_then(|caps| {
        caps.get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().to_string())
    })
}

fn parse_fragment(body: &str) -> Result<Listing, ListingError> {
    if !UL_OPEN.is_match(body) {
        return Err(ListingError::parse("response contains no <ul> list"));
    }

    let mut listing = Vec::new();
    for caps in LI_ITEM.captures_iter(body) {
        let attrs = caps.get(1).map_or("", |m| m.as_str());
        let inner = caps.get(2).map_or("", |m| m.as_str());

        let class = first_group(&CLASS_ATTR, attrs).unwrap_or_default();
        let kind = class
            .split_whitespace()
            .find_map(|token| match token {
                "directory" => Some(EntryKind::Directory),
                "file" => Some(EntryKind::File),
                _ => None,
            })
            .ok_or_else(|| ListingError::parse(format!("item with class {:?}", class)))?;

        let rel = first_group(&REL_ATTR, inner)
            .ok_or_else(|| ListingError::parse("item without a rel path"))?;
        let path = decode_entities(&rel);

        let name = first_group(&ANCHOR_TEXT, inner)
            .map(|text| decode_entities(TAG.replace_all(&text, "").trim()))
            .unwrap_or_default();

        listing.push(ListingEntry::new(&path, name, kind));
    }
    Ok(listing)
}

/// Decode the HTML entities listing connectors emit for names and paths
pub fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &regex::Captures| {
            let entity = &caps[1];
            let decoded = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ if entity.starts_with("#x") || entity.starts_with("#X") => {
                    u32::from_str_radix(&entity[2..], 16)
                        .ok()
                        .and_then(char::from_u32)
                }
                _ if entity.starts_with('#') => {
                    entity[1..].parse::<u32>().ok().and_then(char::from_u32)
                }
                _ => None,
            };
            decoded.map_or_else(|| caps[0].to_string(), |c| c.to_string())
        })
        .into_owned()
}

/// Encode text for an HTML attribute or text node
pub fn encode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
