//! `Link` header parsing.
//!
//! GitHub advertises pagination through RFC 8288 `Link` headers:
//!
//! ```text
//! <https://api.github.com/user/repos?page=3&per_page=100>; rel="next",
//! <https://api.github.com/user/repos?page=50&per_page=100>; rel="last"
//! ```

use std::sync::LazyLock;

use regex::Regex;

use crate::types::PageInfo;

static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<([^>]*)>\s*;\s*rel="?([^";,]+)"?"#).unwrap());

static PAGE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[?&]page=(\d+)").unwrap());

/// Parse a `Link` header into page numbers.
///
/// Unknown relations and links without a `page` query parameter are ignored.
pub fn parse_link_header(header: &str) -> PageInfo {
    let mut info = PageInfo::default();

    for caps in LINK_RE.captures_iter(header) {
        let Some(page) = PAGE_RE
            .captures(&caps[1])
            .and_then(|p| p[1].parse::<u32>().ok())
        else {
            continue;
        };

        // A single link may carry several space-separated relations
        for rel in caps[2].split_whitespace() {
            match rel {
                "first" => info.first = Some(page),
                "prev" => info.prev = Some(page),
                "next" => info.next = Some(page),
                "last" => info.last = Some(page),
                _ => {}
            }
        }
    }

    info
}

/// Build a `Link` header for `page` out of `last` pages at `base_url`.
///
/// Used by test doubles that need to paginate like the real service.
pub fn build_link_header(base_url: &str, page: u32, last: u32, per_page: u32) -> Option<String> {
    let link = |p: u32, rel: &str| format!("<{base_url}?page={p}&per_page={per_page}>; rel=\"{rel}\"");

    let mut parts = Vec::new();
    if page > 1 {
        parts.push(link(page - 1, "prev"));
        parts.push(link(1, "first"));
    }
    if page < last {
        parts.push(link(page + 1, "next"));
        parts.push(link(last, "last"));
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}
