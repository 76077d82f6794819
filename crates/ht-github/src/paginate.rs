//! Paginated request executor.
//!
//! Drains a paginated listing into one ordered sequence (`per_page == 0`),
//! or passes a single page through together with its pagination metadata.

use tracing::{debug, info, warn};

use crate::error::GitHubError;
use crate::link::parse_link_header;
use crate::types::{Page, Paginated};

/// `per_page` sentinel that requests every page.
pub const FETCH_ALL: u32 = 0;

/// Page size used while draining every page.
pub const MAX_PER_PAGE: u32 = 100;

/// A single page request issued by [`paginate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Page number (`None` lets the service pick its default).
    pub page: Option<u32>,
    /// Page size (`None` lets the service pick its default).
    pub per_page: Option<u32>,
    /// Send a cache-bypass directive with the request.
    pub bypass_cache: bool,
}

/// Execute a paginated request.
///
/// When `per_page` is [`FETCH_ALL`], `request` is invoked with pages `1, 2, ...`
/// of [`MAX_PER_PAGE`] items, following the `rel="next"` link until the
/// service stops advertising one. Items are concatenated in arrival order and
/// the returned `page_info` is `None`.
///
/// Otherwise `request` is invoked once with the caller's `page`/`per_page`,
/// and the parsed `Link` header is returned alongside the items.
///
/// When `use_cache` is false every request carries `bypass_cache`.
///
/// # Errors
///
/// The first failing page aborts the whole operation; items from earlier
/// pages are discarded.
pub fn paginate<T, F>(
    label: &str,
    page: Option<u32>,
    per_page: Option<u32>,
    use_cache: bool,
    mut request: F,
) -> Result<Paginated<T>, GitHubError>
where
    F: FnMut(PageRequest) -> Result<Page<T>, GitHubError>,
{
    info!("Exec github for key: {label}");
    let bypass_cache = !use_cache;

    if per_page != Some(FETCH_ALL) {
        let response = request(PageRequest {
            page,
            per_page,
            bypass_cache,
        })?;
        return Ok(Paginated {
            items: response.items,
            page_info: response.link.as_deref().map(parse_link_header),
        });
    }

    let mut items = Vec::new();
    let mut next_page = Some(1);

    while let Some(current) = next_page {
        let response = request(PageRequest {
            page: Some(current),
            per_page: Some(MAX_PER_PAGE),
            bypass_cache,
        })?;

        next_page = response
            .link
            .as_deref()
            .map(parse_link_header)
            .and_then(|info| info.next);

        if let Some(next) = next_page
            && next <= current
        {
            warn!("{label}: next page {next} does not advance past {current}, stopping");
            next_page = None;
        }

        debug!(
            "{label}: page {current} returned {} items",
            response.items.len()
        );
        items.extend(response.items);
    }

    Ok(Paginated {
        items,
        page_info: None,
    })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::link::build_link_header;
    use crate::types::PageInfo;

    /// Synthetic paginated source over `0..total`.
    fn source(
        total: u32,
        calls: &RefCell<Vec<PageRequest>>,
    ) -> impl FnMut(PageRequest) -> Result<Page<u32>, GitHubError> + '_ {
        move |req| {
            calls.borrow_mut().push(req);
            let per_page = req.per_page.unwrap_or(30);
            let page = req.page.unwrap_or(1);
            let last = total.div_ceil(per_page).max(1);
            let start = (page - 1) * per_page;
            let items = (start..total.min(start + per_page)).collect();
            Ok(Page {
                items,
                link: build_link_header("http://test/items", page, last, per_page),
            })
        }
    }

    #[test]
    fn test_fetch_all_collects_every_page_in_order() {
        let calls = RefCell::new(Vec::new());

        let result = paginate("items", None, Some(FETCH_ALL), true, source(250, &calls)).unwrap();

        assert_eq!(result.items, (0..250).collect::<Vec<_>>());
        assert_eq!(result.page_info, None);

        let calls = calls.into_inner();
        assert_eq!(calls.len(), 3);
        assert_eq!(
            calls.iter().map(|c| c.page).collect::<Vec<_>>(),
            vec![Some(1), Some(2), Some(3)]
        );
        assert!(calls.iter().all(|c| c.per_page == Some(MAX_PER_PAGE)));
    }

    #[test]
    fn test_fetch_all_single_page() {
        let calls = RefCell::new(Vec::new());

        let result = paginate("items", None, Some(FETCH_ALL), true, source(7, &calls)).unwrap();

        assert_eq!(result.items.len(), 7);
        assert_eq!(calls.borrow().len(), 1);
    }

    #[test]
    fn test_fetch_all_exact_multiple_of_page_size() {
        let calls = RefCell::new(Vec::new());

        let result = paginate("items", None, Some(FETCH_ALL), true, source(200, &calls)).unwrap();

        assert_eq!(result.items.len(), 200);
        assert_eq!(calls.borrow().len(), 2);
    }

    #[test]
    fn test_single_page_passes_through_page_info() {
        let calls = RefCell::new(Vec::new());

        let result = paginate("items", Some(2), Some(10), true, source(45, &calls)).unwrap();

        assert_eq!(result.items, (10..20).collect::<Vec<_>>());
        assert_eq!(
            result.page_info,
            Some(PageInfo {
                first: Some(1),
                prev: Some(1),
                next: Some(3),
                last: Some(5),
            })
        );
        assert_eq!(calls.borrow().len(), 1);
    }

    #[test]
    fn test_single_page_without_link_header() {
        let result = paginate("user", None, None, true, |_| {
            Ok(Page {
                items: vec!["octocat"],
                link: None,
            })
        })
        .unwrap();

        assert_eq!(result.items, vec!["octocat"]);
        assert_eq!(result.page_info, None);
    }

    #[test]
    fn test_error_aborts_and_discards_partial_results() {
        let mut calls = 0;

        let result: Result<Paginated<u32>, _> =
            paginate("items", None, Some(FETCH_ALL), true, |req| {
                calls += 1;
                if req.page == Some(2) {
                    return Err(GitHubError::Http {
                        status: 502,
                        body: "bad gateway".to_owned(),
                    });
                }
                Ok(Page {
                    items: vec![1, 2, 3],
                    link: build_link_header("http://test/items", 1, 3, 100),
                })
            });

        assert!(matches!(result, Err(GitHubError::Http { status: 502, .. })));
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_cache_disabled_bypasses_every_request() {
        let calls = RefCell::new(Vec::new());

        paginate("items", None, Some(FETCH_ALL), false, source(150, &calls)).unwrap();
        paginate("items", Some(1), Some(10), false, source(150, &calls)).unwrap();

        let calls = calls.into_inner();
        assert_eq!(calls.len(), 3);
        assert!(calls.iter().all(|c| c.bypass_cache));
    }

    #[test]
    fn test_cache_enabled_sends_no_bypass() {
        let calls = RefCell::new(Vec::new());

        paginate("items", None, Some(FETCH_ALL), true, source(150, &calls)).unwrap();

        assert!(calls.borrow().iter().all(|c| !c.bypass_cache));
    }

    #[test]
    fn test_non_advancing_next_link_stops() {
        let mut calls = 0;

        let result = paginate("items", None, Some(FETCH_ALL), true, |_| {
            calls += 1;
            Ok(Page {
                items: vec![calls],
                link: Some(r#"<http://test/items?page=1>; rel="next""#.to_owned()),
            })
        })
        .unwrap();

        assert_eq!(result.items, vec![1]);
        assert_eq!(calls, 1);
    }
}
