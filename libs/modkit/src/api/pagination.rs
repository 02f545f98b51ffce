//! Page-number pagination: `?page=N&limit=M` in, `{count, next, previous, results}` out.

use axum::http::Uri;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Raw pagination parameters as they arrive in the query string.
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// 1-based page number.
    pub page: Option<u64>,
    /// Page size.
    pub limit: Option<u64>,
}

/// Validated page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub size: u64,
}

impl PageRequest {
    /// Clamp the raw query into a usable window. A missing or zero `page`
    /// means the first page; a missing or zero `limit` means `default_size`.
    pub fn resolve(q: PageQuery, default_size: u64, max_size: u64) -> Self {
        let size = match q.limit {
            Some(0) | None => default_size,
            Some(n) => n,
        };
        Self {
            page: q.page.filter(|p| *p > 0).unwrap_or(1),
            size: size.clamp(1, max_size.max(1)),
        }
    }

    /// Row offset of the window. Saturates at `i64::MAX`, the largest
    /// offset SQL backends accept.
    pub fn offset(&self) -> u64 {
        self.page
            .saturating_sub(1)
            .saturating_mul(self.size)
            .min(i64::MAX as u64)
    }

    pub fn limit(&self) -> u64 {
        self.size
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Paginated<T> {
    /// Total number of items across all pages.
    pub count: u64,
    /// Link to the next page, if any.
    pub next: Option<String>,
    /// Link to the previous page, if any.
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    /// Build a page; links reuse the request path and query with `page` replaced.
    pub fn new(results: Vec<T>, count: u64, req: PageRequest, uri: &Uri) -> Self {
        let has_next = req.page.saturating_mul(req.size) < count;
        Self {
            count,
            next: has_next.then(|| page_link(uri, req.page.saturating_add(1))),
            previous: (req.page > 1).then(|| page_link(uri, req.page - 1)),
            results,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            count: self.count,
            next: self.next,
            previous: self.previous,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

fn page_link(uri: &Uri, page: u64) -> String {
    let path = uri.path();
    let mut pairs: Vec<(String, String)> = uri
        .query()
        .map(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .filter(|(k, _)| k != "page")
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect()
        })
        .unwrap_or_default();

    // First page is addressed without the `page` parameter.
    if page > 1 {
        pairs.push(("page".to_string(), page.to_string()));
    }
    if pairs.is_empty() {
        return path.to_string();
    }

    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish();
    format!("{path}?{query}")
}
