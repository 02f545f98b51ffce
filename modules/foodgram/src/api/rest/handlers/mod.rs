//! REST handlers. Each one unwraps the domain result into a DTO or a problem.

use modkit::api::pagination::{PageQuery, PageRequest};

use crate::contract::model::PageSpec;
use crate::domain::service::Service;

pub mod auth;
pub mod ingredients;
pub mod recipes;
pub mod short_link;
pub mod subscriptions;
pub mod users;

fn page_request(svc: &Service, query: PageQuery) -> (PageRequest, PageSpec) {
    let cfg = svc.config();
    let req = PageRequest::resolve(query, cfg.default_page_size, cfg.max_page_size);
    let spec = PageSpec {
        offset: req.offset(),
        limit: req.limit(),
    };
    (req, spec)
}
