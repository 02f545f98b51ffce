//! Translation of recipe listing filters into a storage-level query.

use crate::contract::model::RecipeFilter;

/// How a per-user relation narrows the listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    /// Only recipes related to the user.
    Only,
    /// Only recipes NOT related to the user.
    Exclude,
}

impl Membership {
    /// `"1"` → Only, `"0"` → Exclude, anything else → no filter.
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        match raw.map(str::trim) {
            Some("1") => Some(Self::Only),
            Some("0") => Some(Self::Exclude),
            _ => None,
        }
    }
}

/// Conjunctive predicates for the recipe listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecipeQuery {
    pub author_id: Option<i32>,
    /// (user id, membership) on the favorites relation.
    pub favorites: Option<(i32, Membership)>,
    /// (user id, membership) on the shopping cart relation.
    pub shopping_cart: Option<(i32, Membership)>,
}

impl RecipeQuery {
    /// Per-user filters only apply to an authenticated viewer.
    pub fn resolve(filter: &RecipeFilter, viewer: Option<i32>) -> Self {
        let scoped = |raw: &Option<String>| {
            viewer.and_then(|uid| Membership::parse(raw.as_deref()).map(|m| (uid, m)))
        };
        Self {
            author_id: filter.author,
            favorites: scoped(&filter.is_favorited),
            shopping_cart: scoped(&filter.is_in_shopping_cart),
        }
    }
}
