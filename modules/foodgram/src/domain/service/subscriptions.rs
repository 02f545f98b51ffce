use tracing::{debug, info, instrument};

use super::{db_error, Service};
use crate::contract::model::{AuthorSubscription, Page, PageSpec, SubscriptionReceipt, User};
use crate::domain::error::DomainError;

impl Service {
    #[instrument(name = "foodgram.service.subscribe", skip(self, user), fields(user_id = user.id))]
    pub async fn subscribe(
        &self,
        user: &User,
        author_id: i32,
    ) -> Result<SubscriptionReceipt, DomainError> {
        let author = self.get_user(author_id).await?;
        if author.id == user.id {
            return Err(DomainError::SelfSubscription);
        }

        let duplicate = DomainError::AlreadySubscribed { author_id };
        if self
            .repos
            .subscriptions
            .exists(user.id, author_id)
            .await
            .map_err(db_error)?
        {
            return Err(duplicate);
        }
        if !self
            .repos
            .subscriptions
            .insert(user.id, author_id)
            .await
            .map_err(db_error)?
        {
            return Err(duplicate);
        }

        info!("Subscribed");
        Ok(SubscriptionReceipt {
            user: user.username.clone(),
            author: author.username,
        })
    }

    #[instrument(name = "foodgram.service.unsubscribe", skip(self, user), fields(user_id = user.id))]
    pub async fn unsubscribe(&self, user: &User, author_id: i32) -> Result<(), DomainError> {
        let author = self.get_user(author_id).await?;
        if author.id == user.id {
            return Err(DomainError::SelfSubscription);
        }
        if !self
            .repos
            .subscriptions
            .delete(user.id, author_id)
            .await
            .map_err(db_error)?
        {
            return Err(DomainError::NotSubscribed { author_id });
        }
        info!("Unsubscribed");
        Ok(())
    }

    /// Followed authors, each with their newest recipes capped by `recipes_limit`.
    #[instrument(name = "foodgram.service.subscriptions", skip(self))]
    pub async fn subscriptions(
        &self,
        user_id: i32,
        page: PageSpec,
        recipes_limit: Option<&str>,
    ) -> Result<Page<AuthorSubscription>, DomainError> {
        let limit = self.recipes_limit(recipes_limit);
        let authors = self
            .repos
            .subscriptions
            .authors_page(user_id, page)
            .await
            .map_err(db_error)?;

        let mut items = Vec::with_capacity(authors.items.len());
        for author in authors.items {
            let latest = self
                .repos
                .recipes
                .latest_by_author(author.id, limit)
                .await
                .map_err(db_error)?;
            let mut recipes = Vec::with_capacity(latest.len());
            for recipe in latest {
                recipes.push(self.details(Some(user_id), recipe).await?);
            }
            let recipes_count = self
                .repos
                .recipes
                .count_by_author(author.id)
                .await
                .map_err(db_error)?;
            items.push(AuthorSubscription {
                author,
                recipes,
                recipes_count,
            });
        }

        debug!(recipes_limit = limit, "Listed {} subscriptions", items.len());
        Ok(Page {
            items,
            total: authors.total,
        })
    }

    /// Missing, unparseable or negative values fall back to the configured
    /// default. Anything else is honored up to `max_page_size`.
    pub fn recipes_limit(&self, raw: Option<&str>) -> u64 {
        raw.and_then(|s| s.trim().parse::<u64>().ok())
            .map_or(self.config.default_recipes_limit, |n| {
                n.min(self.config.max_page_size)
            })
    }
}
