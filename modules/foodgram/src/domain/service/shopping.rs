use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

use super::{db_error, Service};
use crate::contract::model::ShoppingList;
use crate::domain::error::DomainError;
use crate::domain::shopping_list;

impl Service {
    /// Cart contents summed per (ingredient, unit), plus the recipes they come from.
    #[instrument(name = "foodgram.service.shopping_list", skip(self))]
    pub async fn shopping_list(&self, user_id: i32) -> Result<ShoppingList, DomainError> {
        let items = self
            .repos
            .relations
            .shopping_totals(user_id)
            .await
            .map_err(db_error)?;
        let recipes = self
            .repos
            .relations
            .cart_recipes(user_id)
            .await
            .map_err(db_error)?;
        debug!(
            products = items.len(),
            recipes = recipes.len(),
            "Aggregated shopping cart"
        );
        Ok(ShoppingList { items, recipes })
    }

    /// Plain-text export of the shopping list.
    pub async fn render_shopping_list(
        &self,
        user_id: i32,
        generated_at: DateTime<Utc>,
    ) -> Result<String, DomainError> {
        let list = self.shopping_list(user_id).await?;
        Ok(shopping_list::render(&list, generated_at))
    }
}
