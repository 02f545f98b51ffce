use tracing::{info, instrument};

use super::{db_error, Service};
use crate::contract::model::{RecipeRelation, RecipeSummary};
use crate::domain::error::DomainError;

impl Service {
    /// Put a recipe into the user's favorites or shopping cart.
    #[instrument(name = "foodgram.service.add_to", skip(self))]
    pub async fn add_to(
        &self,
        relation: RecipeRelation,
        user_id: i32,
        recipe_id: i32,
    ) -> Result<RecipeSummary, DomainError> {
        let recipe = self.find_recipe(recipe_id).await?;

        let already = DomainError::AlreadyInRelation {
            relation,
            recipe_id,
        };
        if self
            .repos
            .relations
            .exists(relation, user_id, recipe_id)
            .await
            .map_err(db_error)?
        {
            return Err(already);
        }
        // A concurrent insert surfaces as a unique violation, reported the same way.
        if !self
            .repos
            .relations
            .insert(relation, user_id, recipe_id)
            .await
            .map_err(db_error)?
        {
            return Err(already);
        }

        let author = self.get_user(recipe.author_id).await?;
        info!("Added recipe to {}", relation.label());
        Ok(RecipeSummary {
            id: recipe.id,
            name: recipe.name,
            author_username: author.username,
        })
    }

    #[instrument(name = "foodgram.service.remove_from", skip(self))]
    pub async fn remove_from(
        &self,
        relation: RecipeRelation,
        user_id: i32,
        recipe_id: i32,
    ) -> Result<(), DomainError> {
        self.find_recipe(recipe_id).await?;
        if !self
            .repos
            .relations
            .delete(relation, user_id, recipe_id)
            .await
            .map_err(db_error)?
        {
            return Err(DomainError::NotInRelation {
                relation,
                recipe_id,
            });
        }
        info!("Removed recipe from {}", relation.label());
        Ok(())
    }
}
