use std::collections::HashSet;

use tracing::{debug, info, instrument};

use super::{db_error, storage_error, Service};
use crate::contract::model::{
    IngredientAmount, IngredientInput, Page, PageSpec, Recipe, RecipeDetails, RecipeFilter,
    RecipeInput, RecipeRelation, User,
};
use crate::domain::error::DomainError;
use crate::domain::filter::RecipeQuery;
use crate::domain::image::DecodedImage;
use crate::domain::ports::ImageKind;
use crate::domain::repo::NewRecipeRecord;

/// Scalar recipe fields after validation.
struct RecipeFields {
    name: String,
    text: String,
    cooking_time: i32,
}

impl Service {
    #[instrument(name = "foodgram.service.list_recipes", skip(self))]
    pub async fn list_recipes(
        &self,
        viewer: Option<i32>,
        filter: &RecipeFilter,
        page: PageSpec,
    ) -> Result<Page<RecipeDetails>, DomainError> {
        let query = RecipeQuery::resolve(filter, viewer);
        let recipes = self
            .repos
            .recipes
            .list_page(query, page)
            .await
            .map_err(db_error)?;

        let mut items = Vec::with_capacity(recipes.items.len());
        for recipe in recipes.items {
            items.push(self.details(viewer, recipe).await?);
        }
        debug!("Listed {} of {} recipes", items.len(), recipes.total);
        Ok(Page {
            items,
            total: recipes.total,
        })
    }

    #[instrument(name = "foodgram.service.get_recipe", skip(self))]
    pub async fn get_recipe(
        &self,
        viewer: Option<i32>,
        id: i32,
    ) -> Result<RecipeDetails, DomainError> {
        let recipe = self.find_recipe(id).await?;
        self.details(viewer, recipe).await
    }

    #[instrument(name = "foodgram.service.create_recipe", skip(self, author, input), fields(author_id = author.id))]
    pub async fn create_recipe(
        &self,
        author: &User,
        input: RecipeInput,
    ) -> Result<RecipeDetails, DomainError> {
        info!("Creating recipe");

        let lines = self.validate_lines(input.ingredients.as_deref()).await?;
        let image = decode_required_image(input.image.as_deref())?;
        let fields = self.validate_fields(
            input.name.as_deref(),
            input.text.as_deref(),
            input.cooking_time,
        )?;

        let image_path = self
            .images
            .save(ImageKind::Recipe, image)
            .await
            .map_err(storage_error)?;

        let record = NewRecipeRecord {
            author_id: author.id,
            name: fields.name,
            image: image_path.clone(),
            text: fields.text,
            cooking_time: fields.cooking_time,
        };
        let recipe = match self.repos.recipes.insert(record, &lines).await {
            Ok(r) => r,
            Err(e) => {
                self.discard_image(&image_path).await;
                return Err(db_error(e));
            }
        };

        info!(recipe_id = recipe.id, "Recipe created");
        self.details(Some(author.id), recipe).await
    }

    /// Partial update by the author. `ingredients` and `image` are required;
    /// the ingredient lines are replaced as a whole.
    #[instrument(name = "foodgram.service.update_recipe", skip(self, user, input), fields(user_id = user.id))]
    pub async fn update_recipe(
        &self,
        user: &User,
        id: i32,
        input: RecipeInput,
    ) -> Result<RecipeDetails, DomainError> {
        let current = self.find_recipe(id).await?;
        ensure_author(user, &current)?;

        let lines = self.validate_lines(input.ingredients.as_deref()).await?;
        let image = decode_required_image(input.image.as_deref())?;
        let fields = self.validate_fields(
            Some(input.name.as_deref().unwrap_or(&current.name)),
            Some(input.text.as_deref().unwrap_or(&current.text)),
            Some(input.cooking_time.unwrap_or(i64::from(current.cooking_time))),
        )?;

        let image_path = self
            .images
            .save(ImageKind::Recipe, image)
            .await
            .map_err(storage_error)?;

        let old_image = current.image.clone();
        let changed = Recipe {
            name: fields.name,
            text: fields.text,
            cooking_time: fields.cooking_time,
            image: image_path.clone(),
            ..current
        };
        let recipe = match self.repos.recipes.update(changed, &lines).await {
            Ok(r) => r,
            Err(e) => {
                self.discard_image(&image_path).await;
                return Err(db_error(e));
            }
        };
        self.discard_image(&old_image).await;

        info!(recipe_id = recipe.id, "Recipe updated");
        self.details(Some(user.id), recipe).await
    }

    #[instrument(name = "foodgram.service.delete_recipe", skip(self, user), fields(user_id = user.id))]
    pub async fn delete_recipe(&self, user: &User, id: i32) -> Result<(), DomainError> {
        let recipe = self.find_recipe(id).await?;
        ensure_author(user, &recipe)?;

        if !self.repos.recipes.delete(id).await.map_err(db_error)? {
            return Err(DomainError::recipe_not_found(id));
        }
        self.discard_image(&recipe.image).await;
        info!(recipe_id = id, "Recipe deleted");
        Ok(())
    }

    /// Frontend path a short link redirects to.
    #[instrument(name = "foodgram.service.short_link_target", skip(self))]
    pub async fn short_link_target(&self, id: i32) -> Result<String, DomainError> {
        let recipe = self.find_recipe(id).await?;
        Ok(format!("/recipes/{}", recipe.id))
    }

    pub(super) async fn find_recipe(&self, id: i32) -> Result<Recipe, DomainError> {
        self.repos
            .recipes
            .find_by_id(id)
            .await
            .map_err(db_error)?
            .ok_or_else(|| DomainError::recipe_not_found(id))
    }

    pub(super) async fn details(
        &self,
        viewer: Option<i32>,
        recipe: Recipe,
    ) -> Result<RecipeDetails, DomainError> {
        let author = self.get_user(recipe.author_id).await?;
        let author = self.profile_of(viewer, author).await?;
        let ingredients = self
            .repos
            .recipes
            .ingredient_lines(recipe.id)
            .await
            .map_err(db_error)?;

        let (is_favorited, is_in_shopping_cart) = match viewer {
            Some(uid) => (
                self.repos
                    .relations
                    .exists(RecipeRelation::Favorite, uid, recipe.id)
                    .await
                    .map_err(db_error)?,
                self.repos
                    .relations
                    .exists(RecipeRelation::ShoppingCart, uid, recipe.id)
                    .await
                    .map_err(db_error)?,
            ),
            None => (false, false),
        };

        Ok(RecipeDetails {
            recipe,
            author,
            ingredients,
            is_favorited,
            is_in_shopping_cart,
        })
    }

    async fn validate_lines(
        &self,
        raw: Option<&[IngredientInput]>,
    ) -> Result<Vec<IngredientAmount>, DomainError> {
        let raw = raw.unwrap_or_default();
        if raw.is_empty() {
            return Err(DomainError::validation(
                "ingredients",
                "At least one ingredient is required.",
            ));
        }

        let (min, max) = (self.config.min_amount, self.config.max_amount);
        let mut seen = HashSet::with_capacity(raw.len());
        let mut lines = Vec::with_capacity(raw.len());
        for item in raw {
            if !seen.insert(item.id) {
                return Err(DomainError::validation(
                    "ingredients",
                    format!("Ingredient {} is listed more than once.", item.id),
                ));
            }
            let amount = i32::try_from(item.amount)
                .ok()
                .filter(|a| (min..=max).contains(a))
                .ok_or_else(|| {
                    DomainError::validation(
                        "ingredients",
                        format!("Amount must be between {min} and {max}."),
                    )
                })?;
            lines.push(IngredientAmount {
                ingredient_id: item.id,
                amount,
            });
        }

        let ids: Vec<i32> = lines.iter().map(|l| l.ingredient_id).collect();
        let existing: HashSet<i32> = self
            .repos
            .ingredients
            .existing_ids(&ids)
            .await
            .map_err(db_error)?
            .into_iter()
            .collect();
        if let Some(missing) = ids.iter().find(|id| !existing.contains(id)) {
            return Err(DomainError::validation(
                "ingredients",
                format!("Ingredient {missing} does not exist."),
            ));
        }

        Ok(lines)
    }

    fn validate_fields(
        &self,
        name: Option<&str>,
        text: Option<&str>,
        cooking_time: Option<i64>,
    ) -> Result<RecipeFields, DomainError> {
        let name = name.map(str::trim).unwrap_or_default();
        if name.is_empty() {
            return Err(DomainError::validation("name", "This field is required."));
        }
        let max_name = self.config.max_recipe_name_length;
        if name.chars().count() > max_name {
            return Err(DomainError::validation(
                "name",
                format!("Ensure this field has no more than {max_name} characters."),
            ));
        }

        let text = text.map(str::trim).unwrap_or_default();
        if text.is_empty() {
            return Err(DomainError::validation("text", "This field is required."));
        }

        let (min, max) = (self.config.min_cooking_time, self.config.max_cooking_time);
        let cooking_time = cooking_time
            .ok_or_else(|| DomainError::validation("cooking_time", "This field is required."))?;
        let cooking_time = i32::try_from(cooking_time)
            .ok()
            .filter(|t| (min..=max).contains(t))
            .ok_or_else(|| {
                DomainError::validation(
                    "cooking_time",
                    format!("Cooking time must be between {min} and {max}."),
                )
            })?;

        Ok(RecipeFields {
            name: name.to_string(),
            text: text.to_string(),
            cooking_time,
        })
    }
}

fn ensure_author(user: &User, recipe: &Recipe) -> Result<(), DomainError> {
    if recipe.author_id != user.id {
        return Err(DomainError::NotAuthor {
            recipe_id: recipe.id,
        });
    }
    Ok(())
}

fn decode_required_image(raw: Option<&str>) -> Result<DecodedImage, DomainError> {
    match raw {
        Some(raw) => DecodedImage::from_base64(raw, "image"),
        None => Err(DomainError::validation("image", "This field is required.")),
    }
}
