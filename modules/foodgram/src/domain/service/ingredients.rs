use tracing::{debug, info, instrument};

use super::{db_error, Service};
use crate::contract::model::{Ingredient, NewIngredient};
use crate::domain::error::DomainError;

const MAX_INGREDIENT_NAME_LENGTH: usize = 128;
const MAX_UNIT_LENGTH: usize = 64;

impl Service {
    #[instrument(name = "foodgram.service.search_ingredients", skip(self))]
    pub async fn search_ingredients(
        &self,
        name: Option<&str>,
    ) -> Result<Vec<Ingredient>, DomainError> {
        let needle = name.map(str::trim).filter(|s| !s.is_empty());
        let found = self
            .repos
            .ingredients
            .search(needle)
            .await
            .map_err(db_error)?;
        debug!("Found {} ingredients", found.len());
        Ok(found)
    }

    #[instrument(name = "foodgram.service.get_ingredient", skip(self))]
    pub async fn get_ingredient(&self, id: i32) -> Result<Ingredient, DomainError> {
        self.repos
            .ingredients
            .find_by_id(id)
            .await
            .map_err(db_error)?
            .ok_or_else(|| DomainError::ingredient_not_found(id))
    }

    /// Bulk load of the ingredient catalogue; existing (name, unit) pairs are skipped.
    #[instrument(name = "foodgram.service.import_ingredients", skip_all, fields(count = items.len()))]
    pub async fn import_ingredients(&self, items: Vec<NewIngredient>) -> Result<u64, DomainError> {
        let mut cleaned = Vec::with_capacity(items.len());
        for (idx, item) in items.into_iter().enumerate() {
            let name = item.name.trim().to_string();
            let measurement_unit = item.measurement_unit.trim().to_string();
            if name.is_empty() || name.chars().count() > MAX_INGREDIENT_NAME_LENGTH {
                return Err(DomainError::validation(
                    format!("[{idx}].name"),
                    format!("Name must be 1 to {MAX_INGREDIENT_NAME_LENGTH} characters."),
                ));
            }
            if measurement_unit.is_empty() || measurement_unit.chars().count() > MAX_UNIT_LENGTH {
                return Err(DomainError::validation(
                    format!("[{idx}].measurement_unit"),
                    format!("Measurement unit must be 1 to {MAX_UNIT_LENGTH} characters."),
                ));
            }
            cleaned.push(NewIngredient {
                name,
                measurement_unit,
            });
        }

        let inserted = self
            .repos
            .ingredients
            .insert_missing(cleaned)
            .await
            .map_err(db_error)?;
        info!(inserted, "Ingredients imported");
        Ok(inserted)
    }
}
