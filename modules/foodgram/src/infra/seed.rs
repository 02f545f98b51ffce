//! Ingredient catalogue files: a JSON array of `{"name", "measurement_unit"}`.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::contract::model::NewIngredient;

#[derive(Debug, Deserialize)]
struct IngredientRecord {
    name: String,
    measurement_unit: String,
}

pub fn parse_ingredients(raw: &str) -> anyhow::Result<Vec<NewIngredient>> {
    let records: Vec<IngredientRecord> =
        serde_json::from_str(raw).context("ingredient file is not a JSON array of records")?;
    Ok(records
        .into_iter()
        .map(|r| NewIngredient {
            name: r.name,
            measurement_unit: r.measurement_unit,
        })
        .collect())
}

pub async fn read_ingredients(path: &Path) -> anyhow::Result<Vec<NewIngredient>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_ingredients(&raw).with_context(|| format!("failed to parse {}", path.display()))
}
