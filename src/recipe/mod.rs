//! Recipe bucket
//!
//! Binds the wiki's `recipe` bucket to the sync driver: rows are decoded
//! from their `production_json` column and keyed by content.

mod key;
mod types;

pub use key::{generate_recipe_key, UNKNOWN_OUTPUT};
pub use types::{ParsedRecipe, ProductionData, RawRecipe};

use crate::bucket::BucketQuery;
use crate::sync::BucketSource;
use crate::DecodeError;

/// Name of the bucket holding recipes
pub const RECIPE_BUCKET: &str = "recipe";

/// Decodes a recipe row and computes its key
pub fn parse_recipe(raw: &RawRecipe) -> Result<ParsedRecipe, DecodeError> {
    let production_data = raw.production_data()?;
    let recipe_key = generate_recipe_key(&production_data);
    Ok(ParsedRecipe {
        production_data,
        recipe_key,
    })
}

/// The `recipe` bucket
///
/// Recipes have no field that orders them reliably, so every run is a
/// full pass from offset 0 merged into the existing dump.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecipeSource;

impl BucketSource for RecipeSource {
    type Record = ParsedRecipe;

    fn name(&self) -> &str {
        "recipes"
    }

    fn base_query(&self) -> BucketQuery {
        BucketQuery::new(RECIPE_BUCKET).select(["production_json"])
    }

    fn parse(&self, raw: serde_json::Value) -> Result<ParsedRecipe, DecodeError> {
        parse_recipe(&RawRecipe::from_value(raw)?)
    }

    fn key<'a>(&self, record: &'a ParsedRecipe) -> &'a str {
        &record.recipe_key
    }
}
