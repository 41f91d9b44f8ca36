//! Recipe dedup keys
//!
//! Recipes have no id, so identity is derived from content:
//!
//! `output name | sorted material names | facility | process | method`
//!
//! Quantities, skill requirements, tick counts and everything else are
//! ignored, so recipes that only differ in those collapse into one entry.
//!
//! Material names sort by UTF-16 code units with unnamed materials last,
//! and an unnamed material joins as an empty string. Keys therefore match
//! the ones already stored in dumps written by the wiki's JavaScript tooling.

use crate::recipe::types::ProductionData;
use std::cmp::Ordering;

/// Output name used when a recipe has none
pub const UNKNOWN_OUTPUT: &str = "unknown";

/// Derives the dedup key for a decoded recipe
///
/// # Example
///
/// ```
/// use bucket_sync::recipe::{generate_recipe_key, ProductionData};
///
/// let data: ProductionData = serde_json::from_str(
///     r#"{"output":{"name":"Bronze bar"},"materials":[{"name":"Tin ore"},{"name":"Copper ore"}]}"#,
/// ).unwrap();
/// assert_eq!(generate_recipe_key(&data), "Bronze bar|Copper ore,Tin ore|||");
/// ```
pub fn generate_recipe_key(data: &ProductionData) -> String {
    let output = data
        .output_name()
        .unwrap_or_else(|| UNKNOWN_OUTPUT.to_string());

    let mut materials = data.material_names();
    materials.sort_by(compare_material_names);
    let materials: Vec<String> = materials.into_iter().map(Option::unwrap_or_default).collect();

    format!(
        "{}|{}|{}|{}|{}",
        output,
        materials.join(","),
        data.facility().unwrap_or_default(),
        data.process().unwrap_or_default(),
        data.method().unwrap_or_default()
    )
}

fn compare_material_names(a: &Option<String>, b: &Option<String>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.encode_utf16().cmp(b.encode_utf16()),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
