//! Recipe record shapes
//!
//! The wiki stores each recipe as a row with a single `production_json`
//! column holding a JSON document. Only a handful of its fields matter for
//! identity; the rest is carried through to the dump untouched.

use crate::DecodeError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A row of the `recipe` bucket as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecipe {
    /// JSON document describing the recipe, still encoded
    pub production_json: String,
}

impl RawRecipe {
    /// Decodes an API row into a `RawRecipe`
    pub fn from_value(value: Value) -> Result<Self, DecodeError> {
        serde_json::from_value(value).map_err(DecodeError::Record)
    }

    /// Decodes the embedded `production_json` document
    pub fn production_data(&self) -> Result<ProductionData, DecodeError> {
        serde_json::from_str(&self.production_json).map_err(DecodeError::Payload)
    }
}

/// Decoded `production_json` payload
///
/// The document is kept verbatim (skills, ticks, outputs, prices and
/// whatever else the wiki adds) and read through the accessors below.
/// Anything other than a JSON object fails to decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductionData(Map<String, Value>);

impl ProductionData {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// `output.name`
    pub fn output_name(&self) -> Option<String> {
        self.0
            .get("output")
            .and_then(|output| output.get("name"))
            .and_then(text_value)
    }

    /// Names of all listed materials, in payload order
    ///
    /// `None` marks a material with no name (missing or `null`). Scalar
    /// names are read as text, empty strings included.
    pub fn material_names(&self) -> Vec<Option<String>> {
        match self.0.get("materials") {
            Some(Value::Array(materials)) => materials
                .iter()
                .map(|m| m.get("name").and_then(scalar_text))
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn facility(&self) -> Option<String> {
        self.0.get("facility").and_then(text_value)
    }

    pub fn process(&self) -> Option<String> {
        self.0.get("process").and_then(text_value)
    }

    pub fn method(&self) -> Option<String> {
        self.0.get("method").and_then(text_value)
    }
}

/// A recipe that decoded successfully, with its dedup key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedRecipe {
    pub production_data: ProductionData,
    pub recipe_key: String,
}

/// Reads a scalar as text; empty, zero, false, null and containers count as absent
fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

/// Reads any scalar as text; only `null` and containers are absent
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
