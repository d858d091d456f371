//! Typed cutout metadata and its codec
//!
//! Stores keep metadata as a loosely typed attribute map. [`CutoutMetadata`] is
//! the typed view of that map used everywhere else; [`CutoutMetadata::decode`]
//! and [`CutoutMetadata::encode`] are the only places where the two meet.

use crate::errors::{CutoutError, CutoutResult};
use serde_json::{Map, Value};

/// Loosely typed attributes as kept by a store
pub type Attributes = Map<String, Value>;

pub const ATTR_MODULE: &str = "module";
pub const ATTR_PREPARED_FEATURES: &str = "prepared_features";
pub const ATTR_CREATION_PARAMETERS: &str = "creation_parameters";
pub const ATTR_PROJECTION: &str = "projection";
pub const ATTR_NAME: &str = "name";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CutoutMetadata {
    /// Name of the governing dataset module
    pub module: Option<String>,
    /// Features which have been computed and stored
    pub prepared_features: Vec<String>,
    /// Snapshot of the parameters a new cutout was declared with. Informational only.
    pub creation_parameters: Option<String>,
    /// Overrides the module's default projection
    pub projection: Option<String>,
    pub name: Option<String>,
    /// Attributes without a dedicated field, kept for round trips
    pub extra: Attributes,
}

impl CutoutMetadata {
    /// Decode the attributes of a persisted store
    ///
    /// `prepared_features` is mandatory. A single string is accepted and
    /// normalized to a one-element list.
    ///
    /// # Errors
    ///
    /// [`CutoutError::MissingAttribute`] if `prepared_features` is absent and
    /// [`CutoutError::InvalidAttribute`] if any known attribute has the wrong type.
    pub fn decode(attrs: &Attributes, source: &str) -> CutoutResult<Self> {
        if !attrs.contains_key(ATTR_PREPARED_FEATURES) {
            return Err(CutoutError::MissingAttribute {
                path: source.to_string(),
                attribute: ATTR_PREPARED_FEATURES.to_string(),
            });
        }
        Self::decode_lenient(attrs)
    }

    /// Decode attributes where `prepared_features` may be missing (read as empty)
    pub fn decode_lenient(attrs: &Attributes) -> CutoutResult<Self> {
        let mut metadata = CutoutMetadata::default();
        for (key, value) in attrs {
            match key.as_str() {
                ATTR_MODULE => metadata.module = optional_string(key, value)?,
                ATTR_PREPARED_FEATURES => metadata.prepared_features = string_list(key, value)?,
                ATTR_CREATION_PARAMETERS => {
                    metadata.creation_parameters = optional_string(key, value)?
                }
                ATTR_PROJECTION => metadata.projection = optional_string(key, value)?,
                ATTR_NAME => metadata.name = optional_string(key, value)?,
                _ => {
                    metadata.extra.insert(key.clone(), value.clone());
                }
            }
        }
        Ok(metadata)
    }

    /// Encode into store attributes. `prepared_features` is always written as a list.
    pub fn encode(&self) -> Attributes {
        let mut attrs = self.extra.clone();
        let mut put = |key: &str, value: &Option<String>| {
            if let Some(value) = value {
                attrs.insert(key.to_string(), Value::String(value.clone()));
            }
        };
        put(ATTR_MODULE, &self.module);
        put(ATTR_CREATION_PARAMETERS, &self.creation_parameters);
        put(ATTR_PROJECTION, &self.projection);
        put(ATTR_NAME, &self.name);
        attrs.insert(
            ATTR_PREPARED_FEATURES.to_string(),
            Value::Array(
                self.prepared_features
                    .iter()
                    .cloned()
                    .map(Value::String)
                    .collect(),
            ),
        );
        attrs
    }
}

fn optional_string(key: &str, value: &Value) -> CutoutResult<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        other => Err(CutoutError::InvalidAttribute {
            attribute: key.to_string(),
            details: format!("expected a string, got {}", other),
        }),
    }
}

/// Read a list of strings, accepting a bare string as a one-element list
///
/// Duplicates are dropped, keeping the first occurrence.
fn string_list(key: &str, value: &Value) -> CutoutResult<Vec<String>> {
    let invalid = |v: &Value| CutoutError::InvalidAttribute {
        attribute: key.to_string(),
        details: format!("expected a string or a list of strings, got {}", v),
    };
    let items = match value {
        Value::Null => vec![],
        Value::String(s) => vec![s.clone()],
        Value::Array(values) => values
            .iter()
            .map(|v| v.as_str().map(str::to_string).ok_or_else(|| invalid(v)))
            .collect::<CutoutResult<Vec<_>>>()?,
        other => return Err(invalid(other)),
    };

    let mut unique: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        if !unique.contains(&item) {
            unique.push(item);
        }
    }
    Ok(unique)
}
