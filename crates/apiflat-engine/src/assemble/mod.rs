//! Assemblers: traversal listeners that build the target document
//!
//! [`DocumentAssembler`] listens to the whole walk and owns the document.
//! For every operation it runs one isolated sub-walk per request content
//! type, each with a fresh [`OperationAssembler`] whose finished request is
//! inserted as a whole.

mod document;
mod operation;
mod path_key;

pub use document::DocumentAssembler;
pub use operation::OperationAssembler;
pub use path_key::{PathKeyResolver, path_key};

use apiflat_core::{CollisionPolicy, ParameterSchema};
use indexmap::IndexMap;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::TransformError;
use crate::serialize::to_json;
use crate::source::{Document, Parameter, ReferenceOr};

/// Merge one declared parameter into a parameter schema.
///
/// References go to `allOf` (unless they resolve to a header/cookie
/// parameter); inline path/query parameters become properties. The schema is
/// created on first use.
pub(crate) fn merge_parameter(
    source: &Document,
    target: &mut Option<ParameterSchema>,
    parameter: &ReferenceOr<Parameter>,
) -> Result<(), TransformError> {
    match parameter {
        ReferenceOr::Reference { reference } => {
            if let Some(location) = source.parameter_location(parameter) {
                if !location.is_schema_bound() {
                    debug!(
                        reference = reference.as_str(),
                        location = location.as_str(),
                        "parameter not mapped"
                    );
                    return Ok(());
                }
            }
            target
                .get_or_insert_with(ParameterSchema::object)
                .add_reference(to_json(parameter)?);
        }
        ReferenceOr::Item(param) => {
            if !param.location.is_schema_bound() {
                debug!(
                    name = param.name.as_str(),
                    location = param.location.as_str(),
                    "parameter not mapped"
                );
                return Ok(());
            }
            target.get_or_insert_with(ParameterSchema::object).add_property(
                &param.name,
                parameter_value_schema(param)?,
                param.required,
            );
        }
    }
    Ok(())
}

/// Serialized schema of a parameter's value; `{}` when none is declared.
pub(crate) fn parameter_value_schema(param: &Parameter) -> Result<Value, TransformError> {
    match param.value_schema() {
        Some(schema) => to_json(schema),
        None => Ok(json!({})),
    }
}

/// Insert under `key`, applying the collision policy when the key is taken.
pub(crate) fn insert_keyed<T>(
    map: &mut IndexMap<String, T>,
    key: String,
    value: T,
    policy: CollisionPolicy,
    scope: &str,
) -> Result<(), TransformError> {
    if map.contains_key(&key) {
        match policy {
            CollisionPolicy::Warn => {
                warn!(key = key.as_str(), scope, "duplicate key, later entry replaces earlier");
            }
            CollisionPolicy::Error => {
                return Err(TransformError::KeyCollision {
                    scope: scope.to_string(),
                    key,
                });
            }
        }
    }
    map.insert(key, value);
    Ok(())
}
