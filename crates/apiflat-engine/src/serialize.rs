//! Node → plain JSON
//!
//! Source nodes serialize back to their original JSON shape, so this is the
//! single place where info, servers, tags, schemas, parameters, request
//! bodies, security schemes and requirements are turned into output values.

use serde::Serialize;
use serde_json::Value;

use crate::TransformError;

/// Serialize any source node to a JSON value.
///
/// # Errors
///
/// Returns error if the node contains a map with non-string keys.
pub fn to_json<T: Serialize + ?Sized>(node: &T) -> Result<Value, TransformError> {
    serde_json::to_value(node).map_err(|e| TransformError::Serialize(e.to_string()))
}
