//! apiflat-engine: OpenAPI 3.0 → URI-template keyed document conversion
//!
//! A source document is loaded into a typed tree ([`source`]), walked once
//! top-down ([`walk`]), and the listeners in [`assemble`] build the target
//! document as nodes go by. Each operation is expanded into one request
//! entry per request content type by an isolated sub-walk.

pub mod assemble;
pub mod load;
pub mod serialize;
pub mod source;
pub mod walk;

pub use assemble::{DocumentAssembler, OperationAssembler, PathKeyResolver, path_key};
pub use load::{LoadError, load, parse};
pub use source::Document;

use apiflat_core::{Config, TargetDocument};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("Serialize error: {0}")]
    Serialize(String),
    #[error("Duplicate {scope} key: {key}")]
    KeyCollision { scope: String, key: String },
}

/// Convert a source document into a target document.
///
/// # Errors
///
/// Returns error if a node cannot be serialized, or if two entries share a
/// key while [`apiflat_core::CollisionPolicy::Error`] is configured.
pub fn transform(doc: &Document, config: &Config) -> Result<TargetDocument, TransformError> {
    let mut assembler = DocumentAssembler::new(doc, config);
    walk::walk_document(doc, &mut assembler)?;
    let target = assembler.finish();
    debug!(
        paths = target.paths.len(),
        requests = target.paths.values().map(|p| p.requests.len()).sum::<usize>(),
        "transform complete"
    );
    Ok(target)
}
