//! apiflat-core: Target document model and naming rules
//!
//! This crate provides the output types of the conversion (path entries,
//! request and response variants), the pure naming functions that derive
//! their keys, and the configuration that tunes the conversion.

pub mod config;
pub mod naming;
pub mod target;

pub use config::{CollisionPolicy, Config, ConfigError, SecurityMode};
pub use naming::{qualified_key, request_base, response_name, sanitize_media_type};
pub use target::{
    Components, ParameterSchema, PathEntry, RequestEntry, ResponseEntry, TARGET_VERSION,
    TargetDocument,
};
