//! Path keys: raw path + URI-template query expression

use std::collections::HashMap;

use indexmap::IndexSet;

use crate::source::{Document, ParameterLocation, PathItem};

/// Derive the path key of a path item.
///
/// Query parameter names are collected across all operations, first
/// occurrence wins the position. `$ref` parameters count once they resolve
/// to a query parameter through `doc`'s components. Without any, the raw
/// path is the key; otherwise `{?a,b}` is appended.
#[must_use]
pub fn path_key(doc: &Document, path: &str, item: &PathItem) -> String {
    let names: IndexSet<&str> = item
        .operations()
        .flat_map(|(_, op)| op.parameters.iter())
        .filter_map(|p| doc.resolve_parameter(p))
        .filter(|p| p.location == ParameterLocation::Query)
        .map(|p| p.name.as_str())
        .collect();

    if names.is_empty() {
        return path.to_string();
    }
    let joined = names.into_iter().collect::<Vec<_>>().join(",");
    format!("{path}{{?{joined}}}")
}

/// Memoizing [`path_key`], keyed by raw path.
///
/// The first path item seen for a raw path decides its key.
#[derive(Debug, Default)]
pub struct PathKeyResolver<'a> {
    cache: HashMap<&'a str, String>,
}

impl<'a> PathKeyResolver<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&mut self, doc: &Document, path: &'a str, item: &PathItem) -> &str {
        self.cache
            .entry(path)
            .or_insert_with(|| path_key(doc, path, item))
    }
}
