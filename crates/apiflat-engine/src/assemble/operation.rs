//! Per-variant listener: builds one request entry from one operation subtree

use apiflat_core::naming::DEFAULT_STATUS;
use apiflat_core::{
    Config, RequestEntry, ResponseEntry, SecurityMode, qualified_key, response_name,
};
use serde_json::Value;
use tracing::trace;

use super::{insert_keyed, merge_parameter};
use crate::TransformError;
use crate::serialize::to_json;
use crate::source::{Document, Response};
use crate::walk::{Node, Owner, Visitor, Walk};

/// Builds a single request entry, fixed to at most one request content type.
///
/// A fresh assembler is used for every variant; nothing is shared between
/// variants of the same operation.
pub struct OperationAssembler<'a> {
    source: &'a Document,
    config: &'a Config,
    media_type: Option<&'a str>,
    request: RequestEntry,
}

impl<'a> OperationAssembler<'a> {
    #[must_use]
    pub fn new(source: &'a Document, config: &'a Config, media_type: Option<&'a str>) -> Self {
        Self {
            source,
            config,
            media_type,
            request: RequestEntry::default(),
        }
    }

    #[must_use]
    pub fn finish(self) -> RequestEntry {
        self.request
    }

    fn add_response(&mut self, status: &str, response: &Response) -> Result<(), TransformError> {
        let code = (status != DEFAULT_STATUS).then_some(status);
        let base = response_name(code);
        let status_code = code.unwrap_or(DEFAULT_STATUS);
        let policy = self.config.key_collisions;

        let entry = |media: Option<(&String, Option<Value>)>| ResponseEntry {
            status_code: status_code.to_string(),
            description: response.description.clone(),
            content_type: media.as_ref().map(|(name, _)| name.to_string()),
            content_schema: media.and_then(|(_, schema)| schema),
        };

        let mut variants = Vec::with_capacity(response.content.len());
        for (name, media) in &response.content {
            let schema = media.schema.as_ref().map(to_json).transpose()?;
            variants.push((name, schema));
        }

        if variants.len() <= 1 {
            let plain = entry(variants.first().cloned());
            insert_keyed(&mut self.request.responses, base.clone(), plain, policy, "response")?;
        }
        for (name, schema) in variants {
            let key = qualified_key(&base, name);
            let qualified = entry(Some((name, schema)));
            insert_keyed(&mut self.request.responses, key, qualified, policy, "response")?;
        }
        Ok(())
    }

    fn add_security(&mut self, requirement: Value) {
        match self.config.security {
            SecurityMode::Last => self.request.security = Some(requirement),
            SecurityMode::All => match &mut self.request.security {
                Some(Value::Array(all)) => all.push(requirement),
                _ => self.request.security = Some(Value::Array(vec![requirement])),
            },
        }
    }
}

impl<'a> Visitor<'a> for OperationAssembler<'a> {
    fn visit(&mut self, node: Node<'a>) -> Result<Walk, TransformError> {
        match node {
            Node::Operation(op) => {
                let operation = op.operation;
                self.request = RequestEntry {
                    description: operation.description.clone(),
                    summary: operation.summary.clone(),
                    method: op.method.as_str().to_string(),
                    tags: (!operation.tags.is_empty()).then(|| operation.tags.clone()),
                    content_type: self.media_type.map(str::to_string),
                    ..RequestEntry::default()
                };
            }
            Node::ExternalDocs {
                owner: Owner::Operation,
                docs,
            } => {
                self.request.external_documentation = Some(to_json(docs)?);
            }
            Node::Parameter { parameter, .. } => {
                merge_parameter(self.source, &mut self.request.parameter_schema, parameter)?;
                return Ok(Walk::SkipChildren);
            }
            Node::RequestBody { body, .. } => {
                let schema = self
                    .media_type
                    .and_then(|media_type| body.content.get(media_type))
                    .and_then(|media| media.schema.as_ref());
                if let Some(schema) = schema {
                    self.request.content_schema = Some(to_json(schema)?);
                }
                return Ok(Walk::SkipChildren);
            }
            Node::Response { status, response } => {
                self.add_response(status, response)?;
                return Ok(Walk::SkipChildren);
            }
            Node::SecurityRequirement {
                owner: Owner::Operation,
                requirement,
            } => {
                let value = to_json(requirement)?;
                self.add_security(value);
            }
            Node::Extension {
                owner: Owner::Operation,
                name,
                value,
            } => {
                self.request.extensions.insert(name.to_string(), value.clone());
            }
            other => trace!(node = other.kind(), "no request-level mapping"),
        }
        Ok(Walk::Continue)
    }
}
