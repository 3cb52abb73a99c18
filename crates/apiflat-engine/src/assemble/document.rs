//! Top-level listener: document skeleton, path entries, components, fan-out

use apiflat_core::{
    Config, ParameterSchema, PathEntry, TargetDocument, qualified_key, request_base,
};
use indexmap::IndexMap;
use tracing::{debug, trace};

use super::{
    OperationAssembler, PathKeyResolver, insert_keyed, merge_parameter, parameter_value_schema,
};
use crate::TransformError;
use crate::serialize::to_json;
use crate::source::{Document, PathItem, ReferenceOr, vendor_extensions};
use crate::walk::{Node, OperationRef, Owner, ParameterScope, Visitor, Walk, walk_operation};

/// Builds the target document during a full walk.
pub struct DocumentAssembler<'a> {
    source: &'a Document,
    config: &'a Config,
    target: TargetDocument,
    path_keys: PathKeyResolver<'a>,
}

impl<'a> DocumentAssembler<'a> {
    #[must_use]
    pub fn new(source: &'a Document, config: &'a Config) -> Self {
        Self {
            source,
            config,
            target: TargetDocument::default(),
            path_keys: PathKeyResolver::new(),
        }
    }

    /// Hand off the finished document.
    #[must_use]
    pub fn finish(self) -> TargetDocument {
        self.target
    }

    fn start_document(&mut self, doc: &Document) -> Result<(), TransformError> {
        self.target = TargetDocument {
            openapi: self.config.target_version.clone(),
            info: to_json(&doc.info)?,
            servers: (!doc.servers.is_empty()).then(Vec::new),
            tags: (!doc.tags.is_empty()).then(Vec::new),
            external_docs: None,
            paths: IndexMap::new(),
            components: None,
            extensions: vendor_extensions(&doc.extensions)
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
        };
        if doc.components.is_some() {
            self.target.components_mut();
        }
        Ok(())
    }

    fn path_entry(&mut self, path: &'a str, item: &PathItem) -> &mut PathEntry {
        let key = self.path_keys.resolve(self.source, path, item).to_string();
        self.target.paths.entry(key).or_default()
    }

    /// Run one sub-walk per request content type and store the results.
    fn fan_out(&mut self, op: OperationRef<'a>) -> Result<(), TransformError> {
        let media_types: Vec<&'a str> = op
            .operation
            .request_body
            .as_ref()
            .and_then(|body| self.source.resolve_request_body(body))
            .map(|body| body.content.keys().map(String::as_str).collect())
            .unwrap_or_default();

        let base = request_base(op.operation.operation_id.as_deref(), op.method.as_str());
        let variants: Vec<(String, Option<&'a str>)> = match media_types.as_slice() {
            [] => vec![(base, None)],
            [single] => vec![(base, Some(*single))],
            many => many
                .iter()
                .map(|media_type| (qualified_key(&base, media_type), Some(*media_type)))
                .collect(),
        };
        debug!(
            path = op.path,
            method = %op.method,
            requests = variants.len(),
            "fan-out"
        );

        for (key, media_type) in variants {
            let mut assembler = OperationAssembler::new(self.source, self.config, media_type);
            walk_operation(self.source, op, &mut assembler)?;
            let request = assembler.finish();

            let policy = self.config.key_collisions;
            let entry = self.path_entry(op.path, op.item);
            insert_keyed(&mut entry.requests, key, request, policy, "request")?;
        }
        Ok(())
    }
}

impl<'a> Visitor<'a> for DocumentAssembler<'a> {
    fn visit(&mut self, node: Node<'a>) -> Result<Walk, TransformError> {
        match node {
            Node::Document(doc) => self.start_document(doc)?,

            Node::Server(server) => {
                let value = to_json(server)?;
                self.target.servers.get_or_insert_with(Vec::new).push(value);
            }
            Node::Tag(tag) => {
                let value = to_json(tag)?;
                self.target.tags.get_or_insert_with(Vec::new).push(value);
                return Ok(Walk::SkipChildren);
            }
            Node::ExternalDocs {
                owner: Owner::Document,
                docs,
            } => {
                self.target.external_docs = Some(to_json(docs)?);
            }

            Node::PathItem { path, item } => {
                let entry = self.path_entry(path, item);
                entry.summary.clone_from(&item.summary);
                entry.description.clone_from(&item.description);
                if !item.parameters.is_empty() && entry.parameter_schema.is_none() {
                    entry.parameter_schema = Some(ParameterSchema::object());
                }
            }
            Node::Parameter {
                scope: ParameterScope::PathItem { path, item },
                parameter,
            } => {
                let source = self.source;
                let entry = self.path_entry(path, item);
                merge_parameter(source, &mut entry.parameter_schema, parameter)?;
            }
            Node::Operation(op) => {
                self.fan_out(op)?;
                return Ok(Walk::SkipChildren);
            }

            Node::SchemaDefinition { name, schema } => {
                let value = to_json(schema)?;
                self.target
                    .components_mut()
                    .schemas
                    .get_or_insert_with(IndexMap::new)
                    .insert(name.to_string(), value);
                return Ok(Walk::SkipChildren);
            }
            Node::ParameterDefinition { name, parameter } => {
                let value = match parameter {
                    ReferenceOr::Item(param) => {
                        let mut schema = ParameterSchema::object();
                        schema.add_property(
                            &param.name,
                            parameter_value_schema(param)?,
                            param.required,
                        );
                        to_json(&schema)?
                    }
                    ReferenceOr::Reference { .. } => to_json(parameter)?,
                };
                self.target
                    .components_mut()
                    .parameters
                    .get_or_insert_with(IndexMap::new)
                    .insert(name.to_string(), value);
                return Ok(Walk::SkipChildren);
            }
            Node::RequestBodyDefinition { name, body } => {
                let value = to_json(body)?;
                self.target
                    .components_mut()
                    .request_bodies
                    .get_or_insert_with(IndexMap::new)
                    .insert(name.to_string(), value);
                return Ok(Walk::SkipChildren);
            }
            Node::SecurityScheme { name, scheme } => {
                let value = to_json(scheme)?;
                self.target
                    .components_mut()
                    .security_schemes
                    .get_or_insert_with(IndexMap::new)
                    .insert(name.to_string(), value);
                return Ok(Walk::SkipChildren);
            }

            Node::Extension {
                owner: Owner::Document,
                ..
            } => {
                // Copied when the document started.
            }
            other => trace!(node = other.kind(), "no document-level mapping"),
        }
        Ok(Walk::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::walk::walk_document;
    use apiflat_core::CollisionPolicy;
    use serde_json::json;

    fn assemble(source: serde_json::Value, config: &Config) -> Result<TargetDocument, TransformError> {
        let doc: Document = serde_json::from_value(source).unwrap();
        let mut assembler = DocumentAssembler::new(&doc, config);
        walk_document(&doc, &mut assembler)?;
        Ok(assembler.finish())
    }

    fn base(paths: serde_json::Value) -> serde_json::Value {
        json!({
            "openapi": "3.0.3",
            "info": {"title": "Pets", "version": "1.0"},
            "paths": paths
        })
    }

    #[test]
    fn skeleton_without_optional_sections() {
        let target = assemble(base(json!({})), &Config::default()).unwrap();
        let json = target.to_json().unwrap();

        assert_eq!(json["openapi"], "4.0.0");
        assert_eq!(json["info"], json!({"title": "Pets", "version": "1.0"}));
        assert_eq!(json["paths"], json!({}));
        assert!(json.get("servers").is_none());
        assert!(json.get("tags").is_none());
        assert!(json.get("components").is_none());
    }

    #[test]
    fn configured_version_marker() {
        let config = Config {
            target_version: "4.0.0-moonwalk".into(),
            ..Config::default()
        };
        let target = assemble(base(json!({})), &config).unwrap();
        assert_eq!(target.openapi, "4.0.0-moonwalk");
    }

    #[test]
    fn servers_tags_docs_and_extensions_are_copied() {
        let mut source = base(json!({}));
        source["servers"] = json!([{"url": "https://a.example"}, {"url": "https://b.example"}]);
        source["tags"] = json!([{"name": "pets", "externalDocs": {"url": "https://docs"}}]);
        source["externalDocs"] = json!({"url": "https://docs.example"});
        source["x-logo"] = json!({"url": "logo.png"});
        source["jsonSchemaDialect"] = json!("ignored");

        let target = assemble(source, &Config::default()).unwrap();
        assert_eq!(target.servers.as_ref().map(Vec::len), Some(2));
        assert_eq!(
            target.tags,
            Some(vec![json!({"name": "pets", "externalDocs": {"url": "https://docs"}})])
        );
        assert_eq!(target.external_docs, Some(json!({"url": "https://docs.example"})));

        let json = target.to_json().unwrap();
        assert_eq!(json["x-logo"], json!({"url": "logo.png"}));
        assert!(json.get("jsonSchemaDialect").is_none());
    }

    #[test]
    fn path_entry_copies_summary_and_omits_absent_fields() {
        let target = assemble(
            base(json!({
                "/health": {"summary": "Liveness"},
                "/pets": {}
            })),
            &Config::default(),
        )
        .unwrap();
        let json = target.to_json().unwrap();

        assert_eq!(json["paths"]["/health"], json!({"summary": "Liveness"}));
        assert_eq!(json["paths"]["/pets"], json!({}));
    }

    #[test]
    fn path_level_parameters_fill_shared_schema() {
        let target = assemble(
            base(json!({
                "/pets/{id}": {
                    "parameters": [
                        {"name": "id", "in": "path", "required": true, "schema": {"type": "string"}},
                        {"name": "X-Trace", "in": "header", "schema": {"type": "string"}},
                        {"$ref": "#/components/parameters/Verbose"}
                    ],
                    "get": {"responses": {"200": {"description": "OK"}}}
                }
            })),
            &Config::default(),
        )
        .unwrap();

        let entry = &target.paths["/pets/{id}"];
        let schema = entry.parameter_schema.as_ref().unwrap();
        assert_eq!(schema.schema_type, "object");
        assert_eq!(schema.properties.keys().collect::<Vec<_>>(), vec!["id"]);
        assert_eq!(schema.required, Some(vec!["id".to_string()]));
        assert_eq!(
            schema.all_of,
            Some(vec![json!({"$ref": "#/components/parameters/Verbose"})])
        );
        // Path-level parameters stay off the request
        assert!(entry.requests["get"].parameter_schema.is_none());
    }

    #[test]
    fn header_only_path_parameters_leave_empty_object() {
        let target = assemble(
            base(json!({
                "/ping": {"parameters": [{"name": "X-Trace", "in": "header"}]}
            })),
            &Config::default(),
        )
        .unwrap();
        let schema = target.paths["/ping"].parameter_schema.as_ref().unwrap();
        assert!(schema.properties.is_empty());
        assert!(schema.required.is_none());
    }

    #[test]
    fn single_content_type_keeps_plain_key() {
        let target = assemble(
            base(json!({
                "/pets": {"post": {
                    "operationId": "createPet",
                    "requestBody": {"content": {"application/json": {"schema": {"type": "object"}}}},
                    "responses": {"201": {"description": "Created"}}
                }}
            })),
            &Config::default(),
        )
        .unwrap();

        let requests = &target.paths["/pets"].requests;
        assert_eq!(requests.keys().collect::<Vec<_>>(), vec!["createPet"]);
        assert_eq!(
            requests["createPet"].content_type.as_deref(),
            Some("application/json")
        );
    }

    #[test]
    fn multiple_content_types_fan_out() {
        let target = assemble(
            base(json!({
                "/pets": {"put": {
                    "requestBody": {"content": {
                        "application/json": {"schema": {"type": "object"}},
                        "application/vnd.api+json": {"schema": {"type": "object", "title": "jsonapi"}},
                        "text/plain": {}
                    }},
                    "responses": {"204": {"description": "Stored"}}
                }}
            })),
            &Config::default(),
        )
        .unwrap();

        let requests = &target.paths["/pets"].requests;
        assert_eq!(
            requests.keys().collect::<Vec<_>>(),
            vec![
                "put-application-json",
                "put-application-vnd-api-json",
                "put-text-plain"
            ]
        );
        let jsonapi = &requests["put-application-vnd-api-json"];
        assert_eq!(jsonapi.content_type.as_deref(), Some("application/vnd.api+json"));
        assert_eq!(
            jsonapi.content_schema,
            Some(json!({"type": "object", "title": "jsonapi"}))
        );
        assert!(requests["put-text-plain"].content_schema.is_none());
        // Each variant carries the full response set
        assert!(requests.values().all(|r| r.responses.contains_key("noContent")));
    }

    #[test]
    fn referenced_request_body_is_resolved_for_fan_out() {
        let mut source = base(json!({
            "/pets": {"post": {
                "requestBody": {"$ref": "#/components/requestBodies/Pet"},
                "responses": {"200": {"description": "OK"}}
            }}
        }));
        source["components"] = json!({"requestBodies": {"Pet": {"content": {
            "application/json": {"schema": {"type": "object"}},
            "application/xml": {"schema": {"type": "object"}}
        }}}});

        let target = assemble(source, &Config::default()).unwrap();
        let keys: Vec<&String> = target.paths["/pets"].requests.keys().collect();
        assert_eq!(keys, vec!["post-application-json", "post-application-xml"]);
    }

    #[test]
    fn sanitized_request_collision_follows_policy() {
        let paths = json!({
            "/pets": {"post": {
                "requestBody": {"content": {
                    "application/json": {},
                    "Application/JSON": {}
                }},
                "responses": {"200": {"description": "OK"}}
            }}
        });

        let lenient = assemble(base(paths.clone()), &Config::default()).unwrap();
        let requests = &lenient.paths["/pets"].requests;
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests["post-application-json"].content_type.as_deref(),
            Some("Application/JSON")
        );

        let strict = Config {
            key_collisions: CollisionPolicy::Error,
            ..Config::default()
        };
        let err = assemble(base(paths), &strict).unwrap_err();
        assert!(matches!(
            err,
            TransformError::KeyCollision { ref scope, ref key }
                if scope == "request" && key == "post-application-json"
        ));
    }

    #[test]
    fn components_are_stored_by_kind() {
        let mut source = base(json!({}));
        source["components"] = json!({
            "schemas": {"Pet": {"type": "object", "properties": {"name": {"type": "string"}}}},
            "parameters": {
                "Limit": {"name": "limit", "in": "query", "required": true, "schema": {"type": "integer"}},
                "Offset": {"name": "offset", "in": "query", "schema": {"type": "integer"}}
            },
            "requestBodies": {"Pet": {"content": {"application/json": {"schema": {"$ref": "#/components/schemas/Pet"}}}}},
            "securitySchemes": {"apiKey": {"type": "apiKey", "name": "X-Key", "in": "header"}}
        });

        let target = assemble(source, &Config::default()).unwrap();
        let components = target.components.unwrap();

        let schemas = components.schemas.unwrap();
        assert_eq!(schemas["Pet"]["properties"]["name"], json!({"type": "string"}));

        let parameters = components.parameters.unwrap();
        assert_eq!(
            parameters["Limit"],
            json!({
                "type": "object",
                "properties": {"limit": {"type": "integer"}},
                "required": ["limit"]
            })
        );
        assert_eq!(
            parameters["Offset"],
            json!({"type": "object", "properties": {"offset": {"type": "integer"}}})
        );

        let bodies = components.request_bodies.unwrap();
        assert_eq!(
            bodies["Pet"]["content"]["application/json"]["schema"],
            json!({"$ref": "#/components/schemas/Pet"})
        );

        let schemes = components.security_schemes.unwrap();
        assert_eq!(
            schemes["apiKey"],
            json!({"type": "apiKey", "name": "X-Key", "in": "header"})
        );
    }

    #[test]
    fn empty_components_section_is_kept() {
        let mut source = base(json!({}));
        source["components"] = json!({});
        let target = assemble(source, &Config::default()).unwrap();
        assert_eq!(target.to_json().unwrap()["components"], json!({}));
    }
}
