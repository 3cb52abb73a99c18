//! Tree traversal: one top-down walk, one callback per node
//!
//! Every node kind of the source model is a variant of [`Node`]. A node
//! carries the structural context its listener needs (owning path item,
//! method, parent scope), so listeners never track a "current" position
//! themselves.
//!
//! ```text
//! Document → Info (Contact, License) → Extensions → Servers → Tags
//!   → ExternalDocs → Paths → PathItem → Parameters
//!       → Operation (get/put/post/patch/delete)
//!           → ExternalDocs, Parameters, RequestBody → MediaType → Schema…
//!           → Responses → Response → Header, MediaType → Schema…
//!           → SecurityRequirement, Extensions
//!   → SchemaDefinition, ParameterDefinition, RequestBodyDefinition,
//!     SecurityScheme → OAuthFlow
//!   → SecurityRequirement (document)
//! ```

use indexmap::IndexMap;
use serde_json::Value;
use tracing::warn;

use crate::TransformError;
use crate::source::{
    AdditionalProperties, Contact, Document, ExternalDocs, Header, Info, License, MediaType,
    Method, OAuthFlow, OAuthFlowKind, Operation, Parameter, PathItem, ReferenceOr, RequestBody,
    Response, Schema, SecurityRequirement, SecurityScheme, Server, Tag, Xml, vendor_extensions,
};

/// Whether the walker descends into the children of the node just visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
    Continue,
    SkipChildren,
}

/// Node owning an extension, external docs or security requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    Document,
    Info,
    Tag,
    PathItem,
    Operation,
    Response,
}

/// An operation together with where it lives.
#[derive(Debug, Clone, Copy)]
pub struct OperationRef<'a> {
    pub path: &'a str,
    pub item: &'a PathItem,
    pub method: Method,
    pub operation: &'a Operation,
}

/// Where a parameter is declared.
#[derive(Debug, Clone, Copy)]
pub enum ParameterScope<'a> {
    PathItem { path: &'a str, item: &'a PathItem },
    Operation(OperationRef<'a>),
}

/// One visited node.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Document(&'a Document),
    Info(&'a Info),
    Contact(&'a Contact),
    License(&'a License),
    ExternalDocs {
        owner: Owner,
        docs: &'a ExternalDocs,
    },
    Extension {
        owner: Owner,
        name: &'a str,
        value: &'a Value,
    },
    Tag(&'a Tag),
    Server(&'a Server),
    Paths(&'a IndexMap<String, PathItem>),
    PathItem {
        path: &'a str,
        item: &'a PathItem,
    },
    Parameter {
        scope: ParameterScope<'a>,
        parameter: &'a ReferenceOr<Parameter>,
    },
    ParameterDefinition {
        name: &'a str,
        parameter: &'a ReferenceOr<Parameter>,
    },
    Operation(OperationRef<'a>),
    RequestBody {
        operation: OperationRef<'a>,
        body: &'a RequestBody,
    },
    RequestBodyDefinition {
        name: &'a str,
        body: &'a ReferenceOr<RequestBody>,
    },
    MediaType {
        name: &'a str,
        media: &'a MediaType,
    },
    Responses(&'a IndexMap<String, ReferenceOr<Response>>),
    Response {
        status: &'a str,
        response: &'a Response,
    },
    Schema(&'a Schema),
    SchemaDefinition {
        name: &'a str,
        schema: &'a Schema,
    },
    AdditionalPropertiesSchema(&'a Schema),
    ItemsSchema(&'a Schema),
    PropertySchema {
        name: &'a str,
        schema: &'a Schema,
    },
    SecurityScheme {
        name: &'a str,
        scheme: &'a ReferenceOr<SecurityScheme>,
    },
    SecurityRequirement {
        owner: Owner,
        requirement: &'a SecurityRequirement,
    },
    Header {
        name: &'a str,
        header: &'a Header,
    },
    OAuthFlow {
        kind: OAuthFlowKind,
        flow: &'a OAuthFlow,
    },
    Xml(&'a Xml),
}

impl Node<'_> {
    /// Node kind label for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Document(_) => "document",
            Self::Info(_) => "info",
            Self::Contact(_) => "contact",
            Self::License(_) => "license",
            Self::ExternalDocs { .. } => "external-docs",
            Self::Extension { .. } => "extension",
            Self::Tag(_) => "tag",
            Self::Server(_) => "server",
            Self::Paths(_) => "paths",
            Self::PathItem { .. } => "path-item",
            Self::Parameter { .. } => "parameter",
            Self::ParameterDefinition { .. } => "parameter-definition",
            Self::Operation(_) => "operation",
            Self::RequestBody { .. } => "request-body",
            Self::RequestBodyDefinition { .. } => "request-body-definition",
            Self::MediaType { .. } => "media-type",
            Self::Responses(_) => "responses",
            Self::Response { .. } => "response",
            Self::Schema(_) => "schema",
            Self::SchemaDefinition { .. } => "schema-definition",
            Self::AdditionalPropertiesSchema(_) => "additional-properties-schema",
            Self::ItemsSchema(_) => "items-schema",
            Self::PropertySchema { .. } => "property-schema",
            Self::SecurityScheme { .. } => "security-scheme",
            Self::SecurityRequirement { .. } => "security-requirement",
            Self::Header { .. } => "header",
            Self::OAuthFlow { .. } => "oauth-flow",
            Self::Xml(_) => "xml",
        }
    }
}

/// Traversal listener.
pub trait Visitor<'a> {
    /// Called once per node, parents before children.
    ///
    /// # Errors
    ///
    /// An error aborts the walk and is returned to the caller.
    fn visit(&mut self, node: Node<'a>) -> Result<Walk, TransformError>;
}

fn enter<'a, V: Visitor<'a>>(visitor: &mut V, node: Node<'a>) -> Result<bool, TransformError> {
    Ok(visitor.visit(node)? == Walk::Continue)
}

fn walk_extensions<'a, V: Visitor<'a>>(
    owner: Owner,
    extensions: &'a IndexMap<String, Value>,
    visitor: &mut V,
) -> Result<(), TransformError> {
    for (name, value) in vendor_extensions(extensions) {
        visitor.visit(Node::Extension { owner, name, value })?;
    }
    Ok(())
}

/// Walk a whole document.
///
/// # Errors
///
/// Propagates the first error returned by the visitor.
pub fn walk_document<'a, V: Visitor<'a>>(
    doc: &'a Document,
    visitor: &mut V,
) -> Result<(), TransformError> {
    if !enter(visitor, Node::Document(doc))? {
        return Ok(());
    }

    if enter(visitor, Node::Info(&doc.info))? {
        if let Some(contact) = &doc.info.contact {
            visitor.visit(Node::Contact(contact))?;
        }
        if let Some(license) = &doc.info.license {
            visitor.visit(Node::License(license))?;
        }
        walk_extensions(Owner::Info, &doc.info.extensions, visitor)?;
    }

    walk_extensions(Owner::Document, &doc.extensions, visitor)?;

    for server in &doc.servers {
        visitor.visit(Node::Server(server))?;
    }
    for tag in &doc.tags {
        if enter(visitor, Node::Tag(tag))? {
            if let Some(docs) = &tag.external_docs {
                visitor.visit(Node::ExternalDocs {
                    owner: Owner::Tag,
                    docs,
                })?;
            }
        }
    }
    if let Some(docs) = &doc.external_docs {
        visitor.visit(Node::ExternalDocs {
            owner: Owner::Document,
            docs,
        })?;
    }

    if enter(visitor, Node::Paths(&doc.paths))? {
        for (path, item) in &doc.paths {
            walk_path_item(doc, path, item, visitor)?;
        }
    }

    if let Some(components) = &doc.components {
        // Component responses and headers are only reached through references.
        for (name, schema) in &components.schemas {
            walk_schema(Node::SchemaDefinition { name, schema }, schema, visitor)?;
        }
        for (name, parameter) in &components.parameters {
            if enter(visitor, Node::ParameterDefinition { name, parameter })? {
                walk_parameter_children(parameter, visitor)?;
            }
        }
        for (name, body) in &components.request_bodies {
            if enter(visitor, Node::RequestBodyDefinition { name, body })? {
                if let ReferenceOr::Item(body) = body {
                    walk_content(&body.content, visitor)?;
                }
            }
        }
        for (name, scheme) in &components.security_schemes {
            if enter(visitor, Node::SecurityScheme { name, scheme })? {
                let flows = scheme.as_item().and_then(|s| s.flows.as_ref());
                for (kind, flow) in flows.into_iter().flat_map(|f| f.iter()) {
                    visitor.visit(Node::OAuthFlow { kind, flow })?;
                }
            }
        }
    }

    for requirement in &doc.security {
        visitor.visit(Node::SecurityRequirement {
            owner: Owner::Document,
            requirement,
        })?;
    }

    Ok(())
}

fn walk_path_item<'a, V: Visitor<'a>>(
    doc: &'a Document,
    path: &'a str,
    item: &'a PathItem,
    visitor: &mut V,
) -> Result<(), TransformError> {
    if !enter(visitor, Node::PathItem { path, item })? {
        return Ok(());
    }

    for parameter in &item.parameters {
        walk_parameter(ParameterScope::PathItem { path, item }, parameter, visitor)?;
    }
    for (method, operation) in item.operations() {
        let op = OperationRef {
            path,
            item,
            method,
            operation,
        };
        walk_operation(doc, op, visitor)?;
    }
    walk_extensions(Owner::PathItem, &item.extensions, visitor)
}

/// Walk one operation subtree.
///
/// Request body and response references are resolved against the document's
/// components; parameter references are passed through unresolved.
///
/// # Errors
///
/// Propagates the first error returned by the visitor.
pub fn walk_operation<'a, V: Visitor<'a>>(
    doc: &'a Document,
    op: OperationRef<'a>,
    visitor: &mut V,
) -> Result<(), TransformError> {
    if !enter(visitor, Node::Operation(op))? {
        return Ok(());
    }
    let operation = op.operation;

    if let Some(docs) = &operation.external_docs {
        visitor.visit(Node::ExternalDocs {
            owner: Owner::Operation,
            docs,
        })?;
    }

    for parameter in &operation.parameters {
        walk_parameter(ParameterScope::Operation(op), parameter, visitor)?;
    }

    if let Some(body_ref) = &operation.request_body {
        match doc.resolve_request_body(body_ref) {
            Some(body) => {
                if enter(visitor, Node::RequestBody { operation: op, body })? {
                    walk_content(&body.content, visitor)?;
                }
            }
            None => warn!(
                path = op.path,
                method = %op.method,
                "unresolvable request body reference"
            ),
        }
    }

    if enter(visitor, Node::Responses(&operation.responses))? {
        for (status, response_ref) in &operation.responses {
            let Some(response) = doc.resolve_response(response_ref) else {
                warn!(
                    path = op.path,
                    method = %op.method,
                    status = status.as_str(),
                    "unresolvable response reference"
                );
                continue;
            };
            walk_response(doc, status, response, visitor)?;
        }
    }

    for requirement in operation.security.iter().flatten() {
        visitor.visit(Node::SecurityRequirement {
            owner: Owner::Operation,
            requirement,
        })?;
    }

    walk_extensions(Owner::Operation, &operation.extensions, visitor)
}

fn walk_response<'a, V: Visitor<'a>>(
    doc: &'a Document,
    status: &'a str,
    response: &'a Response,
    visitor: &mut V,
) -> Result<(), TransformError> {
    if !enter(visitor, Node::Response { status, response })? {
        return Ok(());
    }
    for (name, header_ref) in &response.headers {
        let Some(header) = doc.resolve_header(header_ref) else {
            continue;
        };
        if enter(visitor, Node::Header { name, header })? {
            if let Some(schema) = &header.schema {
                walk_schema(Node::Schema(schema), schema, visitor)?;
            }
        }
    }
    walk_content(&response.content, visitor)?;
    walk_extensions(Owner::Response, &response.extensions, visitor)
}

fn walk_parameter<'a, V: Visitor<'a>>(
    scope: ParameterScope<'a>,
    parameter: &'a ReferenceOr<Parameter>,
    visitor: &mut V,
) -> Result<(), TransformError> {
    if enter(visitor, Node::Parameter { scope, parameter })? {
        walk_parameter_children(parameter, visitor)?;
    }
    Ok(())
}

fn walk_parameter_children<'a, V: Visitor<'a>>(
    parameter: &'a ReferenceOr<Parameter>,
    visitor: &mut V,
) -> Result<(), TransformError> {
    let ReferenceOr::Item(parameter) = parameter else {
        return Ok(());
    };
    if let Some(schema) = &parameter.schema {
        walk_schema(Node::Schema(schema), schema, visitor)?;
    }
    walk_content(&parameter.content, visitor)
}

fn walk_content<'a, V: Visitor<'a>>(
    content: &'a IndexMap<String, MediaType>,
    visitor: &mut V,
) -> Result<(), TransformError> {
    for (name, media) in content {
        if enter(visitor, Node::MediaType { name, media })? {
            if let Some(schema) = &media.schema {
                walk_schema(Node::Schema(schema), schema, visitor)?;
            }
        }
    }
    Ok(())
}

/// Visit `node` (which wraps `schema`), then its subschemas.
fn walk_schema<'a, V: Visitor<'a>>(
    node: Node<'a>,
    schema: &'a Schema,
    visitor: &mut V,
) -> Result<(), TransformError> {
    if !enter(visitor, node)? {
        return Ok(());
    }
    for (name, property) in &schema.properties {
        walk_schema(
            Node::PropertySchema {
                name,
                schema: property,
            },
            property,
            visitor,
        )?;
    }
    if let Some(items) = &schema.items {
        walk_schema(Node::ItemsSchema(items), items, visitor)?;
    }
    if let Some(AdditionalProperties::Schema(extra)) = &schema.additional_properties {
        walk_schema(Node::AdditionalPropertiesSchema(extra), extra, visitor)?;
    }
    for sub in schema
        .all_of
        .iter()
        .chain(&schema.one_of)
        .chain(&schema.any_of)
        .chain(schema.not.as_deref())
    {
        walk_schema(Node::Schema(sub), sub, visitor)?;
    }
    if let Some(xml) = &schema.xml {
        visitor.visit(Node::Xml(xml))?;
    }
    Ok(())
}
