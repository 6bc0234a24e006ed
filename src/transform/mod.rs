//! Mapping configuration: base IRI, prefix declarations, and root nodes
//!
//! The configuration serializes to a JSON document (`baseIRI`,
//! `namespaces`, `roots`) and reconstructs from the same shape; the two
//! directions round-trip for any constructible tree. Identifier
//! resolution against the prefix declarations lives here because both
//! validation and statement production need it.

mod node;

pub use node::{LiteralNode, Node, PropertyEdge, ResourceNode, ValueMapping};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ResolutionError;

/// A user-authored mapping configuration
///
/// Owned by exactly one table-level configuration slot; created on first
/// edit and replaced wholesale on each subsequent edit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RdfTransform {
    /// Absolute IRI that relative references resolve against
    #[serde(rename = "baseIRI")]
    pub base_iri: String,

    /// Prefix declarations: short name to namespace IRI
    #[serde(rename = "namespaces", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub prefixes: BTreeMap<String, String>,

    /// Root resource nodes, in authored order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roots: Vec<ResourceNode>,
}

impl RdfTransform {
    /// Create an empty mapping over a base IRI
    pub fn new(base_iri: impl Into<String>) -> Self {
        Self {
            base_iri: base_iri.into(),
            prefixes: BTreeMap::new(),
            roots: Vec::new(),
        }
    }

    /// Declare a prefix, returning self for chaining
    pub fn with_prefix(mut self, name: impl Into<String>, namespace: impl Into<String>) -> Self {
        self.prefixes.insert(name.into(), namespace.into());
        self
    }

    /// Add a root node, returning self for chaining
    pub fn with_root(mut self, root: ResourceNode) -> Self {
        self.roots.push(root);
        self
    }

    /// Root nodes in authored order
    pub fn roots(&self) -> &[ResourceNode] {
        &self.roots
    }

    /// Resolve an authored identifier to an absolute IRI
    ///
    /// Declared prefixes expand to their namespace. An undeclared head is
    /// only treated as a prefix when it is scheme-shaped and the remainder
    /// is a plain local name: `scheme://` and opaque forms like
    /// `urn:isbn:1` pass through, and a colon inside a path segment
    /// (`item/a:b`) joins onto the base IRI like any relative reference.
    /// Only a CURIE-shaped token with an undeclared prefix fails with
    /// [`ResolutionError::UnknownPrefix`] rather than defaulting.
    pub fn resolve_iri(&self, token: &str) -> Result<String, ResolutionError> {
        let token = token.trim();
        if let Some((prefix, local)) = token.split_once(':') {
            if let Some(namespace) = self.prefixes.get(prefix) {
                return Ok(format!("{namespace}{local}"));
            }
            if !has_scheme(token) {
                // The colon sits inside a path segment, not a scheme.
                return Ok(self.join_base(token));
            }
            if local.starts_with("//") || local.contains(':') || local.contains('/') {
                return Ok(token.to_string());
            }
            return Err(ResolutionError::UnknownPrefix {
                prefix: prefix.to_string(),
                value: token.to_string(),
            });
        }
        Ok(self.join_base(token))
    }

    /// Resolve a cell-derived value to an absolute IRI
    ///
    /// Table data is not CURIE-authored: any `scheme:` form is taken as
    /// already absolute and everything else joins onto the base IRI. This
    /// path never fails on prefixes.
    pub fn resolve_value(&self, value: &str) -> String {
        let value = value.trim();
        if has_scheme(value) {
            return value.to_string();
        }
        self.join_base(value)
    }

    fn join_base(&self, relative: &str) -> String {
        let base = &self.base_iri;
        if relative.starts_with('#') || base.ends_with('/') || base.ends_with('#') {
            format!("{base}{relative}")
        } else {
            format!("{base}/{relative}")
        }
    }

    /// Validate the tree before statement production
    ///
    /// Checks that the base IRI is absolute and that every authored
    /// identifier in the tree resolves: edge predicates, constant resource
    /// values, literal datatypes, and the prefixed head of any template
    /// pattern. An unknown prefix is surfaced, never silently defaulted.
    pub fn validate(&self) -> Result<(), ResolutionError> {
        if !has_scheme(&self.base_iri) {
            return Err(ResolutionError::RelativeBase(self.base_iri.clone()));
        }
        for root in &self.roots {
            self.validate_resource(root)?;
        }
        Ok(())
    }

    fn validate_resource(&self, node: &ResourceNode) -> Result<(), ResolutionError> {
        self.validate_value(&node.value)?;
        for edge in &node.properties {
            self.resolve_iri(&edge.predicate)?;
            match &edge.child {
                Node::Resource(child) => self.validate_resource(child)?,
                // Literal values are data, not identifiers; only the
                // authored datatype needs to resolve.
                Node::Literal(literal) => {
                    if let Some(datatype) = &literal.datatype {
                        self.resolve_iri(datatype)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn validate_value(&self, value: &ValueMapping) -> Result<(), ResolutionError> {
        match value {
            ValueMapping::Constant { value } => {
                self.resolve_iri(value)?;
            }
            ValueMapping::Cell { .. } => {}
            ValueMapping::Template { pattern } => {
                // A prefixed template head ("ex:{id}") must use a declared
                // prefix even though expansion happens per row.
                if let Some(head) = pattern.split('{').next() {
                    if let Some((prefix, rest)) = head.split_once(':') {
                        if !self.prefixes.contains_key(prefix) && !rest.starts_with("//") {
                            return Err(ResolutionError::UnknownPrefix {
                                prefix: prefix.to_string(),
                                value: pattern.clone(),
                            });
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// Check for an RFC 3986 scheme prefix (`alpha (alnum|+|-|.)* :`)
fn has_scheme(value: &str) -> bool {
    let Some(colon) = value.find(':') else {
        return false;
    };
    let head = &value[..colon];
    let mut chars = head.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_transform() -> RdfTransform {
        RdfTransform::new("http://example.org/base")
            .with_prefix("ex", "http://example.org/")
            .with_root(
                ResourceNode::new(ValueMapping::template("ex:{id}")).with_property(
                    "ex:name",
                    Node::Literal(LiteralNode::new(ValueMapping::cell("name"))),
                ),
            )
    }

    #[test]
    fn test_resolve_prefixed() {
        let transform = sample_transform();
        assert_eq!(
            transform.resolve_iri("ex:name").unwrap(),
            "http://example.org/name"
        );
    }

    #[test]
    fn test_resolve_absolute_passthrough() {
        let transform = sample_transform();
        assert_eq!(
            transform.resolve_iri("http://other.org/p").unwrap(),
            "http://other.org/p"
        );
    }

    #[test]
    fn test_resolve_unknown_prefix() {
        let transform = sample_transform();
        let err = transform.resolve_iri("foaf:name").unwrap_err();
        match err {
            ResolutionError::UnknownPrefix { prefix, .. } => assert_eq!(prefix, "foaf"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_resolve_colon_in_path_joins_base() {
        let transform = sample_transform();
        assert_eq!(
            transform.resolve_iri("item/a:b").unwrap(),
            "http://example.org/base/item/a:b"
        );
    }

    #[test]
    fn test_resolve_opaque_uri_passthrough() {
        let transform = sample_transform();
        assert_eq!(
            transform.resolve_iri("urn:isbn:0451450523").unwrap(),
            "urn:isbn:0451450523"
        );
    }

    #[test]
    fn test_resolve_relative_joins_base() {
        let transform = sample_transform();
        assert_eq!(
            transform.resolve_iri("thing").unwrap(),
            "http://example.org/base/thing"
        );
        assert_eq!(
            transform.resolve_iri("#frag").unwrap(),
            "http://example.org/base#frag"
        );
    }

    #[test]
    fn test_resolve_value_never_errors() {
        let transform = sample_transform();
        assert_eq!(transform.resolve_value("urn:isbn:1"), "urn:isbn:1");
        assert_eq!(
            transform.resolve_value("42"),
            "http://example.org/base/42"
        );
    }

    #[test]
    fn test_validate_ok() {
        sample_transform().validate().unwrap();
    }

    #[test]
    fn test_validate_relative_base() {
        let transform = RdfTransform::new("relative/base");
        assert!(matches!(
            transform.validate(),
            Err(ResolutionError::RelativeBase(_))
        ));
    }

    #[test]
    fn test_validate_unknown_predicate_prefix() {
        let transform = RdfTransform::new("http://example.org/")
            .with_root(ResourceNode::new(ValueMapping::cell("id")).with_property(
                "foaf:name",
                Node::Literal(LiteralNode::new(ValueMapping::cell("name"))),
            ));
        assert!(matches!(
            transform.validate(),
            Err(ResolutionError::UnknownPrefix { .. })
        ));
    }

    #[test]
    fn test_validate_unknown_template_prefix() {
        let transform = RdfTransform::new("http://example.org/")
            .with_root(ResourceNode::new(ValueMapping::template("foaf:{id}")));
        assert!(matches!(
            transform.validate(),
            Err(ResolutionError::UnknownPrefix { .. })
        ));
    }

    #[test]
    fn test_round_trip_empty() {
        let transform = RdfTransform::new("http://example.org/");
        let json = serde_json::to_string(&transform).unwrap();
        let back: RdfTransform = serde_json::from_str(&json).unwrap();
        assert_eq!(back, transform);
    }

    #[test]
    fn test_round_trip_nested() {
        let deep = ResourceNode::new(ValueMapping::template("ex:{id}")).with_property(
            "ex:address",
            Node::Resource(
                ResourceNode::new(ValueMapping::template("ex:{id}/addr")).with_property(
                    "ex:city",
                    Node::Literal(
                        LiteralNode::new(ValueMapping::cell("city")).with_language("en"),
                    ),
                ),
            ),
        );
        let transform = RdfTransform::new("http://example.org/")
            .with_prefix("ex", "http://example.org/")
            .with_root(deep);
        let json = serde_json::to_string(&transform).unwrap();
        let back: RdfTransform = serde_json::from_str(&json).unwrap();
        assert_eq!(back, transform);
    }

    #[test]
    fn test_document_keys() {
        let transform = sample_transform();
        let json = serde_json::to_value(&transform).unwrap();
        assert_eq!(json["baseIRI"], "http://example.org/base");
        assert_eq!(json["namespaces"]["ex"], "http://example.org/");
        assert!(json["roots"].is_array());
    }
}
