//! Mapping node tree structures
//!
//! A mapping tree is rooted at one or more [`ResourceNode`]s. Resource
//! nodes own property edges; each edge carries a predicate identifier and
//! exactly one child node, resource or literal. Ownership makes the tree
//! strict: a node belongs to one parent edge, roots have no parent, and no
//! sharing or cycles are possible.

use serde::{Deserialize, Serialize};

/// Source of a node's value
///
/// Defines how a node obtains its identifying IRI (resource nodes) or its
/// lexical value (literal nodes) for the current row or record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "camelCase")]
pub enum ValueMapping {
    /// A fixed, authored value (constant IRI or literal text)
    Constant { value: String },
    /// The value of a named table column
    Cell { column: String },
    /// A pattern with `{column}` placeholders expanded per row
    Template { pattern: String },
}

impl ValueMapping {
    /// Create a constant value mapping
    pub fn constant(value: impl Into<String>) -> Self {
        ValueMapping::Constant {
            value: value.into(),
        }
    }

    /// Create a column-bound value mapping
    pub fn cell(column: impl Into<String>) -> Self {
        ValueMapping::Cell {
            column: column.into(),
        }
    }

    /// Create a template value mapping
    pub fn template(pattern: impl Into<String>) -> Self {
        ValueMapping::Template {
            pattern: pattern.into(),
        }
    }
}

/// A node in the mapping tree
///
/// The variant set is closed: a node is either resource-valued or
/// literal-valued, and every traversal point matches exhaustively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "nodeType", rename_all = "camelCase")]
pub enum Node {
    /// Produces an IRI-identified subject/object with outgoing edges
    Resource(ResourceNode),
    /// Produces a literal value with optional datatype or language tag
    Literal(LiteralNode),
}

/// A resource node: IRI identity plus outgoing property edges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceNode {
    /// How the node's identifying IRI is obtained
    pub value: ValueMapping,

    /// Outgoing property edges, in authored order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<PropertyEdge>,
}

impl ResourceNode {
    /// Create a resource node with no outgoing edges
    pub fn new(value: ValueMapping) -> Self {
        Self {
            value,
            properties: Vec::new(),
        }
    }

    /// Add a property edge, returning self for chaining
    pub fn with_property(mut self, predicate: impl Into<String>, child: Node) -> Self {
        self.properties.push(PropertyEdge {
            predicate: predicate.into(),
            child,
        });
        self
    }
}

/// A predicate-labeled edge owning exactly one child node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyEdge {
    /// Authored predicate identifier (CURIE or absolute IRI)
    pub predicate: String,

    /// The child node the edge points at
    pub child: Node,
}

/// A literal node: lexical value plus optional datatype or language tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteralNode {
    /// How the node's lexical value is obtained
    pub value: ValueMapping,

    /// Authored datatype identifier overriding any inferred datatype
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,

    /// Language tag; implies rdf:langString
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl LiteralNode {
    /// Create an untyped literal node
    pub fn new(value: ValueMapping) -> Self {
        Self {
            value,
            datatype: None,
            language: None,
        }
    }

    /// Set an authored datatype, returning self for chaining
    pub fn with_datatype(mut self, datatype: impl Into<String>) -> Self {
        self.datatype = Some(datatype.into());
        self
    }

    /// Set a language tag, returning self for chaining
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_json_shape() {
        let node = Node::Literal(
            LiteralNode::new(ValueMapping::cell("name")).with_language("en"),
        );
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["nodeType"], "literal");
        assert_eq!(json["value"]["source"], "cell");
        assert_eq!(json["value"]["column"], "name");
        assert_eq!(json["language"], "en");
        assert!(json.get("datatype").is_none());
    }

    #[test]
    fn test_node_round_trip() {
        let node = Node::Resource(
            ResourceNode::new(ValueMapping::template("ex:{id}")).with_property(
                "ex:name",
                Node::Literal(LiteralNode::new(ValueMapping::cell("name"))),
            ),
        );
        let json = serde_json::to_string(&node).unwrap();
        let back: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(back, node);
    }
}
