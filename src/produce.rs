//! Statement production: walking a mapping tree over a value source
//!
//! One call per root node per row or record. The root's full contribution
//! is built before anything is staged, so a resolution failure leaves no
//! partial statement set behind. An absent cell value is a normal outcome:
//! the affected subtree contributes nothing and sibling edges continue.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ResolutionError;
use crate::statement::{Statement, Term};
use crate::table::ValueSource;
use crate::transform::{LiteralNode, Node, RdfTransform, ResourceNode, ValueMapping};

static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([^}]+)\}").expect("valid regex"));

/// Row bindings a node resolves against
///
/// A root resolves against every row of the source. A row-derived subject
/// narrows its subtree to the binding it came from, so a multi-row record
/// does not cross-join one row's subject with another row's values. A
/// constant subject keeps the full record in scope.
#[derive(Debug, Clone, Copy)]
enum Scope {
    All,
    Binding(usize),
}

impl Scope {
    fn range(self, source: &dyn ValueSource) -> std::ops::Range<usize> {
        match self {
            Scope::All => 0..source.bindings(),
            Scope::Binding(b) => b..b + 1,
        }
    }
}

/// Produce all statements for one root node over one row or record
///
/// Returns the statements in traversal order: each resolved subject, then
/// its edges in authored order, recursing into resource-valued children.
/// Resolution failures propagate; absent values do not.
pub fn statements_for_root(
    transform: &RdfTransform,
    root: &ResourceNode,
    source: &dyn ValueSource,
) -> Result<Vec<Statement>, ResolutionError> {
    let mut statements = Vec::new();
    for (subject, scope) in resource_iris(transform, root, source, Scope::All)? {
        emit_edges(transform, root, &subject, source, scope, &mut statements)?;
    }
    Ok(statements)
}

/// Emit statements for a resource node's outgoing edges under `subject`
fn emit_edges(
    transform: &RdfTransform,
    node: &ResourceNode,
    subject: &str,
    source: &dyn ValueSource,
    scope: Scope,
    out: &mut Vec<Statement>,
) -> Result<(), ResolutionError> {
    for edge in &node.properties {
        let predicate = transform.resolve_iri(&edge.predicate)?;
        match &edge.child {
            Node::Literal(literal) => {
                for term in literal_terms(transform, literal, source, scope)? {
                    out.push(Statement::new(subject, &predicate, term));
                }
            }
            Node::Resource(child) => {
                for (object, child_scope) in resource_iris(transform, child, source, scope)? {
                    out.push(Statement::new(subject, &predicate, Term::iri(object.clone())));
                    emit_edges(transform, child, &object, source, child_scope, out)?;
                }
            }
        }
    }
    Ok(())
}

/// Resolve a resource node's identifying IRIs within `scope`
///
/// Constants resolve once and keep the scope; cell and template mappings
/// resolve once per in-scope binding, skipping absent values, and narrow
/// their subtree to that binding. An empty result is the modeled "absent
/// value" outcome, not a failure.
fn resource_iris(
    transform: &RdfTransform,
    node: &ResourceNode,
    source: &dyn ValueSource,
    scope: Scope,
) -> Result<Vec<(String, Scope)>, ResolutionError> {
    match &node.value {
        ValueMapping::Constant { value } => Ok(vec![(transform.resolve_iri(value)?, scope)]),
        ValueMapping::Cell { column } => {
            let mut iris = Vec::new();
            for binding in scope.range(source) {
                if let Some(cell) = source.cell(column, binding) {
                    if !cell.is_absent() {
                        // Cell values are used as-is: an absolute IRI in
                        // the data must survive unescaped.
                        iris.push((
                            transform.resolve_value(&cell.lexical()),
                            Scope::Binding(binding),
                        ));
                    }
                }
            }
            Ok(iris)
        }
        ValueMapping::Template { pattern } => {
            let mut iris = Vec::new();
            for binding in scope.range(source) {
                if let Some(expanded) = expand_template(pattern, source, binding, true) {
                    iris.push((transform.resolve_iri(&expanded)?, Scope::Binding(binding)));
                }
            }
            Ok(iris)
        }
    }
}

/// Resolve a literal node's terms within `scope`
fn literal_terms(
    transform: &RdfTransform,
    node: &LiteralNode,
    source: &dyn ValueSource,
    scope: Scope,
) -> Result<Vec<Term>, ResolutionError> {
    let mut terms = Vec::new();
    match &node.value {
        ValueMapping::Constant { value } => {
            terms.push(make_literal(transform, node, value.clone(), None)?);
        }
        ValueMapping::Cell { column } => {
            for binding in scope.range(source) {
                if let Some(cell) = source.cell(column, binding) {
                    if !cell.is_absent() {
                        terms.push(make_literal(
                            transform,
                            node,
                            cell.lexical(),
                            cell.datatype(),
                        )?);
                    }
                }
            }
        }
        ValueMapping::Template { pattern } => {
            for binding in scope.range(source) {
                if let Some(expanded) = expand_template(pattern, source, binding, false) {
                    terms.push(make_literal(transform, node, expanded, None)?);
                }
            }
        }
    }
    Ok(terms)
}

/// Build a literal term, applying datatype precedence
///
/// Language tag wins (rdf:langString), then the node's authored datatype
/// (resolved against the prefix declarations), then the cell value's
/// intrinsic datatype, else untyped.
fn make_literal(
    transform: &RdfTransform,
    node: &LiteralNode,
    value: String,
    inferred: Option<&'static str>,
) -> Result<Term, ResolutionError> {
    if let Some(language) = &node.language {
        return Ok(Term::lang_string(value, language));
    }
    if let Some(datatype) = &node.datatype {
        return Ok(Term::typed(value, transform.resolve_iri(datatype)?));
    }
    Ok(Term::Literal {
        value,
        datatype: inferred.map(str::to_string),
        language: None,
    })
}

/// Expand `{column}` placeholders against one binding of the source
///
/// Returns `None` when any referenced column is absent; the caller treats
/// that as a modeled absent value. `escape` applies IRI percent-escaping
/// to substituted values (on for IRI templates, off for literal ones).
fn expand_template(
    pattern: &str,
    source: &dyn ValueSource,
    binding: usize,
    escape: bool,
) -> Option<String> {
    let mut result = pattern.to_string();
    for cap in PLACEHOLDER_RE.captures_iter(pattern) {
        let placeholder = cap.get(0).map(|m| m.as_str())?;
        let column = &cap[1];
        let cell = source.cell(column, binding)?;
        if cell.is_absent() {
            return None;
        }
        let lexical = cell.lexical();
        let substituted = if escape {
            iri_escape(&lexical)
        } else {
            lexical
        };
        result = result.replace(placeholder, &substituted);
    }
    Some(result)
}

/// IRI-escape a value for use inside an identifier
///
/// Keeps unreserved and common sub-delimiter characters, percent-encodes
/// the rest (UTF-8 bytes).
fn iri_escape(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '-' | '.' | '_' | '~' => result.push(c),
            '!' | '$' | '&' | '\'' | '(' | ')' | '*' | '+' | ',' | ';' | '=' => result.push(c),
            ':' | '@' => result.push(c),
            _ => {
                let mut buf = [0u8; 4];
                for byte in c.encode_utf8(&mut buf).bytes() {
                    result.push_str(&format!("%{byte:02X}"));
                }
            }
        }
    }
    result
}
