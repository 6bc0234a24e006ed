//! RDF statement and term types
//!
//! Statements are transient: they exist only inside the staging sink
//! until a flush hands them to the external serializer.

use crate::vocab::rdf;

/// An RDF term in object position
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    /// An IRI
    Iri(String),
    /// A literal with optional datatype and language tag
    Literal {
        value: String,
        datatype: Option<String>,
        language: Option<String>,
    },
}

impl Term {
    /// Create an IRI term
    pub fn iri(iri: impl Into<String>) -> Self {
        Term::Iri(iri.into())
    }

    /// Create an untyped string literal
    pub fn string(value: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            datatype: None,
            language: None,
        }
    }

    /// Create a typed literal
    pub fn typed(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            datatype: Some(datatype.into()),
            language: None,
        }
    }

    /// Create a language-tagged string
    pub fn lang_string(value: impl Into<String>, language: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            datatype: Some(rdf::LANG_STRING.to_string()),
            language: Some(language.into()),
        }
    }

    /// Check if this is an IRI
    pub fn is_iri(&self) -> bool {
        matches!(self, Term::Iri(_))
    }

    /// Check if this is a literal
    pub fn is_literal(&self) -> bool {
        matches!(self, Term::Literal { .. })
    }

    /// Get as IRI string if this is an IRI
    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Term::Iri(iri) => Some(iri),
            _ => None,
        }
    }
}

/// An immutable (subject, predicate, object) triple
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// Subject IRI
    pub subject: String,
    /// Predicate IRI
    pub predicate: String,
    /// Object term
    pub object: Term,
}

impl Statement {
    /// Create a statement
    pub fn new(subject: impl Into<String>, predicate: impl Into<String>, object: Term) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_constructors() {
        let iri = Term::iri("http://example.org/1");
        assert!(iri.is_iri());
        assert_eq!(iri.as_iri(), Some("http://example.org/1"));

        let lit = Term::string("Ann");
        assert!(lit.is_literal());
        assert_eq!(lit.as_iri(), None);

        let lang = Term::lang_string("Ann", "en");
        match lang {
            Term::Literal {
                datatype, language, ..
            } => {
                assert_eq!(datatype.as_deref(), Some(rdf::LANG_STRING));
                assert_eq!(language.as_deref(), Some("en"));
            }
            _ => panic!("expected literal"),
        }
    }
}
