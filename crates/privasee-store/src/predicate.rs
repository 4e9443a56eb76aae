//! Boolean predicate trees over table rows.
//!
//! Filters are built as a tree and only turned into the backend's query
//! language at the edge (see [`crate::formula`]). The in-memory table
//! evaluates the same tree directly with [`Predicate::matches`].

use serde_json::Value;

use crate::table::Fields;

/// A literal compared against a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    /// A text value.
    Text(String),
    /// An unsigned integer value.
    Integer(u64),
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<u64> for Literal {
    fn from(value: u64) -> Self {
        Self::Integer(value)
    }
}

/// A node in a filter tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// The field equals the literal.
    Equals {
        /// Field name.
        field: String,
        /// Expected value.
        value: Literal,
    },
    /// The field contains `needle`, ignoring case.
    Contains {
        /// Field name.
        field: String,
        /// Substring to look for.
        needle: String,
    },
    /// Every child matches. An empty list matches everything.
    And(Vec<Predicate>),
    /// At least one child matches. An empty list matches nothing.
    Or(Vec<Predicate>),
}

impl Predicate {
    /// Build an equality comparison.
    #[must_use]
    pub fn equals(field: impl Into<String>, value: impl Into<Literal>) -> Self {
        Self::Equals {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Build a case-insensitive substring test.
    #[must_use]
    pub fn contains(field: impl Into<String>, needle: impl Into<String>) -> Self {
        Self::Contains {
            field: field.into(),
            needle: needle.into(),
        }
    }

    /// Conjunction of `children`.
    #[must_use]
    pub fn and(children: Vec<Predicate>) -> Self {
        Self::And(children)
    }

    /// Disjunction of `children`.
    #[must_use]
    pub fn or(children: Vec<Predicate>) -> Self {
        Self::Or(children)
    }

    /// Evaluate the predicate against a row's fields.
    ///
    /// Missing fields behave like blank text, as they do in Airtable formulas.
    #[must_use]
    pub fn matches(&self, fields: &Fields) -> bool {
        match self {
            Self::Equals { field, value } => {
                let actual = fields.get(field).unwrap_or(&Value::Null);
                match value {
                    Literal::Text(expected) => text_of(actual) == *expected,
                    Literal::Integer(expected) => integer_of(actual) == Some(*expected),
                }
            }
            Self::Contains { field, needle } => {
                let haystack = fields
                    .get(field)
                    .map(text_of)
                    .unwrap_or_default()
                    .to_lowercase();
                haystack.contains(&needle.to_lowercase())
            }
            Self::And(children) => children.iter().all(|c| c.matches(fields)),
            Self::Or(children) => children.iter().any(|c| c.matches(fields)),
        }
    }
}

/// Render a cell the way a formula would see it as text.
fn text_of(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Read a cell as an unsigned integer, accepting whole floats.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn integer_of(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    value
        .as_f64()
        .filter(|f| *f >= 0.0 && f.fract() == 0.0)
        .map(|f| f as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn equals_text_and_integer() {
        let fields = row(json!({"assignedTo": "bob@x.com", "_recordId": 7}));
        assert!(Predicate::equals("assignedTo", "bob@x.com").matches(&fields));
        assert!(!Predicate::equals("assignedTo", "alice@x.com").matches(&fields));
        assert!(Predicate::equals("_recordId", 7u64).matches(&fields));
        assert!(!Predicate::equals("_recordId", 8u64).matches(&fields));
    }

    #[test]
    fn integer_equality_accepts_whole_floats() {
        let fields = row(json!({"_recordId": 7.0}));
        assert!(Predicate::equals("_recordId", 7u64).matches(&fields));
    }

    #[test]
    fn missing_field_is_blank() {
        let fields = row(json!({}));
        assert!(Predicate::equals("assignedTo", "").matches(&fields));
        assert!(!Predicate::contains("answer", "x").matches(&fields));
    }

    #[test]
    fn contains_ignores_case() {
        let fields = row(json!({"question": "GDPR basics"}));
        assert!(Predicate::contains("question", "gdpr").matches(&fields));
        assert!(Predicate::contains("question", "BASICS").matches(&fields));
        assert!(!Predicate::contains("question", "policy").matches(&fields));
    }

    #[test]
    fn and_of_ors_keeps_precedence() {
        // (assignee is alice OR bob) AND (question contains "policy")
        let tree = Predicate::and(vec![
            Predicate::or(vec![
                Predicate::equals("assignedTo", "alice@x.com"),
                Predicate::equals("assignedTo", "bob@x.com"),
            ]),
            Predicate::contains("question", "policy"),
        ]);

        let alice_gdpr = row(json!({"assignedTo": "alice@x.com", "question": "GDPR"}));
        let bob_policy = row(json!({"assignedTo": "bob@x.com", "question": "Retention policy"}));
        let carol_policy = row(json!({"assignedTo": "carol@x.com", "question": "Policy"}));

        assert!(!tree.matches(&alice_gdpr));
        assert!(tree.matches(&bob_policy));
        assert!(!tree.matches(&carol_policy));
    }

    #[test]
    fn empty_connectives() {
        let fields = row(json!({}));
        assert!(Predicate::and(vec![]).matches(&fields));
        assert!(!Predicate::or(vec![]).matches(&fields));
    }
}
