//! Record types exchanged between the API and the store.
//!
//! JSON field names follow the frontend's wire format (`camelCase`, with the
//! underscore-prefixed `_recordId` and `_companyId`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::ids::RecordId;
use crate::properties::Properties;

/// A stored record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Public identifier, immutable after creation.
    #[serde(rename = "_recordId")]
    pub record_id: RecordId,
    /// Placeholder tenant name, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    /// Placeholder tenant id, passed through untouched.
    #[serde(
        rename = "_companyId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub company_id: Option<u64>,
    /// The question text. Never empty.
    pub question: String,
    /// The answer, if one has been written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    /// Longer description of the question.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_description: Option<String>,
    /// Creation time, immutable.
    pub created_at: DateTime<Utc>,
    /// Identity of the creator, immutable.
    pub created_by: String,
    /// Time of the last mutation. Equals `created_at` until the first update.
    pub updated_at: DateTime<Utc>,
    /// Identity of the last editor.
    pub updated_by: String,
    /// Assignee identity; `None` means unassigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    /// Key/value metadata.
    #[serde(default)]
    pub properties: Properties,
}

/// Input for creating a record.
///
/// Any `_recordId` sent by a client is ignored; identifiers are assigned by
/// the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecord {
    /// The question text. Required and non-empty.
    #[serde(default)]
    pub question: String,
    /// Optional answer.
    #[serde(default)]
    pub answer: Option<String>,
    /// Optional longer description.
    #[serde(default)]
    pub question_description: Option<String>,
    /// Creator identity.
    #[serde(default)]
    pub created_by: String,
    /// Last editor; defaults to `created_by`.
    #[serde(default)]
    pub updated_by: Option<String>,
    /// Initial assignee.
    #[serde(default)]
    pub assigned_to: Option<String>,
    /// Key/value metadata, as an encoded string or a list of pairs.
    #[serde(default)]
    pub properties: Properties,
    /// Creation time; stamped with the current time when absent.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Update time; defaults to `created_at`.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Placeholder tenant name.
    #[serde(default)]
    pub company_name: Option<String>,
    /// Placeholder tenant id.
    #[serde(rename = "_companyId", default)]
    pub company_id: Option<u64>,
}

impl NewRecord {
    /// Create an input with just a question and its author.
    #[must_use]
    pub fn new(question: impl Into<String>, created_by: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            created_by: created_by.into(),
            ..Self::default()
        }
    }

    /// Set the initial assignee.
    #[must_use]
    pub fn assigned_to(mut self, assignee: impl Into<String>) -> Self {
        self.assigned_to = Some(assignee.into());
        self
    }

    /// Set the answer.
    #[must_use]
    pub fn answer(mut self, answer: impl Into<String>) -> Self {
        self.answer = Some(answer.into());
        self
    }

    /// Set the properties.
    #[must_use]
    pub fn properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    /// Check the required fields.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyQuestion` if the question is blank.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_question(&self.question)
    }
}

/// A partial update.
///
/// Only the mutable fields exist here. `_recordId`, `createdAt`, `createdBy`
/// and `updatedAt` in a request body are dropped during deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPatch {
    /// New question text; must not be blank when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    /// New answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    /// New description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_description: Option<String>,
    /// Identity of the editor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
    /// New assignee; an empty string unassigns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    /// Replacement properties, in either representation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,
    /// Placeholder tenant name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    /// Placeholder tenant id.
    #[serde(
        rename = "_companyId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub company_id: Option<u64>,
}

impl RecordPatch {
    /// Check the fields that are present.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyQuestion` if a blank question is supplied.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match &self.question {
            Some(question) => validate_question(question),
            None => Ok(()),
        }
    }
}

/// Narrowing criteria for listing records.
///
/// Axes combine with AND; values within `assigned_to` combine with OR.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    /// Match records assigned to any of these identities. Empty means any.
    pub assigned_to: Vec<String>,
    /// Case-insensitive substring searched in the question or the answer.
    pub search_query: Option<String>,
}

impl RecordFilter {
    /// A filter that matches everything.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to the given assignees.
    #[must_use]
    pub fn assigned_to<I, S>(mut self, assignees: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.assigned_to = assignees.into_iter().map(Into::into).collect();
        self
    }

    /// Restrict to records whose question or answer contains `query`.
    #[must_use]
    pub fn search(mut self, query: impl Into<String>) -> Self {
        self.search_query = Some(query.into());
        self
    }

    /// The search query, unless it is blank.
    ///
    /// Matching uses the query as given, surrounding whitespace included.
    #[must_use]
    pub fn effective_search(&self) -> Option<&str> {
        self.search_query
            .as_deref()
            .filter(|q| !q.trim().is_empty())
    }

    /// Whether this filter narrows anything at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assigned_to.is_empty() && self.effective_search().is_none()
    }
}

fn validate_question(question: &str) -> Result<(), ValidationError> {
    if question.trim().is_empty() {
        return Err(ValidationError::EmptyQuestion);
    }
    Ok(())
}
