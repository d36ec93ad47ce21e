//! Template and submission records

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::{Schema, Submission};

/// Identity of the authenticated actor (an email address).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    pub fn new(email: impl Into<String>) -> Self {
        Self(email.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Principal {
    fn from(email: &str) -> Self {
        Self::new(email)
    }
}

/// A reusable form definition.
#[derive(Debug, Clone, PartialEq)]
pub struct FormTemplate {
    pub id: Uuid,
    pub name: String,
    /// Frozen at creation; no update path exists
    pub schema: Schema,
    /// Owners may edit their submissions
    pub allow_edit: bool,
    /// Reported to clients; does not gate submission deletion
    pub allow_delete: bool,
    pub created_at: DateTime<Utc>,
}

/// One accepted submission for a template.
#[derive(Debug, Clone, PartialEq)]
pub struct FormData {
    pub id: Uuid,
    pub template_id: Uuid,
    pub submitted_by: Principal,
    pub values: Submission,
    pub created_at: DateTime<Utc>,
}

impl FormData {
    pub fn is_owned_by(&self, principal: &Principal) -> bool {
        &self.submitted_by == principal
    }
}

/// Offset/limit window for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: usize,
    pub limit: usize,
}

impl Page {
    pub const DEFAULT_LIMIT: usize = 20;

    pub fn new(offset: usize, limit: usize) -> Self {
        Self { offset, limit }
    }

    /// Applies the window to an already ordered iterator.
    pub fn apply<T>(&self, items: impl Iterator<Item = T>) -> Vec<T> {
        items.skip(self.offset).take(self.limit).collect()
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(0, Self::DEFAULT_LIMIT)
    }
}
