use bson::Bson;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::errors::DbError;

// Safety limits to prevent resource abuse
pub(crate) const MAX_PATH_DEPTH: usize = 32;
pub(crate) const MAX_SORT_FIELDS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Order {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub order: Order,
}

impl SortSpec {
    pub fn asc(field: impl Into<String>) -> Self {
        Self { field: field.into(), order: Order::Asc }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self { field: field.into(), order: Order::Desc }
    }
}

/// Options for `find_docs`.
///
/// Sorting is applied before `skip`/`limit`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FindOptions {
    pub sort: Option<Vec<SortSpec>>,
    pub limit: Option<usize>,
    pub skip: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
}

#[derive(Debug, Clone)]
pub enum Filter {
    True,
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
    Cmp { path: String, op: CmpOp, value: Bson },
    /// Array at `path` contains every one of `values`.
    All { path: String, values: Vec<Bson> },
    Regex { path: String, regex: Regex },
    /// Any term of `query` occurs in one of the collection's text-indexed fields.
    Text { query: String },
}

impl Filter {
    pub fn eq(path: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::Cmp { path: path.into(), op: CmpOp::Eq, value: value.into() }
    }

    pub fn cmp(path: impl Into<String>, op: CmpOp, value: impl Into<Bson>) -> Self {
        Self::Cmp { path: path.into(), op, value: value.into() }
    }

    /// # Errors
    /// Returns an error if `pattern` is not a valid regular expression.
    pub fn regex(path: impl Into<String>, pattern: &str, case_insensitive: bool) -> Result<Self, DbError> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(case_insensitive)
            .size_limit(1 << 20)
            .build()
            .map_err(|e| DbError::QueryError(e.to_string()))?;
        Ok(Self::Regex { path: path.into(), regex })
    }

    /// Conjunction that collapses the trivial cases.
    #[must_use]
    pub fn all_of(mut filters: Vec<Self>) -> Self {
        filters.retain(|f| !matches!(f, Self::True));
        match filters.len() {
            0 => Self::True,
            1 => filters.remove(0),
            _ => Self::And(filters),
        }
    }

    /// Whether evaluating this filter needs a text index.
    #[must_use]
    pub fn uses_text(&self) -> bool {
        match self {
            Self::Text { .. } => true,
            Self::And(fs) | Self::Or(fs) => fs.iter().any(Self::uses_text),
            Self::Not(f) => f.uses_text(),
            _ => false,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct UpdateDoc {
    pub set: Vec<(String, Bson)>,
    pub inc: Vec<(String, Bson)>,
    pub add_to_set: Vec<(String, Bson)>,
    pub pull: Vec<(String, Bson)>,
}

impl UpdateDoc {
    #[must_use]
    pub fn set(mut self, path: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.set.push((path.into(), value.into()));
        self
    }

    #[must_use]
    pub fn inc(mut self, path: impl Into<String>, by: impl Into<Bson>) -> Self {
        self.inc.push((path.into(), by.into()));
        self
    }

    #[must_use]
    pub fn add_to_set(mut self, path: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.add_to_set.push((path.into(), value.into()));
        self
    }

    #[must_use]
    pub fn pull(mut self, path: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.pull.push((path.into(), value.into()));
        self
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UpdateReport {
    pub matched: u64,
    pub modified: u64,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DeleteReport {
    pub deleted: u64,
}
