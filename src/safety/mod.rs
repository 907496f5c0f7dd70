//! Query safety for generated SQL.
//!
//! Two layers: the sanitizer (`clean`, `is_safe`), which strips code fences
//! and performs the `select` prefix check, and the statement classifier,
//! which parses SQL with the SQLite dialect and reports whether it reads,
//! mutates, or destroys data.
//!
//! The prefix check alone does not see stacked statements such as
//! `SELECT 1; DROP TABLE sales`. [`validate_read_only`] with `strict`
//! enabled closes that gap by also requiring exactly one read-only statement.

mod parser;
mod sanitize;

pub use parser::{classify_sql, SqlClassifier};
pub use sanitize::{clean, is_safe};

use crate::error::{InsightError, Result};
use std::fmt;

/// Message returned when a query fails the prefix check.
pub const ONLY_SELECT_MESSAGE: &str = "Only SELECT queries are allowed.";

/// Safety level classification for SQL queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SafetyLevel {
    /// Read-only queries (SELECT, plain EXPLAIN).
    Safe,
    /// Data modification queries (INSERT, UPDATE, REPLACE).
    Mutating,
    /// Data loss or schema changes (DELETE, DROP, ALTER, CREATE, PRAGMA, ...).
    Destructive,
}

impl fmt::Display for SafetyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Safe => write!(f, "Safe"),
            Self::Mutating => write!(f, "Mutating"),
            Self::Destructive => write!(f, "Destructive"),
        }
    }
}

/// The type of SQL statement detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementType {
    Select,
    Insert,
    Update,
    Delete,
    Drop,
    Alter,
    Create,
    Explain,
    Pragma,
    Attach,
    /// Multiple statements detected; contains the most dangerous type.
    Multiple(Box<StatementType>),
    /// Statement type could not be determined.
    Unknown,
}

impl fmt::Display for StatementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Select => write!(f, "SELECT"),
            Self::Insert => write!(f, "INSERT"),
            Self::Update => write!(f, "UPDATE"),
            Self::Delete => write!(f, "DELETE"),
            Self::Drop => write!(f, "DROP"),
            Self::Alter => write!(f, "ALTER"),
            Self::Create => write!(f, "CREATE"),
            Self::Explain => write!(f, "EXPLAIN"),
            Self::Pragma => write!(f, "PRAGMA"),
            Self::Attach => write!(f, "ATTACH"),
            Self::Multiple(inner) => write!(f, "Multiple ({})", inner),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Result of classifying a SQL query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationResult {
    /// The determined safety level.
    pub level: SafetyLevel,
    /// The type of statement(s) detected.
    pub statement_type: StatementType,
    /// Number of statements found in the text.
    pub statement_count: usize,
    /// Optional explanation when the query is not safe.
    pub warning: Option<String>,
}

impl ClassificationResult {
    /// Creates a new classification result for a single statement.
    pub fn new(level: SafetyLevel, statement_type: StatementType) -> Self {
        Self {
            level,
            statement_type,
            statement_count: 1,
            warning: None,
        }
    }

    /// Attaches a warning message.
    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warning = Some(warning.into());
        self
    }

    /// Sets the number of statements found.
    pub fn with_statement_count(mut self, count: usize) -> Self {
        self.statement_count = count;
        self
    }

    /// Returns true if this is exactly one statement that only reads data.
    pub fn is_single_read_only(&self) -> bool {
        self.level == SafetyLevel::Safe && self.statement_count == 1
    }
}

/// Rejects anything that is not a read-only query.
///
/// Always applies the `select` prefix check. With `strict`, the query must
/// also parse as exactly one read-only statement.
pub fn validate_read_only(sql: &str, strict: bool) -> Result<()> {
    if !is_safe(sql) {
        return Err(InsightError::unsafe_query(ONLY_SELECT_MESSAGE));
    }

    if strict {
        let classification = classify_sql(sql);
        if !classification.is_single_read_only() {
            let reason = classification.warning.unwrap_or_else(|| {
                format!(
                    "{} statement is not allowed.",
                    classification.statement_type
                )
            });
            return Err(InsightError::unsafe_query(reason));
        }
    }

    Ok(())
}
