use std::fmt;

use thiserror::Error;

use super::rules::Field;
use super::transaction::TransactionId;
use super::types::{LineType, MatchStatus, PerformanceType, TransactionCategory};

/// Errors raised when a line mutation is rejected.
///
/// Every variant carries enough state (field, current line type) to build a
/// message without looking at the line again. A rejected mutation never
/// changes the line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum LineError {
    /// A guarded field cannot be set on a line of this type.
    #[error("field '{field}' cannot be set on a {line_type} line")]
    InvalidFieldForLineType { field: Field, line_type: LineType },

    /// `dim2` / `dim3` cannot be set on a line of this type.
    #[error("dimension {dimension} cannot be set on a {line_type} line")]
    InvalidDimensionForLineType { dimension: u8, line_type: LineType },

    /// The line kind does not allow this classification.
    #[error("line type {line_type} is not allowed on {category} transactions")]
    InvalidLineTypeForTransaction {
        line_type: LineType,
        category: TransactionCategory,
    },

    /// The line type pins the match status to a single value.
    #[error("match status {status} is not allowed on a {line_type} line")]
    InvalidMatchStatusForLineType {
        status: MatchStatus,
        line_type: LineType,
    },

    /// The line already belongs to a transaction.
    #[error("line is already attached to transaction {0}")]
    AlreadyAttached(TransactionId),

    /// The transaction is of a different category than the line kind.
    #[error("a {expected} line cannot be attached to a {found} transaction")]
    CategoryMismatch {
        expected: TransactionCategory,
        found: TransactionCategory,
    },

    /// Changing the line type would leave fields that are invalid for it.
    #[error("changing to a {line_type} line would invalidate: {}", join_fields(.fields))]
    StaleFields {
        line_type: LineType,
        fields: Vec<Field>,
    },

    /// Changing the performance type would leave fields that are invalid for it.
    #[error(
        "changing the performance type to {} would invalidate: {}",
        performance_code(.performance_type),
        join_fields(.fields)
    )]
    StalePerformanceFields {
        performance_type: Option<PerformanceType>,
        fields: Vec<Field>,
    },

    /// The line was built for another kind than the transaction's lines.
    #[error("line kind does not match the kind of {category} transaction {id}")]
    PolicyMismatch {
        id: TransactionId,
        category: TransactionCategory,
    },
}

impl LineError {
    /// The guarded field this error is about, if any.
    pub fn field(&self) -> Option<Field> {
        match self {
            Self::InvalidFieldForLineType { field, .. } => Some(*field),
            Self::InvalidDimensionForLineType { dimension: 2, .. } => Some(Field::Dim2),
            Self::InvalidDimensionForLineType { dimension: 3, .. } => Some(Field::Dim3),
            Self::InvalidMatchStatusForLineType { .. } => Some(Field::MatchStatus),
            _ => None,
        }
    }
}

fn join_fields(fields: &[Field]) -> String {
    fields
        .iter()
        .map(|f| f.name())
        .collect::<Vec<_>>()
        .join(", ")
}

fn performance_code(performance_type: &Option<PerformanceType>) -> &'static str {
    performance_type.map_or("none", |p| p.code())
}

/// A code string that is not part of the known code list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} code '{code}'")]
pub struct UnknownCode {
    /// What kind of code was parsed (e.g. "currency").
    pub kind: &'static str,
    /// The rejected input.
    pub code: String,
}

impl UnknownCode {
    pub fn new(kind: &'static str, code: impl Into<String>) -> Self {
        Self {
            kind,
            code: code.into(),
        }
    }
}

/// A single issue found when auditing the lines of a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIssue {
    /// Index of the line within its transaction.
    pub line: usize,
    /// What is wrong with it.
    pub error: LineError,
}

impl fmt::Display for LineIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lines[{}]: {}", self.line, self.error)
    }
}
