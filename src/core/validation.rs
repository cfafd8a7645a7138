use super::error::{LineError, LineIssue};
use super::line::TransactionLine;
use super::rules::{self, Field};
use super::transaction::Transaction;

/// Re-check every rule of a line against its current state.
/// Returns all violations (not just the first).
///
/// Setters already refuse invalid values, so a non-empty result means state
/// moved underneath an accepted value: a line type change, or a performance
/// type change after `performancedate` was set.
pub fn validate_line(line: &TransactionLine) -> Vec<LineError> {
    let mut errors = Vec::new();
    let state = line.state();

    if let Err(err) = rules::check_line_type(state.line_type, line.policy()) {
        errors.push(err);
    }

    for field in Field::ALL {
        if let Err(err) = rules::check(field, line.guarded_value(field), &state, line.policy()) {
            errors.push(err);
        }
    }

    errors
}

/// Audit all lines of a transaction, tagging each issue with its line index.
pub fn validate_transaction(transaction: &Transaction) -> Vec<LineIssue> {
    let issues: Vec<LineIssue> = transaction
        .lines()
        .iter()
        .enumerate()
        .flat_map(|(line, l)| {
            validate_line(l)
                .into_iter()
                .map(move |error| LineIssue { line, error })
        })
        .collect();

    if !issues.is_empty() {
        tracing::debug!(
            transaction = %transaction.id(),
            issues = issues.len(),
            "transaction has inconsistent lines"
        );
    }
    issues
}
