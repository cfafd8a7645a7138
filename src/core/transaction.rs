use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::{LineError, LineIssue};
use super::line::TransactionLine;
use super::policy::LinePolicy;
use super::types::TransactionCategory;
use super::validation;

/// Identifier of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(u64);

impl TransactionId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Non-owning reference from a line to its transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionRef {
    pub id: TransactionId,
    pub category: TransactionCategory,
}

impl TransactionRef {
    pub fn new(id: TransactionId, category: TransactionCategory) -> Self {
        Self { id, category }
    }
}

/// A transaction and the lines it owns.
///
/// Every owned line has this transaction's kind and is attached to it.
#[derive(Debug, PartialEq)]
pub struct Transaction {
    id: TransactionId,
    policy: LinePolicy,
    lines: Vec<TransactionLine>,
}

impl Transaction {
    /// A transaction whose lines use the category's preset kind.
    pub fn new(id: TransactionId, category: TransactionCategory) -> Self {
        Self::with_policy(id, LinePolicy::for_category(category))
    }

    /// A transaction whose lines use a custom kind.
    pub fn with_policy(id: TransactionId, policy: LinePolicy) -> Self {
        Self {
            id,
            policy,
            lines: Vec::new(),
        }
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn category(&self) -> TransactionCategory {
        self.policy.category
    }

    pub fn policy(&self) -> &LinePolicy {
        &self.policy
    }

    /// The reference lines hold to this transaction.
    pub fn reference(&self) -> TransactionRef {
        TransactionRef::new(self.id, self.policy.category)
    }

    /// A detached line of this transaction's kind, ready to fill and add.
    pub fn new_line(&self) -> TransactionLine {
        TransactionLine::new(self.policy.clone())
    }

    /// Attach `line` to this transaction and take ownership of it.
    ///
    /// Fails if the line already belongs to a transaction, is of another
    /// category, or was built for a different kind of the same category; the
    /// line is dropped in that case.
    pub fn add_line(&mut self, mut line: TransactionLine) -> Result<&mut TransactionLine, LineError> {
        line.attach(self.reference())?;
        if line.policy() != &self.policy {
            tracing::debug!(transaction = %self.id, "rejected line of another kind");
            return Err(LineError::PolicyMismatch {
                id: self.id,
                category: self.policy.category,
            });
        }
        let index = self.lines.len();
        self.lines.push(line);
        Ok(&mut self.lines[index])
    }

    pub fn lines(&self) -> &[TransactionLine] {
        &self.lines
    }

    pub fn line_mut(&mut self, index: usize) -> Option<&mut TransactionLine> {
        self.lines.get_mut(index)
    }

    /// Audit every line. See [`validate_transaction`](validation::validate_transaction).
    pub fn validate(&self) -> Vec<LineIssue> {
        validation::validate_transaction(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LineType;

    #[test]
    fn add_line_attaches() {
        let mut tx = Transaction::new(TransactionId::new(7), TransactionCategory::Journal);
        let line = tx.add_line(tx.new_line()).unwrap();
        line.set_line_type(LineType::Vat).unwrap();

        assert_eq!(tx.lines().len(), 1);
        let line = &tx.lines()[0];
        assert_eq!(line.transaction(), Some(&tx.reference()));
        assert_eq!(line.line_type(), LineType::Vat);
    }

    #[test]
    fn add_line_rejects_attached_line() {
        let mut first = Transaction::new(TransactionId::new(1), TransactionCategory::Sales);
        let mut second = Transaction::new(TransactionId::new(2), TransactionCategory::Sales);
        let mut line = first.new_line();
        line.attach(first.reference()).unwrap();

        assert_eq!(
            second.add_line(line).unwrap_err(),
            LineError::AlreadyAttached(TransactionId::new(1))
        );
        assert!(second.lines().is_empty());
        assert!(first.lines().is_empty());
        assert!(first.line_mut(0).is_none());
    }

    #[test]
    fn add_line_rejects_other_kind() {
        let strict = LinePolicy::for_category(TransactionCategory::Journal).strict();
        let mut tx = Transaction::with_policy(TransactionId::new(9), strict);
        let line = TransactionLine::for_category(TransactionCategory::Journal);

        assert_eq!(
            tx.add_line(line).unwrap_err(),
            LineError::PolicyMismatch {
                id: TransactionId::new(9),
                category: TransactionCategory::Journal,
            }
        );
        assert!(tx.lines().is_empty());

        let line = tx.add_line(tx.new_line()).unwrap();
        assert!(line.policy().revalidate_on_line_type_change);
    }

    #[test]
    fn cloned_line_can_join_another_transaction() {
        let mut first = Transaction::new(TransactionId::new(1), TransactionCategory::Bank);
        let mut second = Transaction::new(TransactionId::new(2), TransactionCategory::Bank);
        let copy = first.add_line(first.new_line()).unwrap().clone();
        assert!(!copy.is_attached());

        second.add_line(copy).unwrap();
        assert_eq!(first.lines()[0].transaction(), Some(&first.reference()));
        assert_eq!(second.lines()[0].transaction(), Some(&second.reference()));
    }

    #[test]
    fn types_can_cross_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Transaction>();
        assert_send_sync::<TransactionLine>();
        assert_send_sync::<LineError>();
    }

    #[test]
    fn reference_carries_category() {
        let tx = Transaction::new(TransactionId::new(3), TransactionCategory::Purchase);
        assert_eq!(tx.reference().category, TransactionCategory::Purchase);
        assert_eq!(tx.id().get(), 3);
        assert_eq!(tx.id().to_string(), "3");
    }
}
