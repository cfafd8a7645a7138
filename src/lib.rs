//! # boekregel
//!
//! Field validation for the lines of accounting transactions, as sent to a
//! remote bookkeeping API: journal, sales, purchase, bank and cash
//! transactions.
//!
//! A line is classified as a detail, VAT or total line. Many attributes only
//! make sense for some of those classes (an invoice number on a VAT line, a
//! baseline on a detail line), and the line kind of each transaction category
//! restricts the classes themselves. Every setter checks this before writing,
//! and a rejected call leaves the line untouched.
//!
//! All monetary values use [`rust_decimal::Decimal`], never floating point.
//!
//! ## Quick Start
//!
//! ```rust
//! use boekregel::core::*;
//! use chrono::NaiveDate;
//!
//! let mut tx = Transaction::new(TransactionId::new(1), TransactionCategory::Journal);
//! let line = tx.add_line(tx.new_line()).unwrap();
//! line.set_performance_type(Some(PerformanceType::Services))
//!     .unwrap()
//!     .set_performance_date(NaiveDate::from_ymd_opt(2024, 1, 1))
//!     .unwrap();
//!
//! // Journal transactions have no total line.
//! let err = line.set_line_type(LineType::Total).unwrap_err();
//! assert_eq!(
//!     err,
//!     LineError::InvalidLineTypeForTransaction {
//!         line_type: LineType::Total,
//!         category: TransactionCategory::Journal,
//!     }
//! );
//! assert!(tx.validate().is_empty());
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Line types, rule table, transactions |
//! | `json` | Load [`LinePolicy`](core::LinePolicy) from JSON configuration |
//! | `all` | Everything |
//!
//! ## Logging
//!
//! Rejections and attachments are reported as `debug` events through
//! [`tracing`]; a line type change that leaves stale fields is a `warn`.
//! No subscriber is installed by the library.

#[cfg(feature = "core")]
pub mod core;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
