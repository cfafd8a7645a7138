//! Transaction line types and the field validation engine.
//!
//! Which attributes a line accepts depends on its [`LineType`], its line
//! kind ([`LinePolicy`]) and, for `performancedate`, its performance type.
//! The rules live in one table ([`Field::rule`]) evaluated by [`check`].

mod error;
mod line;
mod money;
mod policy;
pub mod rules;
mod transaction;
mod types;
mod validation;

pub use error::*;
pub use line::*;
pub use money::*;
pub use policy::*;
pub use rules::{Field, FieldValue, LineState, Predicate, Rule, check, check_line_type};
pub use transaction::*;
pub use types::*;
pub use validation::*;
