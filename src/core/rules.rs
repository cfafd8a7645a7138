//! Rule table and evaluator for guarded line fields.
//!
//! Every guarded field has exactly one [`Rule`]: a conjunction of
//! [`Predicate`]s over the line's current [`LineState`], the candidate value
//! and the line kind's [`LinePolicy`]. [`check`] evaluates it. A `None`
//! candidate always passes; it clears the field.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::LineError;
use super::money::{Country, Money};
use super::policy::LinePolicy;
use super::types::{Dim2, Dim3, LineType, MatchStatus, PerformanceType};

/// A field whose legality depends on the line's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Baseline,
    BaseValueOpen,
    CurrencyDate,
    Dim2,
    Dim3,
    InvoiceNumber,
    MatchLevel,
    MatchStatus,
    PerformanceType,
    PerformanceCountry,
    PerformanceVatNumber,
    PerformanceDate,
    Relation,
    RepValueOpen,
}

impl Field {
    pub const ALL: [Field; 14] = [
        Self::Baseline,
        Self::BaseValueOpen,
        Self::CurrencyDate,
        Self::Dim2,
        Self::Dim3,
        Self::InvoiceNumber,
        Self::MatchLevel,
        Self::MatchStatus,
        Self::PerformanceType,
        Self::PerformanceCountry,
        Self::PerformanceVatNumber,
        Self::PerformanceDate,
        Self::Relation,
        Self::RepValueOpen,
    ];

    /// Wire name of the field, as used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Baseline => "baseline",
            Self::BaseValueOpen => "basevalueopen",
            Self::CurrencyDate => "currencydate",
            Self::Dim2 => "dim2",
            Self::Dim3 => "dim3",
            Self::InvoiceNumber => "invoicenumber",
            Self::MatchLevel => "matchlevel",
            Self::MatchStatus => "matchstatus",
            Self::PerformanceType => "performancetype",
            Self::PerformanceCountry => "performancecountry",
            Self::PerformanceVatNumber => "performancevatnumber",
            Self::PerformanceDate => "performancedate",
            Self::Relation => "relation",
            Self::RepValueOpen => "repvalueopen",
        }
    }

    /// The rule guarding this field.
    pub fn rule(self) -> Rule {
        use LineType::*;
        use Predicate::*;

        let requires: &'static [Predicate] = match self {
            Self::Baseline => &[LineTypeIs(Vat)],
            Self::BaseValueOpen
            | Self::CurrencyDate
            | Self::InvoiceNumber
            | Self::MatchLevel
            | Self::Relation
            | Self::RepValueOpen => &[LineTypeIs(Detail)],
            Self::Dim2 | Self::Dim3 => &[LineTypeIsNot(Vat)],
            Self::MatchStatus => &[PinnedMatchStatus],
            Self::PerformanceType | Self::PerformanceCountry | Self::PerformanceVatNumber => {
                &[LineTypeIsNot(Total)]
            }
            Self::PerformanceDate => &[LineTypeIsNot(Total), ServicesPerformance],
        };
        Rule {
            field: self,
            requires,
        }
    }

    /// Dimension index for `dim2` / `dim3`.
    fn dimension(self) -> Option<u8> {
        match self {
            Self::Dim2 => Some(2),
            Self::Dim3 => Some(3),
            _ => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One condition of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    /// The line type equals the given one.
    LineTypeIs(LineType),
    /// The line type differs from the given one.
    LineTypeIsNot(LineType),
    /// On a VAT line the value must equal the policy's pinned match status.
    /// Always holds when the policy pins nothing.
    PinnedMatchStatus,
    /// Performance type must be services, if the policy gates on it.
    ServicesPerformance,
}

impl Predicate {
    fn holds(&self, candidate: &dyn FieldValue, state: &LineState, policy: &LinePolicy) -> bool {
        match *self {
            Self::LineTypeIs(lt) => state.line_type == lt,
            Self::LineTypeIsNot(lt) => state.line_type != lt,
            Self::PinnedMatchStatus => {
                match (state.line_type, policy.vat_match_status, candidate.match_status()) {
                    (LineType::Vat, Some(pinned), Some(status)) => status == pinned,
                    _ => true,
                }
            }
            Self::ServicesPerformance => {
                !policy.performance_date_requires_services
                    || state.performance_type == Some(PerformanceType::Services)
            }
        }
    }
}

/// The legality condition of one guarded field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub field: Field,
    /// All of these must hold for a non-null value to be accepted.
    pub requires: &'static [Predicate],
}

impl Rule {
    /// Evaluate against the current state. See [`check`].
    pub fn evaluate(
        &self,
        candidate: Option<&dyn FieldValue>,
        state: &LineState,
        policy: &LinePolicy,
    ) -> Result<(), LineError> {
        let Some(candidate) = candidate else {
            return Ok(());
        };

        for predicate in self.requires {
            if !predicate.holds(candidate, state, policy) {
                return Err(self.violation(*predicate, candidate, state));
            }
        }
        Ok(())
    }

    fn violation(&self, failed: Predicate, candidate: &dyn FieldValue, state: &LineState) -> LineError {
        let line_type = state.line_type;
        if let Some(dimension) = self.field.dimension() {
            return LineError::InvalidDimensionForLineType {
                dimension,
                line_type,
            };
        }
        match (failed, candidate.match_status()) {
            (Predicate::PinnedMatchStatus, Some(status)) => {
                LineError::InvalidMatchStatusForLineType { status, line_type }
            }
            _ => LineError::InvalidFieldForLineType {
                field: self.field,
                line_type,
            },
        }
    }
}

/// The part of a line that rules read. Always the live state at call time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineState {
    pub line_type: LineType,
    pub performance_type: Option<PerformanceType>,
}

/// Decide whether `field` may be set to `candidate` given the current state.
///
/// Has no side effect. A `None` candidate is always accepted.
pub fn check(
    field: Field,
    candidate: Option<&dyn FieldValue>,
    state: &LineState,
    policy: &LinePolicy,
) -> Result<(), LineError> {
    field.rule().evaluate(candidate, state, policy)
}

/// Decide whether the line may be classified as `candidate`.
pub fn check_line_type(candidate: LineType, policy: &LinePolicy) -> Result<(), LineError> {
    if policy.excluded_line_types.contains(&candidate) {
        return Err(LineError::InvalidLineTypeForTransaction {
            line_type: candidate,
            category: policy.category,
        });
    }
    Ok(())
}

/// A value that can be stored in a guarded field.
///
/// Only match statuses take part in rule evaluation; for every other value
/// the rule looks at presence alone.
pub trait FieldValue {
    fn match_status(&self) -> Option<MatchStatus> {
        None
    }
}

impl FieldValue for MatchStatus {
    fn match_status(&self) -> Option<MatchStatus> {
        Some(*self)
    }
}

impl FieldValue for u32 {}
impl FieldValue for String {}
impl FieldValue for NaiveDate {}
impl FieldValue for Money {}
impl FieldValue for Country {}
impl FieldValue for Dim2 {}
impl FieldValue for Dim3 {}
impl FieldValue for PerformanceType {}
