use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::UnknownCode;

/// Classification of a transaction line. Drives which attributes may be set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineType {
    /// `detail`: a booking against a general ledger account.
    #[default]
    Detail,
    /// `vat`: the VAT amount for one VAT code.
    Vat,
    /// `total`: the balancing line of the transaction.
    Total,
}

impl LineType {
    pub const ALL: [LineType; 3] = [Self::Detail, Self::Vat, Self::Total];

    /// Wire code as used by the transaction API.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Detail => "detail",
            Self::Vat => "vat",
            Self::Total => "total",
        }
    }

    /// Parse from the wire code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "detail" => Some(Self::Detail),
            "vat" => Some(Self::Vat),
            "total" => Some(Self::Total),
            _ => None,
        }
    }
}

/// Kind of supply for intra-community VAT reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceType {
    Services,
    Goods,
}

impl PerformanceType {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Services => "services",
            Self::Goods => "goods",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "services" => Some(Self::Services),
            "goods" => Some(Self::Goods),
            _ => None,
        }
    }
}

/// Payment matching state of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    /// Open, can be matched against a payment.
    Available,
    /// Fully matched.
    Matched,
    /// A match has been proposed but not yet confirmed.
    Proposed,
    /// Cannot be matched. Always the case for VAT lines.
    NotMatchable,
}

impl MatchStatus {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Matched => "matched",
            Self::Proposed => "proposed",
            Self::NotMatchable => "notmatchable",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "available" => Some(Self::Available),
            "matched" => Some(Self::Matched),
            "proposed" => Some(Self::Proposed),
            "notmatchable" => Some(Self::NotMatchable),
            _ => None,
        }
    }
}

/// Booking side of a line value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebitCredit {
    Debit,
    Credit,
}

impl DebitCredit {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }

    /// The opposite side.
    pub fn flip(self) -> Self {
        match self {
            Self::Debit => Self::Credit,
            Self::Credit => Self::Debit,
        }
    }
}

/// Category of the transaction a line belongs to. Each category has its own
/// line kind (see [`LinePolicy::for_category`](super::LinePolicy::for_category)).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionCategory {
    Journal,
    Sales,
    Purchase,
    Bank,
    Cash,
    ElectronicBankStatement,
}

impl TransactionCategory {
    pub const ALL: [TransactionCategory; 6] = [
        Self::Journal,
        Self::Sales,
        Self::Purchase,
        Self::Bank,
        Self::Cash,
        Self::ElectronicBankStatement,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Self::Journal => "journal",
            Self::Sales => "sales",
            Self::Purchase => "purchase",
            Self::Bank => "bank",
            Self::Cash => "cash",
            Self::ElectronicBankStatement => "electronic_bank_statement",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }
}

/// Second dimension: the counterparty or cost center a detail line books on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "code", rename_all = "snake_case")]
pub enum Dim2 {
    Customer(String),
    Supplier(String),
    CostCenter(String),
}

impl Dim2 {
    pub fn code(&self) -> &str {
        match self {
            Self::Customer(c) | Self::Supplier(c) | Self::CostCenter(c) => c,
        }
    }
}

/// Third dimension: project or fixed asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "code", rename_all = "snake_case")]
pub enum Dim3 {
    Project(String),
    Asset(String),
}

impl Dim3 {
    pub fn code(&self) -> &str {
        match self {
            Self::Project(c) | Self::Asset(c) => c,
        }
    }
}

macro_rules! code_display {
    ($($ty:ident => $kind:literal),* $(,)?) => {$(
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.code())
            }
        }

        impl FromStr for $ty {
            type Err = UnknownCode;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_code(s).ok_or_else(|| UnknownCode::new($kind, s))
            }
        }
    )*};
}

code_display! {
    LineType => "line type",
    PerformanceType => "performance type",
    MatchStatus => "match status",
    TransactionCategory => "transaction category",
}

impl fmt::Display for DebitCredit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
