use serde::{Deserialize, Serialize};

use super::types::{LineType, MatchStatus, TransactionCategory};

/// What a line kind allows, supplied as data rather than per-kind code.
///
/// Each transaction category has a preset ([`LinePolicy::for_category`]).
/// Custom policies can be built directly or, with the `json` feature, loaded
/// from configuration via [`LinePolicy::from_json`]. Omitted flags take the
/// preset defaults of a sales line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinePolicy {
    /// Category of the transactions these lines belong to.
    pub category: TransactionCategory,
    /// Line types this kind can never be classified as.
    pub excluded_line_types: Vec<LineType>,
    /// Match status that VAT lines are pinned to, if any.
    pub vat_match_status: Option<MatchStatus>,
    /// Whether `performancedate` also requires performance type `services`.
    pub performance_date_requires_services: bool,
    /// Whether a positive total means debit (sales, bank) rather than credit
    /// (purchase).
    pub incoming: bool,
    /// Reject a line type or performance type change that would leave
    /// already-set fields invalid.
    pub revalidate_on_line_type_change: bool,
}

impl LinePolicy {
    /// The preset line kind for a transaction category.
    pub fn for_category(category: TransactionCategory) -> Self {
        let base = Self {
            category,
            excluded_line_types: Vec::new(),
            vat_match_status: Some(MatchStatus::NotMatchable),
            performance_date_requires_services: true,
            incoming: true,
            revalidate_on_line_type_change: false,
        };

        match category {
            // Journal transactions only carry detail and VAT lines.
            TransactionCategory::Journal => Self {
                excluded_line_types: vec![LineType::Total],
                ..base
            },
            TransactionCategory::Purchase => Self {
                incoming: false,
                ..base
            },
            TransactionCategory::Sales
            | TransactionCategory::Bank
            | TransactionCategory::Cash
            | TransactionCategory::ElectronicBankStatement => base,
        }
    }

    /// Same policy, rejecting line type changes that leave stale fields.
    pub fn strict(mut self) -> Self {
        self.revalidate_on_line_type_change = true;
        self
    }

    /// Whether lines of this kind may be classified as `line_type`.
    pub fn allows(&self, line_type: LineType) -> bool {
        !self.excluded_line_types.contains(&line_type)
    }

    /// Line type a new line starts with: the first one not excluded.
    pub fn default_line_type(&self) -> LineType {
        LineType::ALL
            .into_iter()
            .find(|lt| self.allows(*lt))
            .unwrap_or_default()
    }

    /// Parse a policy from JSON configuration.
    #[cfg(feature = "json")]
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Default for LinePolicy {
    fn default() -> Self {
        Self::for_category(TransactionCategory::Sales)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn journal_excludes_total() {
        let p = LinePolicy::for_category(TransactionCategory::Journal);
        assert!(!p.allows(LineType::Total));
        assert!(p.allows(LineType::Detail));
        assert!(p.allows(LineType::Vat));
        assert_eq!(p.vat_match_status, Some(MatchStatus::NotMatchable));
        assert!(p.incoming);
    }

    #[test]
    fn purchase_is_outgoing() {
        let p = LinePolicy::for_category(TransactionCategory::Purchase);
        assert!(!p.incoming);
        assert!(p.allows(LineType::Total));
    }

    #[test]
    fn presets_keep_their_category() {
        for category in TransactionCategory::ALL {
            assert_eq!(LinePolicy::for_category(category).category, category);
        }
    }

    #[test]
    fn default_line_type_skips_excluded() {
        let p = LinePolicy {
            excluded_line_types: vec![LineType::Detail],
            ..LinePolicy::default()
        };
        assert_eq!(p.default_line_type(), LineType::Vat);
        assert_eq!(LinePolicy::default().default_line_type(), LineType::Detail);
    }

    #[test]
    fn strict_sets_flag() {
        let p = LinePolicy::default().strict();
        assert!(p.revalidate_on_line_type_change);
    }

    #[test]
    fn deserializes_with_defaults() {
        let p: LinePolicy = serde_json::from_str(
            r#"{"category":"journal","excluded_line_types":["total"]}"#,
        )
        .unwrap();
        assert_eq!(p.category, TransactionCategory::Journal);
        assert_eq!(p.excluded_line_types, vec![LineType::Total]);
        assert_eq!(p.vat_match_status, Some(MatchStatus::NotMatchable));
        assert!(p.performance_date_requires_services);
        assert!(!p.revalidate_on_line_type_change);
    }
}
