use chrono::NaiveDate;

use super::error::LineError;
use super::money::{Country, Money};
use super::policy::LinePolicy;
use super::rules::{self, Field, FieldValue, LineState};
use super::transaction::TransactionRef;
use super::types::*;

/// One line of a transaction, with guarded setters.
///
/// Every guarded setter checks the field's rule against the line's current
/// state first and only writes if it passes, so a rejected call leaves the
/// line exactly as it was. Setting `None` is always allowed and clears the
/// field. Setters return `&mut Self` so they chain with `?`:
///
/// ```
/// use boekregel::core::*;
/// use rust_decimal_macros::dec;
///
/// let mut line = TransactionLine::for_category(TransactionCategory::Journal);
/// line.set_line_type(LineType::Detail)?
///     .set_base_value_open(Some(Money::eur(dec!(10.00))))?
///     .set_invoice_number(Some("INV-1".into()))?;
///
/// let err = line.set_baseline(Some(1)).unwrap_err();
/// assert_eq!(err.to_string(), "field 'baseline' cannot be set on a detail line");
/// # Ok::<(), LineError>(())
/// ```
///
/// Cloning gives a detached copy: the clone can be added to a transaction of
/// its own, the original keeps its binding.
#[derive(Debug, PartialEq)]
pub struct TransactionLine {
    policy: LinePolicy,
    transaction: Option<TransactionRef>,
    line_type: LineType,
    dim1: Option<String>,
    description: Option<String>,
    value: Option<Money>,
    performance_type: Option<PerformanceType>,
    baseline: Option<u32>,
    base_value_open: Option<Money>,
    currency_date: Option<NaiveDate>,
    dim2: Option<Dim2>,
    dim3: Option<Dim3>,
    invoice_number: Option<String>,
    match_level: Option<u32>,
    match_status: Option<MatchStatus>,
    performance_country: Option<Country>,
    performance_vat_number: Option<String>,
    performance_date: Option<NaiveDate>,
    relation: Option<u32>,
    rep_value_open: Option<Money>,
}

impl Clone for TransactionLine {
    fn clone(&self) -> Self {
        Self {
            policy: self.policy.clone(),
            transaction: None,
            line_type: self.line_type,
            dim1: self.dim1.clone(),
            description: self.description.clone(),
            value: self.value,
            performance_type: self.performance_type,
            baseline: self.baseline,
            base_value_open: self.base_value_open,
            currency_date: self.currency_date,
            dim2: self.dim2.clone(),
            dim3: self.dim3.clone(),
            invoice_number: self.invoice_number.clone(),
            match_level: self.match_level,
            match_status: self.match_status,
            performance_country: self.performance_country,
            performance_vat_number: self.performance_vat_number.clone(),
            performance_date: self.performance_date,
            relation: self.relation,
            rep_value_open: self.rep_value_open,
        }
    }
}

impl TransactionLine {
    /// An empty, detached line of the given kind.
    pub fn new(policy: LinePolicy) -> Self {
        Self {
            line_type: policy.default_line_type(),
            policy,
            transaction: None,
            dim1: None,
            description: None,
            value: None,
            performance_type: None,
            baseline: None,
            base_value_open: None,
            currency_date: None,
            dim2: None,
            dim3: None,
            invoice_number: None,
            match_level: None,
            match_status: None,
            performance_country: None,
            performance_vat_number: None,
            performance_date: None,
            relation: None,
            rep_value_open: None,
        }
    }

    /// An empty, detached line using the category's preset kind.
    pub fn for_category(category: TransactionCategory) -> Self {
        Self::new(LinePolicy::for_category(category))
    }

    pub fn policy(&self) -> &LinePolicy {
        &self.policy
    }

    /// The state rules are evaluated against.
    pub fn state(&self) -> LineState {
        LineState {
            line_type: self.line_type,
            performance_type: self.performance_type,
        }
    }

    // ── Owning transaction ──────────────────────────────────────────────

    /// Bind the line to its transaction. Succeeds once per line.
    pub fn attach(&mut self, transaction: TransactionRef) -> Result<(), LineError> {
        if let Some(existing) = &self.transaction {
            return Err(LineError::AlreadyAttached(existing.id));
        }
        if transaction.category != self.policy.category {
            return Err(LineError::CategoryMismatch {
                expected: self.policy.category,
                found: transaction.category,
            });
        }
        tracing::debug!(transaction = %transaction.id, "attached line");
        self.transaction = Some(transaction);
        Ok(())
    }

    /// The transaction this line belongs to, `None` while detached.
    pub fn transaction(&self) -> Option<&TransactionRef> {
        self.transaction.as_ref()
    }

    pub fn is_attached(&self) -> bool {
        self.transaction.is_some()
    }

    // ── Classification ──────────────────────────────────────────────────

    pub fn line_type(&self) -> LineType {
        self.line_type
    }

    /// Reclassify the line.
    ///
    /// Fails if the line kind excludes `line_type`. Fields that were valid
    /// under the old type are not cleared; with
    /// [`LinePolicy::revalidate_on_line_type_change`] the change is rejected
    /// instead when any of them would become invalid. Fields that were
    /// already invalid never block the change.
    pub fn set_line_type(&mut self, line_type: LineType) -> Result<&mut Self, LineError> {
        rules::check_line_type(line_type, &self.policy).inspect_err(|err| {
            tracing::debug!(%line_type, %err, "rejected line type");
        })?;
        if line_type == self.line_type {
            return Ok(self);
        }

        let stale = self.newly_invalid(LineState {
            line_type,
            ..self.state()
        });
        if !stale.is_empty() {
            if self.policy.revalidate_on_line_type_change {
                return Err(LineError::StaleFields {
                    line_type,
                    fields: stale,
                });
            }
            tracing::warn!(
                from = %self.line_type,
                to = %line_type,
                fields = ?stale,
                "line type change leaves fields that are invalid for the new type"
            );
        }

        self.line_type = line_type;
        Ok(self)
    }

    /// Guarded fields whose current value fails its rule under `state`.
    pub fn invalid_fields(&self, state: LineState) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|field| {
                rules::check(*field, self.guarded_value(*field), &state, &self.policy).is_err()
            })
            .collect()
    }

    /// Fields valid now that would fail their rule under `next`.
    fn newly_invalid(&self, next: LineState) -> Vec<Field> {
        let current = self.invalid_fields(self.state());
        let mut stale = self.invalid_fields(next);
        stale.retain(|field| !current.contains(field));
        stale
    }

    /// The stored value of a guarded field.
    pub(crate) fn guarded_value(&self, field: Field) -> Option<&dyn FieldValue> {
        fn dyn_ref<T: FieldValue>(v: &Option<T>) -> Option<&dyn FieldValue> {
            v.as_ref().map(|v| v as &dyn FieldValue)
        }

        match field {
            Field::Baseline => dyn_ref(&self.baseline),
            Field::BaseValueOpen => dyn_ref(&self.base_value_open),
            Field::CurrencyDate => dyn_ref(&self.currency_date),
            Field::Dim2 => dyn_ref(&self.dim2),
            Field::Dim3 => dyn_ref(&self.dim3),
            Field::InvoiceNumber => dyn_ref(&self.invoice_number),
            Field::MatchLevel => dyn_ref(&self.match_level),
            Field::MatchStatus => dyn_ref(&self.match_status),
            Field::PerformanceType => dyn_ref(&self.performance_type),
            Field::PerformanceCountry => dyn_ref(&self.performance_country),
            Field::PerformanceVatNumber => dyn_ref(&self.performance_vat_number),
            Field::PerformanceDate => dyn_ref(&self.performance_date),
            Field::Relation => dyn_ref(&self.relation),
            Field::RepValueOpen => dyn_ref(&self.rep_value_open),
        }
    }

    fn guard<T: FieldValue>(&self, field: Field, value: Option<&T>) -> Result<(), LineError> {
        let candidate = value.map(|v| v as &dyn FieldValue);
        rules::check(field, candidate, &self.state(), &self.policy).inspect_err(|err| {
            tracing::debug!(%field, line_type = %self.line_type, %err, "rejected line field");
        })
    }

    // ── Unguarded fields ────────────────────────────────────────────────

    /// General ledger account.
    pub fn dim1(&self) -> Option<&str> {
        self.dim1.as_deref()
    }

    pub fn set_dim1(&mut self, dim1: Option<String>) -> &mut Self {
        self.dim1 = dim1;
        self
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_description(&mut self, description: Option<String>) -> &mut Self {
        self.description = description;
        self
    }

    /// Signed line value.
    pub fn value(&self) -> Option<Money> {
        self.value
    }

    pub fn set_value(&mut self, value: Option<Money>) -> &mut Self {
        self.value = value;
        self
    }

    /// Line value without its sign; the side is given by [`debit_credit`](Self::debit_credit).
    pub fn amount(&self) -> Option<Money> {
        self.value.map(|v| v.abs())
    }

    /// Booking side of the value.
    ///
    /// On an incoming transaction (sales, bank) a positive total line is a
    /// debit and a positive detail or VAT line a credit. Outgoing
    /// transactions (purchase) book the other way round. Negative values
    /// flip the side.
    pub fn debit_credit(&self) -> Option<DebitCredit> {
        let value = self.value?;
        let positive = match self.line_type {
            LineType::Total => DebitCredit::Debit,
            LineType::Detail | LineType::Vat => DebitCredit::Credit,
        };
        let positive = if self.policy.incoming {
            positive
        } else {
            positive.flip()
        };
        Some(if value.is_negative() {
            positive.flip()
        } else {
            positive
        })
    }

    // ── Guarded fields ──────────────────────────────────────────────────

    pub fn performance_type(&self) -> Option<PerformanceType> {
        self.performance_type
    }

    /// Only on detail and VAT lines. Mandatory for ICT VAT codes.
    ///
    /// Moving away from `services` can invalidate a stored performance date.
    /// That is handled like a line type change: a warning by default, a
    /// rejection under [`LinePolicy::revalidate_on_line_type_change`].
    pub fn set_performance_type(
        &mut self,
        performance_type: Option<PerformanceType>,
    ) -> Result<&mut Self, LineError> {
        self.guard(Field::PerformanceType, performance_type.as_ref())?;
        if performance_type == self.performance_type {
            return Ok(self);
        }

        let stale = self.newly_invalid(LineState {
            performance_type,
            ..self.state()
        });
        if !stale.is_empty() {
            if self.policy.revalidate_on_line_type_change {
                return Err(LineError::StalePerformanceFields {
                    performance_type,
                    fields: stale,
                });
            }
            tracing::warn!(
                from = ?self.performance_type,
                to = ?performance_type,
                fields = ?stale,
                "performance type change leaves fields that are invalid for it"
            );
        }

        self.performance_type = performance_type;
        Ok(self)
    }

    pub fn baseline(&self) -> Option<u32> {
        self.baseline
    }

    /// Only on VAT lines: the line id of the VAT rate this line is based on.
    pub fn set_baseline(&mut self, baseline: Option<u32>) -> Result<&mut Self, LineError> {
        self.guard(Field::Baseline, baseline.as_ref())?;
        self.baseline = baseline;
        Ok(self)
    }

    pub fn base_value_open(&self) -> Option<Money> {
        self.base_value_open
    }

    /// Only on detail lines: amount still owed in base currency.
    pub fn set_base_value_open(
        &mut self,
        base_value_open: Option<Money>,
    ) -> Result<&mut Self, LineError> {
        self.guard(Field::BaseValueOpen, base_value_open.as_ref())?;
        self.base_value_open = base_value_open;
        Ok(self)
    }

    pub fn currency_date(&self) -> Option<NaiveDate> {
        self.currency_date
    }

    /// Only on detail lines.
    pub fn set_currency_date(
        &mut self,
        currency_date: Option<NaiveDate>,
    ) -> Result<&mut Self, LineError> {
        self.guard(Field::CurrencyDate, currency_date.as_ref())?;
        self.currency_date = currency_date;
        Ok(self)
    }

    pub fn dim2(&self) -> Option<&Dim2> {
        self.dim2.as_ref()
    }

    /// Customer, supplier or cost center. Never on VAT lines.
    pub fn set_dim2(&mut self, dim2: Option<Dim2>) -> Result<&mut Self, LineError> {
        self.guard(Field::Dim2, dim2.as_ref())?;
        self.dim2 = dim2;
        Ok(self)
    }

    pub fn dim3(&self) -> Option<&Dim3> {
        self.dim3.as_ref()
    }

    /// Project or asset. Never on VAT lines.
    pub fn set_dim3(&mut self, dim3: Option<Dim3>) -> Result<&mut Self, LineError> {
        self.guard(Field::Dim3, dim3.as_ref())?;
        self.dim3 = dim3;
        Ok(self)
    }

    pub fn invoice_number(&self) -> Option<&str> {
        self.invoice_number.as_deref()
    }

    pub fn set_invoice_number(
        &mut self,
        invoice_number: Option<String>,
    ) -> Result<&mut Self, LineError> {
        self.guard(Field::InvoiceNumber, invoice_number.as_ref())?;
        self.invoice_number = invoice_number;
        Ok(self)
    }

    pub fn match_level(&self) -> Option<u32> {
        self.match_level
    }

    /// Only on detail lines: level of the matchable dimension.
    pub fn set_match_level(&mut self, match_level: Option<u32>) -> Result<&mut Self, LineError> {
        self.guard(Field::MatchLevel, match_level.as_ref())?;
        self.match_level = match_level;
        Ok(self)
    }

    pub fn match_status(&self) -> Option<MatchStatus> {
        self.match_status
    }

    /// On VAT lines only the pinned status (normally `notmatchable`) is accepted.
    pub fn set_match_status(
        &mut self,
        match_status: Option<MatchStatus>,
    ) -> Result<&mut Self, LineError> {
        self.guard(Field::MatchStatus, match_status.as_ref())?;
        self.match_status = match_status;
        Ok(self)
    }

    pub fn performance_country(&self) -> Option<Country> {
        self.performance_country
    }

    /// Only on detail and VAT lines.
    pub fn set_performance_country(
        &mut self,
        performance_country: Option<Country>,
    ) -> Result<&mut Self, LineError> {
        self.guard(Field::PerformanceCountry, performance_country.as_ref())?;
        self.performance_country = performance_country;
        Ok(self)
    }

    pub fn performance_vat_number(&self) -> Option<&str> {
        self.performance_vat_number.as_deref()
    }

    /// Only on detail and VAT lines.
    pub fn set_performance_vat_number(
        &mut self,
        performance_vat_number: Option<String>,
    ) -> Result<&mut Self, LineError> {
        self.guard(Field::PerformanceVatNumber, performance_vat_number.as_ref())?;
        self.performance_vat_number = performance_vat_number;
        Ok(self)
    }

    pub fn performance_date(&self) -> Option<NaiveDate> {
        self.performance_date
    }

    /// Only on detail and VAT lines, and only once the performance type is
    /// `services` (for kinds that gate on it).
    pub fn set_performance_date(
        &mut self,
        performance_date: Option<NaiveDate>,
    ) -> Result<&mut Self, LineError> {
        self.guard(Field::PerformanceDate, performance_date.as_ref())?;
        self.performance_date = performance_date;
        Ok(self)
    }

    pub fn relation(&self) -> Option<u32> {
        self.relation
    }

    pub fn set_relation(&mut self, relation: Option<u32>) -> Result<&mut Self, LineError> {
        self.guard(Field::Relation, relation.as_ref())?;
        self.relation = relation;
        Ok(self)
    }

    pub fn rep_value_open(&self) -> Option<Money> {
        self.rep_value_open
    }

    /// Only on detail lines: amount still owed in reporting currency.
    pub fn set_rep_value_open(
        &mut self,
        rep_value_open: Option<Money>,
    ) -> Result<&mut Self, LineError> {
        self.guard(Field::RepValueOpen, rep_value_open.as_ref())?;
        self.rep_value_open = rep_value_open;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TransactionId;
    use rust_decimal_macros::dec;

    fn journal_line() -> TransactionLine {
        TransactionLine::for_category(TransactionCategory::Journal)
    }

    #[test]
    fn new_line_is_empty_detail() {
        let line = journal_line();
        assert_eq!(line.line_type(), LineType::Detail);
        assert!(!line.is_attached());
        assert!(line.invalid_fields(line.state()).is_empty());
        assert_eq!(line.value(), None);
    }

    #[test]
    fn rejected_set_keeps_previous_value() {
        let mut line = journal_line();
        line.set_line_type(LineType::Vat).unwrap();
        line.set_baseline(Some(3)).unwrap();
        line.set_line_type(LineType::Detail).unwrap();

        assert!(line.set_baseline(Some(9)).is_err());
        assert_eq!(line.baseline(), Some(3));

        line.set_baseline(None).unwrap();
        assert_eq!(line.baseline(), None);
    }

    #[test]
    fn chained_setters() {
        let mut line = journal_line();
        line.set_dim2(Some(Dim2::Customer("1000".into())))
            .unwrap()
            .set_dim3(Some(Dim3::Project("P-1".into())))
            .unwrap()
            .set_relation(Some(42))
            .unwrap()
            .set_dim1(Some("1300".into()))
            .set_description(Some("Opening balance".into()));

        assert_eq!(line.dim2().map(Dim2::code), Some("1000"));
        assert_eq!(line.dim3().map(Dim3::code), Some("P-1"));
        assert_eq!(line.relation(), Some(42));
        assert_eq!(line.dim1(), Some("1300"));
        assert_eq!(line.description(), Some("Opening balance"));
    }

    #[test]
    fn attach_once() {
        let mut line = journal_line();
        let first = TransactionRef::new(TransactionId::new(1), TransactionCategory::Journal);
        let second = TransactionRef::new(TransactionId::new(2), TransactionCategory::Journal);
        line.attach(first).unwrap();
        assert_eq!(
            line.attach(second),
            Err(LineError::AlreadyAttached(TransactionId::new(1)))
        );
        assert_eq!(line.transaction(), Some(&first));
    }

    #[test]
    fn attach_rejects_other_category() {
        let mut line = journal_line();
        let sales = TransactionRef::new(TransactionId::new(5), TransactionCategory::Sales);
        assert_eq!(
            line.attach(sales),
            Err(LineError::CategoryMismatch {
                expected: TransactionCategory::Journal,
                found: TransactionCategory::Sales,
            })
        );
        assert!(!line.is_attached());
    }

    #[test]
    fn line_type_change_keeps_stale_fields_by_default() {
        let mut line = journal_line();
        line.set_invoice_number(Some("INV-1".into())).unwrap();
        line.set_line_type(LineType::Vat).unwrap();
        assert_eq!(line.line_type(), LineType::Vat);
        assert_eq!(line.invoice_number(), Some("INV-1"));
        assert_eq!(line.invalid_fields(line.state()), vec![Field::InvoiceNumber]);
    }

    #[test]
    fn strict_line_type_change() {
        let mut line = TransactionLine::new(
            LinePolicy::for_category(TransactionCategory::Journal).strict(),
        );
        line.set_base_value_open(Some(Money::eur(dec!(10.00)))).unwrap();
        line.set_dim2(Some(Dim2::CostCenter("00010".into()))).unwrap();

        assert_eq!(
            line.set_line_type(LineType::Vat).unwrap_err(),
            LineError::StaleFields {
                line_type: LineType::Vat,
                fields: vec![Field::BaseValueOpen, Field::Dim2],
            }
        );
        assert_eq!(line.line_type(), LineType::Detail);

        line.set_base_value_open(None).unwrap().set_dim2(None).unwrap();
        line.set_line_type(LineType::Vat).unwrap();
        assert_eq!(line.line_type(), LineType::Vat);
    }

    #[test]
    fn strict_line_type_change_ignores_fields_already_invalid() {
        let mut line = TransactionLine::for_category(TransactionCategory::Sales);
        line.set_invoice_number(Some("INV-1".into())).unwrap();
        line.set_line_type(LineType::Vat).unwrap();
        line.policy.revalidate_on_line_type_change = true;

        // invoicenumber is already stale on the VAT line.
        line.set_line_type(LineType::Vat).unwrap();
        line.set_line_type(LineType::Total).unwrap();
        assert_eq!(line.line_type(), LineType::Total);
        assert_eq!(line.invalid_fields(line.state()), vec![Field::InvoiceNumber]);

        line.set_line_type(LineType::Detail).unwrap();
        assert!(line.invalid_fields(line.state()).is_empty());
    }

    #[test]
    fn strict_performance_type_change() {
        let mut line = TransactionLine::new(
            LinePolicy::for_category(TransactionCategory::Journal).strict(),
        );
        line.set_performance_type(Some(PerformanceType::Services)).unwrap();
        line.set_performance_date(NaiveDate::from_ymd_opt(2024, 1, 1)).unwrap();

        assert_eq!(
            line.set_performance_type(Some(PerformanceType::Goods)).unwrap_err(),
            LineError::StalePerformanceFields {
                performance_type: Some(PerformanceType::Goods),
                fields: vec![Field::PerformanceDate],
            }
        );
        assert_eq!(line.performance_type(), Some(PerformanceType::Services));

        // The line stays reclassifiable, including to its own type.
        line.set_line_type(LineType::Detail).unwrap();
        line.set_line_type(LineType::Vat).unwrap();

        line.set_performance_date(None).unwrap();
        line.set_performance_type(Some(PerformanceType::Goods)).unwrap();
        assert_eq!(line.performance_type(), Some(PerformanceType::Goods));
    }

    #[test]
    fn performance_type_change_keeps_stale_date_by_default() {
        let mut line = journal_line();
        line.set_performance_type(Some(PerformanceType::Services)).unwrap();
        line.set_performance_date(NaiveDate::from_ymd_opt(2024, 1, 1)).unwrap();
        line.set_performance_type(None).unwrap();

        assert_eq!(line.performance_type(), None);
        assert!(line.performance_date().is_some());
        assert_eq!(line.invalid_fields(line.state()), vec![Field::PerformanceDate]);
    }

    #[test]
    fn clone_is_detached() {
        let mut line = journal_line();
        line.set_relation(Some(5)).unwrap();
        line.attach(TransactionRef::new(TransactionId::new(1), TransactionCategory::Journal))
            .unwrap();

        let copy = line.clone();
        assert!(line.is_attached());
        assert!(!copy.is_attached());
        assert_eq!(copy.relation(), Some(5));
        assert_eq!(copy.policy(), line.policy());
    }

    #[test]
    fn debit_credit_incoming() {
        let mut line = TransactionLine::for_category(TransactionCategory::Sales);
        line.set_value(Some(Money::eur(dec!(100))));
        assert_eq!(line.debit_credit(), Some(DebitCredit::Credit));

        line.set_line_type(LineType::Total).unwrap();
        assert_eq!(line.debit_credit(), Some(DebitCredit::Debit));

        line.set_value(Some(Money::eur(dec!(-100))));
        assert_eq!(line.debit_credit(), Some(DebitCredit::Credit));
        assert_eq!(line.amount(), Some(Money::eur(dec!(100))));
    }

    #[test]
    fn debit_credit_outgoing() {
        let mut line = TransactionLine::for_category(TransactionCategory::Purchase);
        line.set_value(Some(Money::eur(dec!(100))));
        assert_eq!(line.debit_credit(), Some(DebitCredit::Debit));

        line.set_line_type(LineType::Total).unwrap();
        assert_eq!(line.debit_credit(), Some(DebitCredit::Credit));

        line.set_value(None);
        assert_eq!(line.debit_credit(), None);
    }
}
