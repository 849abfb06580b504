//! Tax computation engine.
//!
//! Pure derivation of the monetary fields of an invoice from its line
//! items. All monetary outputs are rounded to two decimal places with
//! half-away-from-zero rounding, applied independently per derived field.
//! CGST and SGST are each half of the rounded GST total, rounded again on
//! their own; their sum may therefore differ from the GST total by one
//! cent, which is the documented behavior of the system, not a bug.

use crate::models::LineItem;
use rust_decimal::{Decimal, RoundingStrategy};

/// Which tax computation strategy is in force. Selected at configuration
/// time; the two variants are incompatible and must not be mixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxPolicy {
    /// GST total is the sum of per-item `line_amount * tax_rate / 100`.
    PerItem,
    /// GST total is `subtotal * rate / 100`, ignoring per-item rates.
    Flat { rate: Decimal },
}

/// Derived monetary fields for one invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxBreakdown {
    pub subtotal: Decimal,
    pub gst: Decimal,
    pub cgst: Decimal,
    pub sgst: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, Copy)]
pub struct TaxEngine {
    policy: TaxPolicy,
}

impl TaxEngine {
    pub fn new(policy: TaxPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> TaxPolicy {
        self.policy
    }

    /// Compute the tax breakdown for a sequence of line items.
    ///
    /// Never fails: absent numeric fields have already been defaulted to
    /// zero during deserialization, and an empty item list (rejected by
    /// the API layer before the store is touched) yields an all-zero
    /// breakdown. The subtotal is exact; rounding only happens on the
    /// derived fields.
    pub fn compute(&self, items: &[LineItem]) -> TaxBreakdown {
        let mut subtotal = Decimal::ZERO;
        let mut rated_tax = Decimal::ZERO;

        for item in items {
            let line_amount = item.line_amount();
            subtotal += line_amount;
            rated_tax += line_amount * item.tax_rate / Decimal::ONE_HUNDRED;
        }

        let gst = round2(match self.policy {
            TaxPolicy::PerItem => rated_tax,
            TaxPolicy::Flat { rate } => subtotal * rate / Decimal::ONE_HUNDRED,
        });

        // Split-then-round: each half rounds on its own.
        let half = gst / Decimal::TWO;
        let cgst = round2(half);
        let sgst = round2(half);

        let total = round2(subtotal + gst);

        TaxBreakdown {
            subtotal,
            gst,
            cgst,
            sgst,
            total,
        }
    }
}

fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
