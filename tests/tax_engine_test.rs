//! Tax engine unit tests: exact subtotals, per-field rounding, and the
//! two-policy split semantics.

use invoice_service::models::LineItem;
use invoice_service::services::tax::{TaxEngine, TaxPolicy};
use rust_decimal::Decimal;

fn item(description: &str, quantity: Decimal, unit_price: Decimal, tax_rate: Decimal) -> LineItem {
    LineItem {
        description: description.to_string(),
        quantity,
        unit_price,
        tax_rate,
    }
}

#[test]
fn per_item_worked_example() {
    // 2 x 100 at 18% -> line 200, tax 36, split 18/18, total 236.00
    let engine = TaxEngine::new(TaxPolicy::PerItem);
    let items = vec![item(
        "Widget",
        Decimal::from(2),
        Decimal::from(100),
        Decimal::from(18),
    )];

    let breakdown = engine.compute(&items);

    assert_eq!(breakdown.subtotal, Decimal::from(200));
    assert_eq!(breakdown.gst, Decimal::from(36));
    assert_eq!(breakdown.cgst, Decimal::from(18));
    assert_eq!(breakdown.sgst, Decimal::from(18));
    assert_eq!(breakdown.total, Decimal::new(23600, 2));
}

#[test]
fn subtotal_is_exact_before_rounding() {
    let engine = TaxEngine::new(TaxPolicy::PerItem);
    // 3 x 0.333 = 0.999 exactly, no intermediate rounding
    let items = vec![item(
        "Fraction",
        Decimal::from(3),
        Decimal::new(333, 3),
        Decimal::ZERO,
    )];

    let breakdown = engine.compute(&items);

    assert_eq!(breakdown.subtotal, Decimal::new(999, 3));
    assert_eq!(breakdown.gst, Decimal::ZERO);
    // Grand total is rounded to 2 dp: 0.999 -> 1.00
    assert_eq!(breakdown.total, Decimal::new(100, 2));
}

#[test]
fn split_then_round_may_drift_one_cent() {
    let engine = TaxEngine::new(TaxPolicy::PerItem);
    // line 0.10 at 10% -> gst 0.01; each half rounds 0.005 up to 0.01
    let items = vec![item(
        "Tiny",
        Decimal::ONE,
        Decimal::new(10, 2),
        Decimal::from(10),
    )];

    let breakdown = engine.compute(&items);

    assert_eq!(breakdown.gst, Decimal::new(1, 2));
    assert_eq!(breakdown.cgst, Decimal::new(1, 2));
    assert_eq!(breakdown.sgst, Decimal::new(1, 2));
    // The documented asymmetry: cgst + sgst exceeds gst by exactly one cent.
    assert_eq!(breakdown.cgst + breakdown.sgst - breakdown.gst, Decimal::new(1, 2));
}

#[test]
fn rounds_half_away_from_zero() {
    let engine = TaxEngine::new(TaxPolicy::PerItem);
    // tax = 12.5 * 1% = 0.125 -> rounds up to 0.13, not banker's 0.12
    let items = vec![item(
        "Midpoint",
        Decimal::ONE,
        Decimal::new(125, 1),
        Decimal::ONE,
    )];

    let breakdown = engine.compute(&items);

    assert_eq!(breakdown.gst, Decimal::new(13, 2));
}

#[test]
fn zeroed_fields_never_fail() {
    let engine = TaxEngine::new(TaxPolicy::PerItem);
    let items = vec![item("Empty", Decimal::ZERO, Decimal::ZERO, Decimal::ZERO)];

    let breakdown = engine.compute(&items);

    assert_eq!(breakdown.subtotal, Decimal::ZERO);
    assert_eq!(breakdown.total, Decimal::ZERO);
}

#[test]
fn empty_item_list_yields_zero_breakdown() {
    let engine = TaxEngine::new(TaxPolicy::PerItem);
    let breakdown = engine.compute(&[]);

    assert_eq!(breakdown.subtotal, Decimal::ZERO);
    assert_eq!(breakdown.gst, Decimal::ZERO);
    assert_eq!(breakdown.cgst, Decimal::ZERO);
    assert_eq!(breakdown.sgst, Decimal::ZERO);
    assert_eq!(breakdown.total, Decimal::ZERO);
}

#[test]
fn flat_policy_ignores_item_rates() {
    let engine = TaxEngine::new(TaxPolicy::Flat {
        rate: Decimal::from(18),
    });
    // Item carries a 5% rate but the flat policy taxes the subtotal at 18%.
    let items = vec![item(
        "Service",
        Decimal::from(2),
        Decimal::from(100),
        Decimal::from(5),
    )];

    let breakdown = engine.compute(&items);

    assert_eq!(breakdown.subtotal, Decimal::from(200));
    assert_eq!(breakdown.gst, Decimal::from(36));
    assert_eq!(breakdown.cgst, Decimal::from(18));
    assert_eq!(breakdown.sgst, Decimal::from(18));
    assert_eq!(breakdown.total, Decimal::from(236));
}

#[test]
fn mixed_rates_sum_per_item() {
    let engine = TaxEngine::new(TaxPolicy::PerItem);
    let items = vec![
        item("A", Decimal::ONE, Decimal::from(100), Decimal::from(18)),
        item("B", Decimal::ONE, Decimal::from(50), Decimal::from(5)),
        item("C", Decimal::from(4), Decimal::from(25), Decimal::ZERO),
    ];

    let breakdown = engine.compute(&items);

    assert_eq!(breakdown.subtotal, Decimal::from(250));
    // 18 + 2.5 + 0
    assert_eq!(breakdown.gst, Decimal::new(2050, 2));
    assert_eq!(breakdown.cgst, Decimal::new(1025, 2));
    assert_eq!(breakdown.sgst, Decimal::new(1025, 2));
    assert_eq!(breakdown.total, Decimal::new(27050, 2));
}
