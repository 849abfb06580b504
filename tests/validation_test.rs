//! Wire payload tests: create-invoice validation rules and the
//! degrade-to-zero handling of missing numeric item fields.

use invoice_service::dtos::CreateInvoiceRequest;
use rust_decimal::Decimal;
use validator::Validate;

fn parse(json: &str) -> CreateInvoiceRequest {
    serde_json::from_str(json).expect("payload should deserialize")
}

#[test]
fn full_payload_passes_validation() {
    let payload = parse(
        r#"{
            "ownerEmail": "owner@example.com",
            "customerName": "Acme Traders",
            "customerPhone": "9876543210",
            "items": [
                {"description": "Widget", "quantity": 2, "unitPrice": 100, "taxRate": 18}
            ]
        }"#,
    );
    assert!(payload.validate().is_ok());
    assert_eq!(payload.items[0].unit_price, Decimal::from(100));
}

#[test]
fn empty_item_list_is_rejected() {
    let payload = parse(
        r#"{
            "ownerEmail": "owner@example.com",
            "customerName": "Acme Traders",
            "items": []
        }"#,
    );
    assert!(payload.validate().is_err());
}

#[test]
fn item_length_error_names_the_items_field() {
    let payload = parse(
        r#"{
            "ownerEmail": "owner@example.com",
            "customerName": "Acme Traders",
            "items": []
        }"#,
    );
    let err = payload.validate().expect_err("expected a validation error");
    // The error params carry the offending value, which requires the
    // line-item wire type to serialize.
    assert!(err.field_errors().contains_key("items"));
}

#[test]
fn missing_items_field_is_rejected() {
    let payload = parse(
        r#"{
            "ownerEmail": "owner@example.com",
            "customerName": "Acme Traders"
        }"#,
    );
    assert!(payload.validate().is_err());
}

#[test]
fn missing_customer_name_is_rejected() {
    let payload = parse(
        r#"{
            "ownerEmail": "owner@example.com",
            "items": [{"description": "Widget", "quantity": 1, "unitPrice": 10}]
        }"#,
    );
    assert!(payload.validate().is_err());
}

#[test]
fn missing_owner_email_is_rejected() {
    let payload = parse(
        r#"{
            "customerName": "Acme Traders",
            "items": [{"description": "Widget", "quantity": 1, "unitPrice": 10}]
        }"#,
    );
    assert!(payload.validate().is_err());
}

#[test]
fn missing_numeric_item_fields_default_to_zero() {
    let payload = parse(
        r#"{
            "ownerEmail": "owner@example.com",
            "customerName": "Acme Traders",
            "items": [{"description": "Widget"}]
        }"#,
    );
    assert!(payload.validate().is_ok());

    let item = &payload.items[0];
    assert_eq!(item.quantity, Decimal::ZERO);
    assert_eq!(item.unit_price, Decimal::ZERO);
    assert_eq!(item.tax_rate, Decimal::ZERO);
}

#[test]
fn legacy_price_alias_is_accepted() {
    let payload = parse(
        r#"{
            "ownerEmail": "owner@example.com",
            "customerName": "Acme Traders",
            "items": [{"description": "Widget", "quantity": 1, "price": 99.5}]
        }"#,
    );
    assert_eq!(payload.items[0].unit_price, Decimal::new(995, 1));
}

#[test]
fn decimal_fields_accept_strings_and_numbers() {
    let payload = parse(
        r#"{
            "ownerEmail": "owner@example.com",
            "customerName": "Acme Traders",
            "items": [{"description": "Widget", "quantity": "2.5", "unitPrice": 10.25}]
        }"#,
    );
    assert_eq!(payload.items[0].quantity, Decimal::new(25, 1));
    assert_eq!(payload.items[0].unit_price, Decimal::new(1025, 2));
}
