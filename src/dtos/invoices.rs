use crate::models::{Invoice, LineItem};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Success envelope shared by the JSON endpoints.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Line item as received on the wire. Missing numeric fields degrade to
/// zero rather than rejecting the payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemRequest {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub quantity: Decimal,
    // Older clients send this field as "price".
    #[serde(default, alias = "price")]
    pub unit_price: Decimal,
    #[serde(default)]
    pub tax_rate: Decimal,
}

impl From<LineItemRequest> for LineItem {
    fn from(item: LineItemRequest) -> Self {
        LineItem {
            description: item.description,
            quantity: item.quantity,
            unit_price: item.unit_price,
            tax_rate: item.tax_rate,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "owner email is required"))]
    pub owner_email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "customer name is required"))]
    pub customer_name: String,
    #[serde(default)]
    pub customer_phone: String,
    #[serde(default)]
    pub customer_email: String,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    #[validate(length(min = 1, message = "at least one line item is required"))]
    pub items: Vec<LineItemRequest>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemResponse {
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub tax_rate: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceResponse {
    pub id: String,
    pub owner_email: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: String,
    pub date: String,
    pub items: Vec<LineItemResponse>,
    pub subtotal: Decimal,
    pub gst: Decimal,
    pub cgst: Decimal,
    pub sgst: Decimal,
    pub total: Decimal,
    pub created_at: String,
}

impl From<Invoice> for InvoiceResponse {
    fn from(invoice: Invoice) -> Self {
        Self {
            id: invoice.id,
            owner_email: invoice.owner_email,
            customer_name: invoice.customer_name,
            customer_phone: invoice.customer_phone,
            customer_email: invoice.customer_email,
            date: invoice.issue_date.to_rfc3339(),
            items: invoice
                .items
                .into_iter()
                .map(|item| LineItemResponse {
                    description: item.description,
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                    tax_rate: item.tax_rate,
                })
                .collect(),
            subtotal: invoice.subtotal,
            gst: invoice.gst,
            cgst: invoice.cgst,
            sgst: invoice.sgst,
            total: invoice.total,
            created_at: invoice.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListInvoicesParams {
    pub owner_email: Option<String>,
}
