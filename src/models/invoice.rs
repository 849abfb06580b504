//! Invoice document model.

use crate::services::tax::TaxBreakdown;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One product or service entry on an invoice. Line items exist only
/// embedded inside an invoice; they carry no identity of their own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    #[serde(default)]
    pub quantity: Decimal,
    #[serde(default)]
    pub unit_price: Decimal,
    /// GST percentage for this item.
    #[serde(default)]
    pub tax_rate: Decimal,
}

impl LineItem {
    pub fn line_amount(&self) -> Decimal {
        self.quantity * self.unit_price
    }
}

/// Stored invoice record. Immutable after creation: the derived monetary
/// fields are computed once from the items and never edited independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    #[serde(rename = "_id")]
    pub id: String,
    pub owner_email: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: String,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub issue_date: DateTime<Utc>,
    pub items: Vec<LineItem>,
    pub subtotal: Decimal,
    /// Total GST (CGST + SGST before the split-then-round).
    pub gst: Decimal,
    pub cgst: Decimal,
    pub sgst: Decimal,
    pub total: Decimal,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        owner_email: String,
        customer_name: String,
        customer_phone: String,
        customer_email: String,
        issue_date: Option<DateTime<Utc>>,
        items: Vec<LineItem>,
        breakdown: TaxBreakdown,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            owner_email,
            customer_name,
            customer_phone,
            customer_email,
            issue_date: issue_date.unwrap_or(now),
            items,
            subtotal: breakdown.subtotal,
            gst: breakdown.gst,
            cgst: breakdown.cgst,
            sgst: breakdown.sgst,
            total: breakdown.total,
            created_at: now,
            updated_at: now,
        }
    }

    /// Derived document number: `INV` plus the last five characters of the id.
    pub fn invoice_number(&self) -> String {
        let tail = &self.id[self.id.len().saturating_sub(5)..];
        format!("INV{}", tail)
    }
}
