//! Google Sheets export sink.
//!
//! Best-effort mirror of finalized invoices into a spreadsheet, invoked
//! explicitly per invoice, never as a side effect of creation. Appends
//! are at-least-once: exporting the same invoice twice produces two rows.
//! Credential problems are configuration errors surfaced at startup or at
//! call time; they are never silently swallowed.

use crate::config::SheetsConfig;
use crate::error::AppError;
use crate::models::Invoice;
use async_trait::async_trait;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const APPEND_RANGE: &str = "Sheet1!A:I";
const HEADER_RANGE: &str = "Sheet1!A1:I1";

/// Column contract of the destination sheet.
pub const SHEET_HEADERS: [&str; 9] = [
    "ID",
    "Customer Name",
    "Customer Phone",
    "Customer Email",
    "Date",
    "Items",
    "Subtotal",
    "Taxes (CGST+SGST)",
    "Total",
];

#[async_trait]
pub trait ExportSink: Send + Sync {
    async fn export_row(&self, invoice: &Invoice) -> Result<(), AppError>;
}

pub struct SheetsExporter {
    http: reqwest::Client,
    client_email: String,
    signing_key: EncodingKey,
    spreadsheet_id: String,
}

#[derive(Debug, Serialize)]
struct TokenClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

impl SheetsExporter {
    pub fn new(config: &SheetsConfig) -> Result<Self, AppError> {
        let signing_key = EncodingKey::from_rsa_pem(config.private_key.as_bytes()).map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!(
                "Invalid service account private key: {}",
                e
            ))
        })?;
        Ok(Self {
            http: reqwest::Client::new(),
            client_email: config.client_email.clone(),
            signing_key,
            spreadsheet_id: config.spreadsheet_id.clone(),
        })
    }

    async fn access_token(&self) -> Result<String, AppError> {
        let now = chrono::Utc::now().timestamp();
        let claims = TokenClaims {
            iss: &self.client_email,
            scope: SHEETS_SCOPE,
            aud: TOKEN_URL,
            iat: now,
            exp: now + 3600,
        };
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &self.signing_key)
            .map_err(|e| {
                AppError::ExportError(anyhow::anyhow!("Failed to sign auth assertion: {}", e))
            })?;

        let response = self
            .http
            .post(TOKEN_URL)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::ExportError(anyhow::anyhow!("Token exchange failed: {}", e)))?
            .error_for_status()
            .map_err(|e| {
                AppError::ExportError(anyhow::anyhow!("Token exchange rejected: {}", e))
            })?;

        let token: TokenResponse = response.json().await.map_err(|e| {
            AppError::ExportError(anyhow::anyhow!("Malformed token response: {}", e))
        })?;
        Ok(token.access_token)
    }

    fn values_url(&self, range: &str, suffix: &str) -> String {
        format!(
            "https://sheets.googleapis.com/v4/spreadsheets/{}/values/{}{}",
            self.spreadsheet_id, range, suffix
        )
    }

    /// Rewrite the header row whenever it is absent or does not match the
    /// expected column contract.
    async fn ensure_headers(&self, token: &str) -> Result<(), AppError> {
        let response = self
            .http
            .get(self.values_url(HEADER_RANGE, ""))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AppError::ExportError(anyhow::anyhow!("Header read failed: {}", e)))?
            .error_for_status()
            .map_err(|e| AppError::ExportError(anyhow::anyhow!("Header read rejected: {}", e)))?;

        let existing: ValueRange = response.json().await.map_err(|e| {
            AppError::ExportError(anyhow::anyhow!("Malformed header response: {}", e))
        })?;
        let first_row = existing.values.first().cloned().unwrap_or_default();

        let matches = first_row.len() == SHEET_HEADERS.len()
            && first_row
                .iter()
                .zip(SHEET_HEADERS.iter())
                .all(|(cell, expected)| cell.as_str() == Some(expected));
        if matches {
            return Ok(());
        }

        tracing::warn!("Sheet header row missing or mismatched, rewriting");
        self.http
            .put(self.values_url(HEADER_RANGE, "?valueInputOption=USER_ENTERED"))
            .bearer_auth(token)
            .json(&json!({ "values": [SHEET_HEADERS] }))
            .send()
            .await
            .map_err(|e| AppError::ExportError(anyhow::anyhow!("Header write failed: {}", e)))?
            .error_for_status()
            .map_err(|e| AppError::ExportError(anyhow::anyhow!("Header write rejected: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl ExportSink for SheetsExporter {
    async fn export_row(&self, invoice: &Invoice) -> Result<(), AppError> {
        let token = self.access_token().await?;
        self.ensure_headers(&token).await?;

        self.http
            .post(self.values_url(
                APPEND_RANGE,
                ":append?valueInputOption=USER_ENTERED&insertDataOption=INSERT_ROWS",
            ))
            .bearer_auth(&token)
            .json(&json!({ "values": [invoice_row(invoice)] }))
            .send()
            .await
            .map_err(|e| AppError::ExportError(anyhow::anyhow!("Row append failed: {}", e)))?
            .error_for_status()
            .map_err(|e| AppError::ExportError(anyhow::anyhow!("Row append rejected: {}", e)))?;

        tracing::info!(invoice_id = %invoice.id, "Invoice exported to sheet");
        Ok(())
    }
}

/// One spreadsheet row for an invoice, in [`SHEET_HEADERS`] column order.
pub fn invoice_row(invoice: &Invoice) -> Vec<Value> {
    let item_summary = invoice
        .items
        .iter()
        .map(|item| format!("{} x{}", item.description, item.quantity))
        .collect::<Vec<_>>()
        .join(", ");

    vec![
        json!(invoice.id),
        json!(invoice.customer_name),
        json!(invoice.customer_phone),
        json!(invoice.customer_email),
        json!(invoice.issue_date.format("%Y-%m-%d %H:%M").to_string()),
        json!(item_summary),
        json!(format!("{:.2}", invoice.subtotal)),
        json!(format!("{:.2}", invoice.cgst + invoice.sgst)),
        json!(format!("{:.2}", invoice.total)),
    ]
}
