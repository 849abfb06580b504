use crate::dtos::{ApiResponse, CreateInvoiceRequest, InvoiceResponse, ListInvoicesParams};
use crate::error::AppError;
use crate::models::{Invoice, LineItem};
use crate::services::renderer::{render_invoice, Disposition};
use crate::startup::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use validator::Validate;

pub async fn list_invoices(
    State(state): State<AppState>,
    Query(params): Query<ListInvoicesParams>,
) -> Result<impl IntoResponse, AppError> {
    let owner_email = params
        .owner_email
        .filter(|email| !email.is_empty())
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("User email is required")))?;

    let invoices = state.db.list_by_owner(&owner_email).await?;
    let data: Vec<InvoiceResponse> = invoices.into_iter().map(InvoiceResponse::from).collect();
    Ok(Json(ApiResponse::ok(data)))
}

pub async fn get_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let invoice = fetch_invoice(&state, &id).await?;
    Ok(Json(ApiResponse::ok(InvoiceResponse::from(invoice))))
}

pub async fn create_invoice(
    State(state): State<AppState>,
    Json(payload): Json<CreateInvoiceRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let items: Vec<LineItem> = payload.items.into_iter().map(LineItem::from).collect();
    let breakdown = state.tax.compute(&items);

    let invoice = Invoice::new(
        payload.owner_email,
        payload.customer_name,
        payload.customer_phone,
        payload.customer_email,
        payload.date,
        items,
        breakdown,
    );

    state.db.create_invoice(&invoice).await?;

    tracing::info!(
        invoice_id = %invoice.id,
        owner_email = %invoice.owner_email,
        total = %invoice.total,
        "Invoice created"
    );

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(InvoiceResponse::from(invoice))),
    ))
}

pub async fn download_invoice_pdf(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    serve_pdf(state, id, Disposition::Download).await
}

pub async fn print_invoice_pdf(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    serve_pdf(state, id, Disposition::Inline).await
}

async fn serve_pdf(
    state: AppState,
    id: String,
    disposition: Disposition,
) -> Result<impl IntoResponse, AppError> {
    let invoice = fetch_invoice(&state, &id).await?;
    let profile = state.company.get().await;
    let logo = state.company.logo_bytes(&profile).await;

    let bytes = render_invoice(&invoice, &profile, logo.as_deref(), state.tax.policy())?;

    tracing::info!(
        invoice_id = %invoice.id,
        disposition = disposition.as_str(),
        size = bytes.len(),
        "Invoice rendered"
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!(
                    "{}; filename=\"invoice_{}.pdf\"",
                    disposition.as_str(),
                    invoice.id
                ),
            ),
        ],
        bytes,
    ))
}

/// Mirror one stored invoice to the configured spreadsheet. Explicit
/// operation: creation never triggers it implicitly.
pub async fn export_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let exporter = state.exporter.as_ref().ok_or_else(|| {
        AppError::ConfigError(anyhow::anyhow!(
            "Sheets export is not configured for this deployment"
        ))
    })?;

    let invoice = fetch_invoice(&state, &id).await?;
    exporter.export_row(&invoice).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Invoice exported"
    })))
}

async fn fetch_invoice(state: &AppState, id: &str) -> Result<Invoice, AppError> {
    state
        .db
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Invoice not found")))
}
