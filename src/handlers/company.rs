use crate::dtos::CompanyUpdate;
use crate::error::AppError;
use crate::startup::AppState;
use axum::{
    extract::{Multipart, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;

pub async fn get_company(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.company.get().await)
}

pub async fn update_company(
    State(state): State<AppState>,
    Json(partial): Json<CompanyUpdate>,
) -> Result<impl IntoResponse, AppError> {
    let company = state.company.update(partial).await?;
    tracing::info!(company = %company.name, "Company profile updated");
    Ok(Json(json!({ "success": true, "company": company })))
}

pub async fn upload_logo(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| {
            AppError::BadRequest(anyhow::anyhow!("Failed to read multipart field: {}", e))
        })?
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("No logo file uploaded")))?;

    let original_name = field.file_name().unwrap_or("company-logo.png").to_string();
    let data = field
        .bytes()
        .await
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Failed to read logo bytes: {}", e)))?
        .to_vec();

    if data.is_empty() {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Uploaded logo file is empty"
        )));
    }

    let company = state.company.set_logo(&original_name, data).await?;
    Ok(Json(json!({ "success": true, "company": company })))
}
