//! Axum route handlers for the Export API.

use axum::{
    extract::State,
    http::{header, HeaderName},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::meal_plan::{MealPlanContent, RenderOptions};
use crate::state::AppState;

const EXPORT_ID_HEADER: HeaderName = HeaderName::from_static("x-export-id");

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub content: MealPlanContent,
    pub options: RenderOptions,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/meal-plans/export
///
/// Renders the meal plan to PDF and returns it as a download.
/// Rendering is CPU-bound and runs on the blocking pool.
pub async fn handle_export(
    State(state): State<AppState>,
    Json(request): Json<ExportRequest>,
) -> Result<Response, AppError> {
    let export_id = Uuid::new_v4();
    let filename = export_filename(&request.options);
    let renderer = state.renderer.clone();

    let pdf = tokio::task::spawn_blocking(move || {
        renderer.generate(&request.content, &request.options)
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("export task failed: {e}")))??;

    info!(%export_id, %filename, bytes = pdf.len(), "meal plan exported");

    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ),
        (EXPORT_ID_HEADER, export_id.to_string()),
    ];
    Ok((headers, Bytes::from(pdf)).into_response())
}

/// `meal-plan-<planType>-<YYYY-MM-DD>.pdf`, or without the date when it does not parse.
pub fn export_filename(options: &RenderOptions) -> String {
    match options.created_on() {
        Some(date) => format!("meal-plan-{}-{date}.pdf", options.plan_type.as_str()),
        None => format!("meal-plan-{}.pdf", options.plan_type.as_str()),
    }
}
