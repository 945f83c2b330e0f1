// handlers/protected/reports/attachment.rs - GET /api/reports/:id/attachment handler

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Extension,
};

use crate::error::ApiError;
use crate::handlers::utils::parse_id;
use crate::middleware::ValidatedUser;
use crate::services::ReportService;
use crate::state::AppState;

/// Streams the stored file back with its original name. Visible to the owner,
/// admins of the report's department and superadmins.
pub async fn report_attachment_get(
    State(state): State<AppState>,
    Extension(ValidatedUser(user)): Extension<ValidatedUser>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id, "id")?;
    let (attachment, bytes) = ReportService::new(&state).attachment(&user, id).await?;

    let file_name: String = attachment
        .file_name
        .chars()
        .filter(|c| c.is_ascii() && !c.is_ascii_control() && *c != '"' && *c != '\\')
        .collect();
    let headers = [
        (header::CONTENT_TYPE, attachment.mime_type),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file_name),
        ),
    ];
    Ok((headers, bytes).into_response())
}
