// handlers/protected/reports/create.rs - POST /api/reports handler
//
// Accepts either a JSON body or multipart/form-data. In the multipart form the
// text fields travel as parts and the optional file as the `attachment` part.

use axum::{
    extract::{multipart::MultipartError, FromRequest, Multipart, Request, State},
    http::{header, HeaderMap, StatusCode},
    Extension,
};
use serde::Deserialize;

use crate::database::models::Report;
use crate::error::ApiError;
use crate::handlers::utils::JsonBody;
use crate::middleware::{ApiResponse, ApiResult, ValidatedUser};
use crate::services::{ReportDraft, ReportService, Upload};
use crate::state::AppState;
use crate::storage::AttachmentMeta;

#[derive(Debug, Deserialize)]
pub struct CreateReportRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub urgency: Option<String>,
}

impl From<CreateReportRequest> for ReportDraft {
    fn from(body: CreateReportRequest) -> Self {
        ReportDraft {
            title: body.title,
            description: body.description,
            category: body.category,
            urgency: body.urgency,
        }
    }
}

/**
 * POST /api/reports - Submit a new report
 *
 * The report starts Pending. Admins of the matching department and every
 * superadmin are notified, and connected clients receive a `reportUpdated`
 * event of type `new_report`.
 *
 * Errors: 400 missing field or unknown category, 400 disallowed file type,
 * 413 attachment over the configured limit.
 */
pub async fn report_post(
    State(state): State<AppState>,
    Extension(ValidatedUser(user)): Extension<ValidatedUser>,
    request: Request,
) -> ApiResult<Report> {
    let (draft, upload) = if is_multipart(request.headers()) {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        read_form(multipart).await?
    } else {
        let JsonBody(body) = JsonBody::<CreateReportRequest>::from_request(request, &state).await?;
        (ReportDraft::from(body), None)
    };

    let report = ReportService::new(&state).create(&user, draft, upload).await?;
    Ok(ApiResponse::created(report).with_message("Report submitted successfully"))
}

fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim_start().to_ascii_lowercase().starts_with("multipart/form-data"))
        .unwrap_or(false)
}

async fn read_form(mut multipart: Multipart) -> Result<(ReportDraft, Option<Upload>), ApiError> {
    let mut draft = ReportDraft::default();
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "attachment" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let mime_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(multipart_error)?;
                // Browsers send an empty part when no file was picked
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                upload = Some(Upload {
                    bytes: bytes.to_vec(),
                    meta: AttachmentMeta {
                        file_name,
                        mime_type,
                    },
                });
            }
            "title" | "description" | "category" | "urgency" => {
                let value = field.text().await.map_err(multipart_error)?;
                match name.as_str() {
                    "title" => draft.title = value,
                    "description" => draft.description = value,
                    "category" => draft.category = value,
                    _ => draft.urgency = Some(value),
                }
            }
            other => tracing::debug!("Ignoring unknown form field '{}'", other),
        }
    }

    Ok((draft, upload))
}

fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large(e.body_text())
    } else {
        ApiError::bad_request(e.body_text())
    }
}
