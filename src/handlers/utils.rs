// handlers/utils.rs - Extractors and parsing helpers shared by every tier

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::ApiError;

/// `Json<T>` whose rejection is rendered in the API error envelope
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(json_rejection(rejection)),
        }
    }
}

fn json_rejection(rejection: JsonRejection) -> ApiError {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::bad_request("Expected request with `Content-Type: application/json`")
        }
        other => ApiError::invalid_json(other.body_text()),
    }
}

/// Path ids are parsed here so a malformed id is always a 400
pub fn parse_id(raw: &str, field: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| ApiError::invalid_field(field, format!("'{}' is not a valid id", raw)))
}

/// Optional enum-like query value; blank means "not given"
pub fn parse_optional<T>(raw: Option<&str>, field: &str) -> Result<Option<T>, ApiError>
where
    T: std::str::FromStr<Err = String>,
{
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        Some(value) => value
            .parse::<T>()
            .map(Some)
            .map_err(|e| ApiError::invalid_field(field, e)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::ReportStatus;

    #[test]
    fn malformed_ids_are_bad_requests() {
        let err = parse_id("not-a-uuid", "id").unwrap_err();
        assert_eq!(err.status_code(), 400);

        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string(), "id").unwrap(), id);
    }

    #[test]
    fn optional_values_treat_blank_as_missing() {
        assert_eq!(parse_optional::<ReportStatus>(Some(" "), "status").unwrap(), None);
        assert_eq!(
            parse_optional::<ReportStatus>(Some("Approved"), "status").unwrap(),
            Some(ReportStatus::Approved)
        );
        assert!(parse_optional::<ReportStatus>(Some("Done"), "status").is_err());
    }
}
