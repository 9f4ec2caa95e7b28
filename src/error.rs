//! Error handling for the application

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::allotments::AllotmentError;
use crate::guests::ClassificationError;

/// A problem with a single input field, reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

impl FieldIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {}", summarize(.0))]
    Validation(Vec<FieldIssue>),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Allotment(#[from] AllotmentError),

    #[error("Data integrity fault: {0}")]
    Integrity(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

fn summarize(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(|i| format!("{}: {}", i.field, i.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl AppError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        AppError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation(vec![FieldIssue::new(field, message)])
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Allotment(AllotmentError::NotFound { .. }) => StatusCode::NOT_FOUND,
            AppError::Allotment(_) => StatusCode::CONFLICT,
            AppError::Integrity(_) | AppError::Database(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<ClassificationError> for AppError {
    fn from(err: ClassificationError) -> Self {
        let field = match err {
            ClassificationError::MissingCheckinDate => "checkin_date",
            _ => "birthdate",
        };
        AppError::invalid(field, err.to_string())
    }
}

/// JSON body returned for every error response
#[derive(Debug, Serialize)]
struct ErrorBody {
    error_type: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<FieldIssue>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error_type, message, errors) = match self {
            AppError::NotFound { .. } => ("not_found", self.to_string(), vec![]),
            AppError::Validation(issues) => {
                ("validation", "Validation failed".to_string(), issues)
            }
            AppError::Conflict(msg) => ("conflict", msg, vec![]),
            AppError::Allotment(e) => {
                let kind = match e {
                    AllotmentError::NotFound { .. } => "not_found",
                    _ => "conflict",
                };
                (kind, e.to_string(), vec![])
            }
            AppError::Integrity(msg) => {
                tracing::error!("Integrity fault: {}", msg);
                ("integrity", "Data integrity fault".to_string(), vec![])
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                ("internal", "Database error".to_string(), vec![])
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ("internal", "Internal error".to_string(), vec![])
            }
        };

        (
            status,
            Json(ErrorBody {
                error_type,
                message,
                errors,
            }),
        )
            .into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_validation_display_lists_fields() {
        let err = AppError::Validation(vec![
            FieldIssue::new("nights", "must be positive"),
            FieldIssue::new("adults", "at least one adult is required"),
        ]);
        let text = err.to_string();
        assert!(text.contains("nights: must be positive"));
        assert!(text.contains("adults: at least one adult is required"));
    }

    #[test]
    fn test_status_mapping() {
        let date = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
        assert_eq!(
            AppError::not_found("booking", "abc").status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::invalid("nights", "bad").status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::from(AllotmentError::NoRoomsAvailable { date }).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::from(AllotmentError::NotFound { date }).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Integrity("gone".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
