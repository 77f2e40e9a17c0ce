//! APIエラー（HTTPステータスとJSON本文への変換）

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use sheet_combiner_common::{Error as CommonError, ProcessReport};

const INTERNAL_MESSAGE: &str = "an error occurred while processing the files";

/// エラー応答本文
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ProcessReport>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    /// 該当シートなし（診断用にレポートを返す）
    #[error("Not found: {message}")]
    NotFound {
        message: String,
        report: ProcessReport,
    },
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                ErrorBody { error: message, report: None },
            ),
            ApiError::Forbidden(message) => (
                StatusCode::FORBIDDEN,
                ErrorBody { error: message, report: None },
            ),
            ApiError::NotFound { message, report } => (
                StatusCode::NOT_FOUND,
                ErrorBody { error: message, report: Some(report) },
            ),
            ApiError::Internal(detail) => {
                tracing::error!(detail = %detail, "failed to process upload");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody { error: INTERNAL_MESSAGE.to_string(), report: None },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<CommonError> for ApiError {
    fn from(err: CommonError) -> Self {
        match err {
            CommonError::NoFiles => ApiError::BadRequest(err.to_string()),
            CommonError::CombinedModeDisabled => ApiError::Forbidden(err.to_string()),
            CommonError::NoMatches { pattern, report } => ApiError::NotFound {
                message: CommonError::NoMatches {
                    pattern,
                    report: ProcessReport::default(),
                }
                .to_string(),
                report,
            },
            other => ApiError::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use sheet_combiner_common::MatchResult;

    async fn body_json(response: Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_no_files_returns_400() {
        let response = ApiError::from(CommonError::NoFiles).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "no files were uploaded");
        assert!(json.get("report").is_none());
    }

    #[tokio::test]
    async fn test_combined_disabled_returns_403() {
        let response = ApiError::from(CommonError::CombinedModeDisabled).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_no_matches_returns_404_with_report() {
        let mut report = ProcessReport::default();
        report.push(
            "a.xlsx",
            &MatchResult::NotFound {
                available_sheets: vec!["Data".into()],
                reason: "no sheet contains \"zzz\"".into(),
            },
        );
        let err = CommonError::NoMatches { pattern: "zzz".into(), report };

        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["error"], "no sheet with \"zzz\" in its name was found");
        assert_eq!(json["report"][0]["fileName"], "a.xlsx");
        assert_eq!(json["report"][0]["availableSheets"][0], "Data");
    }

    #[tokio::test]
    async fn test_internal_hides_details() {
        let response = ApiError::from(CommonError::Excel("disk full".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"], INTERNAL_MESSAGE);
    }
}
