use std::convert::Infallible;

use log::error;
use serde_json::json;
use warp::http::StatusCode;
use warp::{Rejection, Reply};

use stockfolio_core::errors::CoreError;

/// Wrapper carrying a `CoreError` through warp's rejection machinery.
#[derive(Debug)]
pub struct ApiError(pub CoreError);

impl warp::reject::Reject for ApiError {}

/// Shorthand for handlers: core error → warp rejection.
pub fn reject(err: CoreError) -> Rejection {
    warp::reject::custom(ApiError(err))
}

/// Map rejections to the transport contract: validation → 400, not-found →
/// 404, unauthorized → 401, everything else → 500. Bodies are a stable JSON
/// envelope: `{"error": <message>, "kind": <kind>}`.
pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, kind, message) = if err.is_not_found() {
        (
            StatusCode::NOT_FOUND,
            "not_found",
            "Resource not found".to_string(),
        )
    } else if let Some(ApiError(core)) = err.find::<ApiError>() {
        match core {
            CoreError::Validation(_) => (StatusCode::BAD_REQUEST, "validation", core.to_string()),
            CoreError::HoldingNotFound(_) => {
                (StatusCode::NOT_FOUND, "not_found", core.to_string())
            }
            CoreError::Unauthorized(_) => {
                (StatusCode::UNAUTHORIZED, "unauthorized", core.to_string())
            }
            _ => {
                error!("internal error: {core}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "Internal server error".to_string(),
                )
            }
        }
    } else if err
        .find::<warp::filters::body::BodyDeserializeError>()
        .is_some()
    {
        (
            StatusCode::BAD_REQUEST,
            "validation",
            "Malformed request body".to_string(),
        )
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            "method_not_allowed",
            "Method not allowed".to_string(),
        )
    } else {
        error!("unhandled rejection: {err:?}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal",
            "Internal server error".to_string(),
        )
    };

    let body = warp::reply::json(&json!({ "error": message, "kind": kind }));
    Ok(warp::reply::with_status(body, status))
}
