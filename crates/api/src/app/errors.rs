use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use bitacora_infra::StoreError;

/// Resource a handler operates on; selects the user-facing messages.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Resource {
    Author,
    Post,
}

impl Resource {
    pub fn not_found_message(self) -> &'static str {
        match self {
            Resource::Author => "Autor no encontrado",
            Resource::Post => "Publicación no encontrada",
        }
    }

    pub fn deleted_message(self) -> &'static str {
        match self {
            Resource::Author => "Autor eliminado correctamente",
            Resource::Post => "Publicación eliminada correctamente",
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Resource::Author => "author",
            Resource::Post => "post",
        }
    }
}

pub const INTERNAL_ERROR_MESSAGE: &str = "Error interno del servidor";

pub fn json_error(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (status, axum::Json(json!({ "error": message.into() }))).into_response()
}

pub fn not_found(resource: Resource) -> axum::response::Response {
    json_error(StatusCode::NOT_FOUND, resource.not_found_message())
}

/// A row vanishing between lookup and write is reported like any other miss.
pub fn store_error_to_response(err: StoreError, resource: Resource) -> axum::response::Response {
    match err {
        StoreError::RecordMissing => not_found(resource),
        StoreError::Backend(cause) => {
            tracing::error!(resource = resource.as_str(), %cause, "store operation failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
        }
    }
}

/// Malformed JSON, wrong content type, and missing or mistyped fields all map to 400.
pub fn json_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, rejection.body_text())
}
