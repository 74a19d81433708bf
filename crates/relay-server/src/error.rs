use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use relay_sync::SyncError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("store error: {0}")]
    Store(#[from] relay_store::StoreError),

    #[error("resolver error: {0}")]
    Resolver(#[from] relay_resolver::ResolverError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Sync(SyncError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Sync(SyncError::InvalidLink { .. }) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "request rejected");
        }
        // Status only; the detail goes to the log.
        status.into_response()
    }
}

pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let err = ServerError::from(SyncError::NotFound("history h".into()));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn invalid_link_maps_to_400() {
        let source = relay_types::Link::parse("zz").unwrap_err();
        let err = ServerError::from(SyncError::InvalidLink {
            input: "zz".into(),
            source,
        });
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn malformed_bundle_maps_to_500() {
        let err = ServerError::from(SyncError::MalformedBundle(
            relay_graph::GraphError::MissingRoot,
        ));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn invalid_history_id_maps_to_500() {
        let source = relay_resolver::validate_history_id("").unwrap_err();
        let err = ServerError::from(SyncError::InvalidHistoryId(source));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
