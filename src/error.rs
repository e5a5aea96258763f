//! Error types shared by the content client, page assembly and server

use axum::http::StatusCode;
use thiserror::Error;

/// Failures talking to, or interpreting answers from, the content API
#[derive(Error, Debug)]
pub enum ContentError {
    #[error("Request to content API failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Content API returned {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Content API exposes no master ref")]
    NoMasterRef,

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Cursor does not belong to the content API: {0}")]
    InvalidCursor(String),

    #[error("Document {id} is missing field `{field}`")]
    MissingField { id: String, field: &'static str },

    #[error("Invalid timestamp: {0}")]
    InvalidDate(String),
}

/// Failures while assembling and rendering a page
#[derive(Error, Debug)]
pub enum PageError {
    #[error(transparent)]
    Content(#[from] ContentError),

    #[error("Template error: {0}")]
    Render(#[from] tera::Error),
}

impl PageError {
    /// HTTP status a server should answer with for this failure
    pub fn status_code(&self) -> StatusCode {
        match self {
            PageError::Content(ContentError::NotFound(_)) => StatusCode::NOT_FOUND,
            PageError::Content(ContentError::InvalidCursor(_)) => StatusCode::BAD_REQUEST,
            PageError::Content(_) => StatusCode::BAD_GATEWAY,
            PageError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PageError::Content(ContentError::NotFound(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let err = PageError::from(ContentError::NotFound("missing".to_string()));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert!(err.is_not_found());

        let err = PageError::from(ContentError::InvalidCursor("ftp://x".to_string()));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err = PageError::from(ContentError::NoMasterRef);
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);

        let err = PageError::from(tera::Error::msg("unknown variable"));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_display() {
        let err = ContentError::MissingField {
            id: "YF1".to_string(),
            field: "uid",
        };
        assert_eq!(err.to_string(), "Document YF1 is missing field `uid`");
    }
}
