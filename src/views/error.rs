use rocket::http::Status;
use rocket::request::Request;
use rocket::response::{self, Responder};
use thiserror::Error;

/// Failures a blog view can end in.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ViewError {
    /// A view or the configuration it relies on is incomplete. Never
    /// recoverable at request time.
    #[error("Improperly configured: {0}")]
    ImproperlyConfigured(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A lookup that must resolve to exactly one object found several.
    #[error("Multiple objects returned: {0}")]
    MultipleFound(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl ViewError {
    pub fn status(&self) -> Status {
        match self {
            ViewError::NotFound(_) => Status::NotFound,
            _ => Status::InternalServerError,
        }
    }
}

impl From<String> for ViewError {
    fn from(e: String) -> Self {
        ViewError::Database(e)
    }
}

impl<'r> Responder<'r, 'static> for ViewError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        match self {
            ViewError::NotFound(ref msg) => log::debug!("{} {}: {}", req.method(), req.uri(), msg),
            ref e => log::error!("{} {}: {}", req.method(), req.uri(), e),
        }
        Err(self.status())
    }
}
