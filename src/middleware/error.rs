use std::fmt;

use axum::{http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppError {
    Generic { description: String },
    EntityFailIdNotFound { ident: String },
    Serde { source: String },
    SurrealDb { source: String },
    BridgeInit { source: String },
    BridgeConnection { source: String },
    BridgeUnavailable,
    UserProvisioning { source: String },
    RoomCreation { source: String, transient: bool },
    DiscussionCreationFailed { attempts: u32 },
    UnknownDiscussion { ident: String },
}

pub type AppResult<T> = core::result::Result<T, AppError>;

impl std::error::Error for AppError {}

const INTERNAL: &str = "Internal error";

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generic { description } => write!(f, "{description}"),
            Self::EntityFailIdNotFound { ident } => write!(f, "Record id= {ident} not found"),
            Self::Serde { source } => write!(f, "Serde error - {source}"),
            Self::SurrealDb { .. } => write!(f, "{INTERNAL}"),
            Self::BridgeInit { source } => write!(f, "Chat bridge init failed - {source}"),
            Self::BridgeConnection { source } => {
                write!(f, "Chat bridge connection failed - {source}")
            }
            Self::BridgeUnavailable => write!(f, "Chat is currently unavailable, try again later"),
            Self::UserProvisioning { source } => {
                write!(f, "Chat account provisioning failed - {source}")
            }
            Self::RoomCreation { source, .. } => write!(f, "Chat room creation failed - {source}"),
            Self::DiscussionCreationFailed { .. } => {
                write!(f, "Chat is currently unavailable, try again later")
            }
            Self::UnknownDiscussion { ident } => write!(f, "No discussion for {ident}"),
        }
    }
}

impl AppError {
    /// Errors worth another attempt against the chat backend.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RoomCreation {
                transient: true,
                ..
            } | Self::BridgeConnection { .. }
        )
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponseBody {
    error: String,
    req_id: String,
}

impl ErrorResponseBody {
    pub fn new(error: String, req_id: Option<String>) -> Self {
        ErrorResponseBody {
            error,
            req_id: req_id.unwrap_or_else(|| Uuid::new_v4().to_string()),
        }
    }

    pub fn get_err(&self) -> String {
        self.error.clone()
    }
}

impl From<ErrorResponseBody> for String {
    fn from(value: ErrorResponseBody) -> Self {
        serde_json::to_string(&value).unwrap()
    }
}

// REST error response for the controller layer sitting on top of this crate
impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status_code = match self {
            AppError::EntityFailIdNotFound { .. } | AppError::UnknownDiscussion { .. } => {
                StatusCode::NOT_FOUND
            }
            AppError::BridgeUnavailable
            | AppError::BridgeInit { .. }
            | AppError::BridgeConnection { .. }
            | AppError::DiscussionCreationFailed { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Generic { .. } | AppError::Serde { .. } => StatusCode::BAD_REQUEST,
            AppError::UserProvisioning { .. }
            | AppError::RoomCreation { .. }
            | AppError::SurrealDb { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body: String = ErrorResponseBody::new(self.to_string(), None).into();
        let mut response = (status_code, body).into_response();
        // Insert the real Error into the response - for the logger
        response.extensions_mut().insert(self);
        response
    }
}

// External Errors
impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serde {
            source: value.to_string(),
        }
    }
}

impl From<surrealdb::Error> for AppError {
    fn from(value: surrealdb::Error) -> Self {
        Self::SurrealDb {
            source: value.to_string(),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(value: reqwest::Error) -> Self {
        Self::BridgeConnection {
            source: value.to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(value: validator::ValidationErrors) -> Self {
        Self::Generic {
            description: value.to_string(),
        }
    }
}
