use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Data error: {0}")]
    DataError(#[from] DataError),

    #[error("Response format error: {0}")]
    ResponseError(#[from] ResponseError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Missing configuration: {0}")]
    MissingConfig(String),
}

#[derive(Debug, Error)]
pub enum DataError {
    #[error("Missing required field '{field}'")]
    MissingField { field: String },

    #[error("Invalid type for field '{field}': expected {expected}")]
    InvalidType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("Failed to parse {entity}: {reason}")]
    ParseError {
        entity: &'static str,
        reason: String,
    },

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
}

impl DataError {
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    pub fn invalid_type(field: &'static str, expected: &'static str) -> Self {
        Self::InvalidType { field, expected }
    }

    pub fn parse_error(entity: &'static str, reason: impl Into<String>) -> Self {
        Self::ParseError {
            entity,
            reason: reason.into(),
        }
    }

    pub fn invalid_value(field: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            value: value.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("Unexpected response structure: {0}")]
    UnexpectedStructure(String),

    #[error("Empty response when data was expected")]
    EmptyResponse,

    #[error("Invalid response: {0}")]
    Invalid(String),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: StatusCode, body: String },
}

impl ResponseError {
    pub fn unexpected_structure(description: impl Into<String>) -> Self {
        Self::UnexpectedStructure(description.into())
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid(reason.into())
    }

    pub fn http_status(status: StatusCode, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }
}
