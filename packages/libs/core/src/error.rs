//! 공통 에러 타입
//!
//! Quill 전체(빌더, Query, Executor)에서 사용되는 에러 타입을 정의합니다.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// 외부 협력자(커넥션 드라이버 등)가 돌려준 원본 에러
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Quill 공통 에러
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────────
    // Binding Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("type mismatch for {type_name}: {message}")]
    TypeMismatch { type_name: String, message: String },

    #[error("unknown type: {name}")]
    UnknownType { name: String },

    #[error("unknown operator: {operator}")]
    UnknownOperator { operator: String },

    // ─────────────────────────────────────────────────────────────────────────────
    // Builder Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("configuration error: {message}")]
    Configuration { message: String },

    #[error("update on '{table}' has no assignments")]
    EmptyAssignment { table: String },

    #[error("malformed template: {message}")]
    MalformedTemplate { message: String },

    // ─────────────────────────────────────────────────────────────────────────────
    // Connection Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    // ─────────────────────────────────────────────────────────────────────────────
    // Serialization Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn type_mismatch(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Error::TypeMismatch {
            type_name: type_name.into(),
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    /// 드라이버 에러를 그대로 source로 보존하는 커넥션 에러
    pub fn connection<E>(message: impl Into<String>, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        Error::Connection {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// 빌더 결함 여부
    ///
    /// 사용자 입력이나 커넥션 문제가 아닌, 호출 코드의 버그를 의미합니다.
    /// 재시도해도 결과가 바뀌지 않습니다.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::Configuration { .. }
                | Error::UnknownType { .. }
                | Error::EmptyAssignment { .. }
                | Error::MalformedTemplate { .. }
        )
    }

    /// 에러 코드 (클라이언트용)
    pub fn code(&self) -> &'static str {
        match self {
            Error::TypeMismatch { .. } => "TYPE_MISMATCH",
            Error::UnknownType { .. } => "UNKNOWN_TYPE",
            Error::UnknownOperator { .. } => "UNKNOWN_OPERATOR",
            Error::Configuration { .. } => "CONFIGURATION_ERROR",
            Error::EmptyAssignment { .. } => "EMPTY_ASSIGNMENT",
            Error::MalformedTemplate { .. } => "MALFORMED_TEMPLATE",
            Error::Connection { .. } => "CONNECTION_ERROR",
            Error::Json(_) => "JSON_ERROR",
        }
    }
}
