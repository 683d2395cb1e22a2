//! Router Error Types
//!
//! 라우터 에러 정의

use std::io;
use thiserror::Error;

// ============================================================================
// RouterError - 라우터 에러
// ============================================================================

/// 라우터 에러
///
/// 라우팅 자체는 실패하지 않는다. 여기에 담기는 에러는 선택된 물리
/// 연결이 반환한 것이며, 포장 없이 호출자에게 그대로 전달된다.
#[derive(Error, Debug)]
pub enum RouterError {
    /// 설정 에러
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// 닫힌 핸들 에러
    #[error("Closed: {0}")]
    Closed(String),

    /// 연결 에러
    #[error("Connection error: {0}")]
    Connection(String),

    /// 쿼리 에러
    #[error("Query error: {code} - {message}")]
    Query {
        /// 에러 코드
        code: String,
        /// 에러 메시지
        message: String,
    },

    /// 타임아웃 에러
    #[error("Timeout: {0}")]
    Timeout(String),

    /// 취소됨
    #[error("Canceled: {0}")]
    Canceled(String),

    /// 서버 에러
    #[error("Server error: {code} - {message}")]
    Server {
        /// 에러 코드
        code: String,
        /// 에러 메시지
        message: String,
    },

    /// I/O 에러
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// 내부 에러
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RouterError {
    /// 설정 에러 생성
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// 닫힌 핸들 에러 생성
    pub fn closed(msg: impl Into<String>) -> Self {
        Self::Closed(msg.into())
    }

    /// 연결 에러 생성
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// 쿼리 에러 생성
    pub fn query(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Query {
            code: code.into(),
            message: message.into(),
        }
    }

    /// 타임아웃 에러 생성
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// 취소 에러 생성
    pub fn canceled(msg: impl Into<String>) -> Self {
        Self::Canceled(msg.into())
    }

    /// 서버 에러 생성
    pub fn server(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Server {
            code: code.into(),
            message: message.into(),
        }
    }

    /// 내부 에러 생성
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// 재시도 가능 여부
    ///
    /// 분류만 제공한다. 재시도 자체는 이 계층이 아니라 호출자 또는
    /// 물리 연결의 정책에 속한다.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Timeout(_))
    }

    /// 클라이언트 에러 여부
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_) | Self::Closed(_) | Self::Query { .. }
        )
    }
}

// ============================================================================
// Result Type
// ============================================================================

/// 라우터 결과 타입
pub type RouterResult<T> = Result<T, RouterError>;

// ============================================================================
// Tests
// ============================================================================
