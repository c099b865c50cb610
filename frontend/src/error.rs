//! 错误类型
//!
//! 分三层：
//! - `HttpError`: 传输层（请求构建、网络、响应读取）
//! - `ApiError`: 接口层（状态码、编解码）
//! - `AuthError`: 认证流程，直接暴露给调用方，不自动重试

use thiserror::Error;

/// HTTP 传输错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HttpError {
    #[error("failed to build request: {0}")]
    RequestBuildFailed(String),
    #[error("network error: {0}")]
    NetworkError(String),
    #[error("failed to read response: {0}")]
    ResponseReadFailed(String),
}

/// 接口调用错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error(transparent)]
    Transport(#[from] HttpError),
    /// 非 2xx 响应，`message` 优先取后端的 `detail` 字段
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("failed to encode request: {0}")]
    Encode(String),
    #[error("failed to decode response: {0}")]
    Decode(String),
    /// 需要 Token 的接口在未登录时调用
    #[error("no access token")]
    MissingToken,
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }
}

/// 认证错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("not authenticated")]
    NotAuthenticated,
    /// 宿主环境（Telegram）提供的 init data 被后端拒绝或交换失败
    #[error("host authentication failed: {0}")]
    HostRejected(String),
    #[error("network failure during authentication: {0}")]
    Network(String),
    #[error(transparent)]
    Api(ApiError),
}

impl AuthError {
    /// 登录接口的错误映射：凭据类状态码统一视为凭据错误
    pub fn from_login(err: ApiError) -> Self {
        match err.status() {
            Some(400 | 401 | 403 | 422) => AuthError::InvalidCredentials,
            _ => err.into(),
        }
    }
}

impl From<ApiError> for AuthError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Transport(e) => AuthError::Network(e.to_string()),
            ApiError::MissingToken => AuthError::NotAuthenticated,
            other => AuthError::Api(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_status_mapping() {
        let bad = ApiError::Status {
            status: 401,
            message: "Incorrect email or password".into(),
        };
        assert_eq!(AuthError::from_login(bad), AuthError::InvalidCredentials);

        let server = ApiError::Status {
            status: 500,
            message: "boom".into(),
        };
        assert!(matches!(
            AuthError::from_login(server),
            AuthError::Api(ApiError::Status { status: 500, .. })
        ));
    }

    #[test]
    fn test_transport_becomes_network() {
        let err: AuthError = ApiError::from(HttpError::NetworkError("offline".into())).into();
        assert_eq!(
            err,
            AuthError::Network("network error: offline".to_string())
        );
    }

    #[test]
    fn test_missing_token_means_not_authenticated() {
        assert_eq!(
            AuthError::from(ApiError::MissingToken),
            AuthError::NotAuthenticated
        );
    }

    #[test]
    fn test_status_display() {
        let err = ApiError::Status {
            status: 404,
            message: "User not found".into(),
        };
        assert_eq!(err.to_string(), "HTTP 404: User not found");
        assert!(!err.is_unauthorized());
    }
}
