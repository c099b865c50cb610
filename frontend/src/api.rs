use crate::error::ApiError;
use crate::web::{HttpClient, HttpRequest};
use midas_shared::protocol::ApiRequest;
use tracing::debug;

/// 类型化的后端客户端
///
/// 请求的路径、方法与响应类型都由 `ApiRequest` 决定，
/// Token 由调用方显式传入（会话存储是 Token 的唯一持有者）。
#[derive(Clone, Debug, PartialEq)]
pub struct ApiClient<H> {
    http: H,
    base_url: String,
}

impl<H: HttpClient> ApiClient<H> {
    pub fn new(http: H, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// 发送请求并解析响应
    pub async fn call<R: ApiRequest>(
        &self,
        request: &R,
        token: Option<&str>,
    ) -> Result<R::Response, ApiError> {
        let url = self.url(&request.path());
        let mut req = HttpRequest::new(url, R::METHOD).with_header("Accept", "application/json");

        if let Some(token) = token {
            req = req.with_bearer(token);
        }

        if R::METHOD.has_body() {
            let body =
                serde_json::to_string(request).map_err(|e| ApiError::Encode(e.to_string()))?;
            req = req.with_json_body(body);
        }

        debug!(method = R::METHOD.as_str(), url = %req.url, "api request");
        let res = self.http.send(req).await?;

        if !res.ok() {
            let message = error_detail(&res.body).unwrap_or_else(|| default_reason(res.status));
            return Err(ApiError::Status {
                status: res.status,
                message,
            });
        }

        serde_json::from_str(&res.body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// 必须携带 Token 的调用，没有 Token 时不发请求
    pub async fn call_authorized<R: ApiRequest>(
        &self,
        request: &R,
        token: Option<&str>,
    ) -> Result<R::Response, ApiError> {
        let token = token.ok_or(ApiError::MissingToken)?;
        self.call(request, Some(token)).await
    }
}

/// 提取后端错误体中的 `detail`
///
/// `detail` 可能是字符串，也可能是校验错误数组（取每项的 `msg`）。
fn error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Array(items) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .collect();
            if msgs.is_empty() {
                None
            } else {
                Some(msgs.join("; "))
            }
        }
        _ => None,
    }
}

fn default_reason(status: u16) -> String {
    match status {
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        422 => "Unprocessable Entity",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "Request failed",
    }
    .to_string()
}
