//! 客户端配置
//!
//! CSR 应用没有运行时环境变量，配置在编译期通过 `option_env!` 注入，
//! 未设置时使用默认值。

/// 记账应用后端的默认前缀
const DEFAULT_API_BASE: &str = "/midas-api";
/// 管理后台后端的默认前缀
const DEFAULT_ADMIN_API_BASE: &str = "/api";
/// 管理后台页面挂载的 History base
const DEFAULT_ADMIN_BASE_PATH: &str = "/adminpanel";

/// 客户端配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientConfig {
    /// 后端 API 前缀
    pub api_base: &'static str,
    /// History API 的 base path（空字符串表示根路径）
    pub base_path: &'static str,
}

impl ClientConfig {
    /// 记账应用配置 (`MIDAS_API_BASE`)
    pub fn tracker() -> Self {
        Self {
            api_base: option_env!("MIDAS_API_BASE").unwrap_or(DEFAULT_API_BASE),
            base_path: "",
        }
    }

    /// 管理后台配置 (`MIDAS_ADMIN_API_BASE`, `MIDAS_ADMIN_BASE_PATH`)
    pub fn admin() -> Self {
        Self {
            api_base: option_env!("MIDAS_ADMIN_API_BASE").unwrap_or(DEFAULT_ADMIN_API_BASE),
            base_path: option_env!("MIDAS_ADMIN_BASE_PATH").unwrap_or(DEFAULT_ADMIN_BASE_PATH),
        }
    }
}
