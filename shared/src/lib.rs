use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub mod date;
pub mod protocol;

// =========================================================
// 常量定义 (Constants)
// =========================================================

pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const BEARER_PREFIX: &str = "Bearer ";

/// 持久化存储键
///
/// 每个键独立读写，没有版本号。
pub mod storage_keys {
    pub const ADMIN_TOKEN: &str = "admin_token";
    pub const ADMIN_USER: &str = "admin_user";
    pub const ACCESS_TOKEN: &str = "access_token";
    pub const LOCALE: &str = "locale";
    pub const THEME: &str = "theme";
    pub const TIMER: &str = "timer";
}

// =========================================================
// 认证模型 (Auth)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// 记账应用的手机号登录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoneLoginRequest {
    pub phone_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// 管理后台的管理员资料
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminProfile {
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub is_super_admin: bool,
}

/// 记账应用的用户资料
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub telegram_id: Option<i64>,
    #[serde(default)]
    pub phone_number: Option<String>,
    pub name: String,
    #[serde(default)]
    pub default_currency: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub is_premium: bool,
    #[serde(default)]
    pub subscription_type: Option<String>,
    #[serde(default)]
    pub subscription_ends_at: Option<String>,
    #[serde(default)]
    pub is_trial_used: bool,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub voice_usage_count: Option<u32>,
    #[serde(default)]
    pub photo_usage_count: Option<u32>,
}

// =========================================================
// Telegram Mini-App
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelegramAuthRequest {
    pub init_data: String,
}

/// `initDataUnsafe.user`：仅用于展示，不可作为认证依据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelegramUser {
    pub id: i64,
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub language_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelegramAuthUser {
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelegramAuthResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub user: Option<TelegramAuthUser>,
}

// =========================================================
// 订阅模型 (Subscriptions)
// =========================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SubscriptionStatus {
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_premium: bool,
    #[serde(default)]
    pub subscription_type: Option<String>,
    #[serde(default)]
    pub subscription_ends_at: Option<String>,
    #[serde(default)]
    pub is_trial_used: bool,
    #[serde(default)]
    pub expires_at: Option<String>,
}

impl SubscriptionStatus {
    /// 订阅到期时间（毫秒时间戳），无法解析时返回 None
    pub fn ends_at(&self) -> Option<date::Timestamp> {
        self.subscription_ends_at
            .as_deref()
            .or(self.expires_at.as_deref())
            .and_then(date::parse_timestamp)
    }

    /// 是否还可以开通试用
    pub fn can_start_trial(&self) -> bool {
        !self.is_trial_used && !self.is_premium
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialActivation {
    pub message: String,
    #[serde(default)]
    pub ends_at: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingPeriod {
    #[default]
    Month,
    Quarter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Payme,
    Click,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentLinkRequest {
    pub plan_id: String,
    pub period: BillingPeriod,
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentLink {
    pub url: String,
    #[serde(default)]
    pub click_trans_id: Option<String>,
    pub amount: f64,
}

// =========================================================
// 管理后台模型 (Admin)
// =========================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(default)]
    pub total_users: u64,
    #[serde(default)]
    pub active_subscriptions: u64,
    #[serde(default)]
    pub new_users_this_month: u64,
    /// 订阅类型 -> 人数（null 类型以 "none" 计）
    #[serde(default)]
    pub subscription_breakdown: BTreeMap<String, u64>,
}

/// 用户列表中的一行
///
/// 后端直接序列化 ORM 对象，字段可能缺失，因此全部宽松解析。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    #[serde(default)]
    pub telegram_id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub is_premium: bool,
    #[serde(default)]
    pub subscription_type: Option<String>,
    #[serde(default)]
    pub subscription_ends_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserPage {
    #[serde(default)]
    pub items: Vec<UserSummary>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub size: u32,
}

impl UserPage {
    /// 总页数（至少为 1）
    pub fn page_count(&self) -> u32 {
        if self.size == 0 {
            return 1;
        }
        let pages = self.total.div_ceil(self.size as u64);
        pages.max(1) as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionAction {
    Grant,
    Revoke,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusReply {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_tolerates_missing_fields() {
        let profile: AdminProfile = serde_json::from_str(r#"{"id":"1","name":"Admin"}"#).unwrap();
        assert_eq!(profile.id, "1");
        assert!(profile.email.is_empty());
        assert!(!profile.is_super_admin);
    }

    #[test]
    fn test_token_type_defaults_to_bearer() {
        let token: TokenResponse = serde_json::from_str(r#"{"access_token":"abc"}"#).unwrap();
        assert_eq!(token.access_token, "abc");
        assert_eq!(token.token_type, "bearer");
    }

    #[test]
    fn test_payment_request_wire_format() {
        let req = PaymentLinkRequest {
            plan_id: "monthly".into(),
            period: BillingPeriod::Quarter,
            payment_method: PaymentMethod::Click,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"plan_id": "monthly", "period": "quarter", "payment_method": "click"})
        );
    }

    #[test]
    fn test_trial_eligibility() {
        let mut status = SubscriptionStatus::default();
        assert!(status.can_start_trial());
        status.is_trial_used = true;
        assert!(!status.can_start_trial());
    }

    #[test]
    fn test_status_ends_at_falls_back_to_expires_at() {
        let status = SubscriptionStatus {
            expires_at: Some("1970-01-01T00:00:01Z".into()),
            ..Default::default()
        };
        assert_eq!(status.ends_at().map(|t| t.as_millis()), Some(1000));
    }

    #[test]
    fn test_page_count() {
        let page = UserPage {
            items: vec![],
            total: 21,
            page: 1,
            size: 10,
        };
        assert_eq!(page.page_count(), 3);
        assert_eq!(UserPage::default().page_count(), 1);
    }
}
