//! 管理后台路由表

use crate::web::{GuardedRoute, RouteAccess};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminRoute {
    Login,
    Dashboard,
    Users,
    NotFound,
}

impl GuardedRoute for AdminRoute {
    fn from_path(path: &str) -> Self {
        match path.trim_end_matches('/') {
            "/login" => AdminRoute::Login,
            // 根路径指向仪表盘
            "" | "/dashboard" => AdminRoute::Dashboard,
            "/users" => AdminRoute::Users,
            _ => AdminRoute::NotFound,
        }
    }

    fn to_path(&self) -> String {
        match self {
            AdminRoute::Login => "/login",
            AdminRoute::Dashboard => "/dashboard",
            AdminRoute::Users => "/users",
            AdminRoute::NotFound => "/404",
        }
        .to_string()
    }

    fn access(&self) -> RouteAccess {
        match self {
            AdminRoute::Login => RouteAccess::Guest,
            _ => RouteAccess::Protected,
        }
    }

    fn login() -> Self {
        AdminRoute::Login
    }

    fn landing() -> Self {
        AdminRoute::Dashboard
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::route::{GuardDecision, guard};

    #[test]
    fn test_paths() {
        assert_eq!(AdminRoute::from_path("/"), AdminRoute::Dashboard);
        assert_eq!(AdminRoute::from_path("/dashboard"), AdminRoute::Dashboard);
        assert_eq!(AdminRoute::from_path("/users/"), AdminRoute::Users);
        assert_eq!(AdminRoute::from_path("/login"), AdminRoute::Login);
        assert_eq!(AdminRoute::from_path("/reports"), AdminRoute::NotFound);
    }

    #[test]
    fn test_guard_redirects() {
        assert_eq!(
            guard(&AdminRoute::Users, false),
            GuardDecision::Redirect(AdminRoute::Login)
        );
        assert_eq!(
            guard(&AdminRoute::Login, true),
            GuardDecision::Redirect(AdminRoute::Dashboard)
        );
        // 未知路由同样需要登录
        assert_eq!(
            guard(&AdminRoute::NotFound, false),
            GuardDecision::Redirect(AdminRoute::Login)
        );
        assert_eq!(guard(&AdminRoute::Dashboard, true), GuardDecision::Allow);
    }

    #[test]
    fn test_redirect_targets_round_trip() {
        assert_eq!(AdminRoute::from_path(&AdminRoute::login().to_path()), AdminRoute::Login);
        assert_eq!(
            AdminRoute::from_path(&AdminRoute::landing().to_path()),
            AdminRoute::Dashboard
        );
    }
}
