//! 路由守卫：只读取登录态，返回渲染/跳转决策，本身没有副作用。

use super::session::AuthState;
use crate::nav::routes;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    /// 登录态尚未确定，显示加载中。
    ShowLoading,
    Render,
    Redirect(&'static str),
}

/// 受保护页面：未登录跳转到登录页。
pub fn protected_route(state: &AuthState) -> GuardOutcome {
    match state {
        AuthState::Loading => GuardOutcome::ShowLoading,
        AuthState::Authenticated(_) => GuardOutcome::Render,
        AuthState::Unauthenticated => GuardOutcome::Redirect(routes::SIGN_IN),
    }
}

/// 登录页：已登录时跳回首页，其余情况正常渲染。
pub fn auth_redirect(state: &AuthState, current_path: &str) -> GuardOutcome {
    if state.is_authenticated() && current_path == routes::SIGN_IN {
        GuardOutcome::Redirect(routes::DASHBOARD)
    } else {
        GuardOutcome::Render
    }
}
