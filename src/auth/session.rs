//! # 登录态状态机
//!
//! ## 设计思路
//!
//! 状态只有三种：`Loading → {Authenticated, Unauthenticated}`。
//! 启动时 `bootstrap()` 一定会离开 `Loading`：
//! - 没有已保存令牌 → `Unauthenticated`
//! - 令牌经后端校验通过 → `Authenticated`
//! - 校验失败 → 清除令牌并进入 `Unauthenticated`
//!
//! ## 实现思路
//!
//! 用户身份优先从 JWT 载荷（`email` / `role` / `sub`）解析；令牌不是可解析的 JWT 时
//! 使用占位管理员身份。用户名取邮箱 `@` 之前的部分。

use base64::{Engine as _, engine::general_purpose};
use serde::{Deserialize, Serialize};

use crate::api::{ApiClient, LoginCredentials, LoginResponse};
use crate::error::AppError;

const PLACEHOLDER_EMAIL: &str = "admin@example.com";
const PLACEHOLDER_ROLE: &str = "admin";

/// 当前登录用户。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: String,
}

#[derive(Debug, Deserialize)]
struct TokenClaims {
    #[serde(default)]
    sub: Option<serde_json::Value>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    role: Option<String>,
}

impl User {
    pub fn new(id: impl Into<String>, email: impl Into<String>, role: impl Into<String>) -> Self {
        let email = email.into();
        Self {
            id: id.into(),
            username: username_from_email(&email),
            email,
            role: role.into(),
        }
    }

    /// 登录响应不含用户 id，尝试从令牌的 `sub` 中补齐。
    pub fn from_login(response: &LoginResponse) -> Self {
        let id = decode_claims(&response.access_token)
            .and_then(|claims| claims.sub)
            .map(claim_to_string)
            .unwrap_or_default();
        Self::new(id, response.email.clone(), response.role.clone())
    }

    /// 从 JWT 载荷还原身份；缺少邮箱时返回 `None`。
    pub fn from_token(token: &str) -> Option<Self> {
        let claims = decode_claims(token)?;
        let email = claims.email.filter(|e| !e.is_empty())?;
        let id = claims.sub.map(claim_to_string).unwrap_or_default();
        let role = claims.role.unwrap_or_else(|| PLACEHOLDER_ROLE.to_string());
        Some(Self::new(id, email, role))
    }

    pub fn placeholder() -> Self {
        Self::new("", PLACEHOLDER_EMAIL, PLACEHOLDER_ROLE)
    }
}

fn username_from_email(email: &str) -> String {
    email.split('@').next().unwrap_or_default().to_string()
}

fn claim_to_string(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text,
        other => other.to_string(),
    }
}

fn decode_claims(token: &str) -> Option<TokenClaims> {
    let mut segments = token.split('.');
    let (_header, payload, _signature) = (segments.next()?, segments.next()?, segments.next()?);
    if segments.next().is_some() {
        return None;
    }

    let bytes = general_purpose::URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// 登录态。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Loading,
    Authenticated(User),
    Unauthenticated,
}

impl AuthState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Self::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

/// 登录会话：持有 API 客户端（以及其中的令牌槽位）与当前登录态。
#[derive(Debug)]
pub struct AuthSession {
    api: ApiClient,
    state: AuthState,
}

impl AuthSession {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            state: AuthState::Loading,
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn user(&self) -> Option<&User> {
        self.state.user()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated()
    }

    /// 启动检查：校验已保存的令牌并确定登录态。
    pub async fn bootstrap(&mut self) -> &AuthState {
        let Some(token) = self.api.credentials().token() else {
            log::info!("🔓 未找到已保存的令牌");
            self.state = AuthState::Unauthenticated;
            return &self.state;
        };

        match self.api.verify_token().await {
            Ok(()) => {
                let user = User::from_token(&token).unwrap_or_else(User::placeholder);
                log::info!("✅ 令牌校验通过 - {}", user.email);
                self.state = AuthState::Authenticated(user);
            }
            Err(err) => {
                log::warn!("⚠️ 令牌校验失败，已清除本地令牌: {}", err);
                if let Err(clear_err) = self.api.credentials().clear() {
                    log::error!("❌ 清除令牌失败: {}", clear_err);
                }
                self.state = AuthState::Unauthenticated;
            }
        }

        &self.state
    }

    /// 登录。失败时登录态保持未登录，错误原样返回给登录表单。
    pub async fn login(&mut self, email: &str, password: &str) -> Result<&User, AppError> {
        let credentials = LoginCredentials {
            email: email.trim().to_string(),
            password: password.to_string(),
        };

        match self.api.login(&credentials).await {
            Ok(response) => {
                self.state = AuthState::Authenticated(User::from_login(&response));
                self.state
                    .user()
                    .ok_or_else(|| AppError::Validation("登录状态异常".to_string()))
            }
            Err(err) => {
                if self.state.is_loading() {
                    self.state = AuthState::Unauthenticated;
                }
                Err(err)
            }
        }
    }

    /// 登出：清除令牌，登录态立即变为未登录。
    pub fn logout(&mut self) -> Result<(), AppError> {
        self.state = AuthState::Unauthenticated;
        log::info!("👋 已登出");
        self.api.logout()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt(payload: &str) -> String {
        format!(
            "{}.{}.signature",
            general_purpose::URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
            general_purpose::URL_SAFE_NO_PAD.encode(payload)
        )
    }

    #[test]
    fn user_from_token_reads_claims() {
        let token = jwt(r#"{"sub":42,"email":"ops@shop.io","role":"manager"}"#);
        let user = User::from_token(&token).expect("user");

        assert_eq!(user.id, "42");
        assert_eq!(user.username, "ops");
        assert_eq!(user.email, "ops@shop.io");
        assert_eq!(user.role, "manager");
    }

    #[test]
    fn opaque_token_has_no_identity() {
        assert!(User::from_token("opaque-token").is_none());
        assert!(User::from_token("a.b.c.d").is_none());
        assert!(User::from_token(&jwt(r#"{"sub":"1"}"#)).is_none());
    }

    #[test]
    fn login_user_takes_id_from_token_subject() {
        let response = LoginResponse {
            access_token: jwt(r#"{"sub":"u-7","email":"a@b.c"}"#),
            email: "admin@shop.io".to_string(),
            role: "admin".to_string(),
        };

        let user = User::from_login(&response);
        assert_eq!(user.id, "u-7");
        assert_eq!(user.username, "admin");
        assert_eq!(user.email, "admin@shop.io");
    }

    #[test]
    fn placeholder_identity() {
        let user = User::placeholder();
        assert_eq!(user.username, "admin");
        assert_eq!(user.role, "admin");
    }
}
