use crate::auth::AuthSession;
use crate::nav::routes;

const DEFAULT_EMAIL: &str = "admin@example.com";
const DEFAULT_PASSWORD: &str = "admin123";
const LOGIN_FAILED: &str = "Login failed";

/// 登录表单。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInView {
    pub email: String,
    pub password: String,
    pub show_password: bool,
    pub loading: bool,
    pub error: Option<String>,
}

impl Default for SignInView {
    fn default() -> Self {
        Self {
            email: DEFAULT_EMAIL.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
            show_password: false,
            loading: false,
            error: None,
        }
    }
}

impl SignInView {
    pub fn new() -> Self {
        Self::default()
    }

    /// 邮箱和密码都填写且不在提交中。
    pub fn can_submit(&self) -> bool {
        !self.loading && !self.email.trim().is_empty() && !self.password.is_empty()
    }

    /// 登录。成功返回要跳转的路径，失败时错误文本写入表单。
    pub async fn submit(&mut self, session: &mut AuthSession) -> Option<&'static str> {
        if !self.can_submit() {
            return None;
        }
        self.loading = true;
        self.error = None;

        let result = session.login(&self.email, &self.password).await.map(|_| ());
        self.loading = false;

        match result {
            Ok(()) => Some(routes::DASHBOARD),
            Err(err) => {
                let message = err.to_string();
                log::warn!("⚠️ 登录失败: {}", message);
                self.error = Some(if message.is_empty() {
                    LOGIN_FAILED.to_string()
                } else {
                    message
                });
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_prefilled() {
        let view = SignInView::new();
        assert_eq!(view.email, "admin@example.com");
        assert_eq!(view.password, "admin123");
        assert!(view.can_submit());
    }

    #[test]
    fn empty_fields_disable_submit() {
        let mut view = SignInView::new();
        view.password.clear();
        assert!(!view.can_submit());

        view.password = "secret".to_string();
        view.email = "  ".to_string();
        assert!(!view.can_submit());
    }
}
