use crate::error::AppError;

/// 列表页状态：数据、加载标记与可关闭的错误横幅。
#[derive(Debug, Clone, PartialEq)]
pub struct ListState<T> {
    pub items: Vec<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: true,
            error: None,
        }
    }
}

impl<T> ListState<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 应用一次加载结果：成功替换数据并清空错误，失败保留旧数据。
    pub fn apply(&mut self, result: Result<Vec<T>, AppError>) {
        self.loading = false;
        match result {
            Ok(items) => {
                self.items = items;
                self.error = None;
            }
            Err(err) => self.fail(err.to_string()),
        }
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("⚠️ {}", message);
        self.error = Some(message);
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_reload_keeps_previous_items() {
        let mut state = ListState::new();
        assert!(state.loading);

        state.apply(Ok(vec![1, 2]));
        assert!(!state.loading);

        state.apply(Err(AppError::Network("connection refused".to_string())));
        assert_eq!(state.items, vec![1, 2]);
        assert!(state.error.is_some());

        state.dismiss_error();
        assert!(state.error.is_none());
    }
}
