//! 进程内唯一的令牌槽位。
//!
//! `Credentials` 显式传递给 `ApiClient` 与 `AuthSession`，不使用全局单例。
//! 每次请求前读取；登录时整体覆盖，登出/校验失败时清空，内存与持久化同步更新。

use std::sync::{Arc, RwLock};

use super::token_store::{MemoryTokenStore, TokenStore};
use crate::error::AppError;

#[derive(Clone)]
pub struct Credentials {
    token: Arc<RwLock<Option<String>>>,
    store: Arc<dyn TokenStore>,
}

impl Credentials {
    /// 从持久化存储恢复令牌。
    pub fn load(store: Arc<dyn TokenStore>) -> Result<Self, AppError> {
        let token = store.load()?;
        Ok(Self {
            token: Arc::new(RwLock::new(token)),
            store,
        })
    }

    /// 仅存在于内存中的空槽位。
    pub fn in_memory() -> Self {
        Self {
            token: Arc::new(RwLock::new(None)),
            store: Arc::new(MemoryTokenStore::default()),
        }
    }

    pub fn token(&self) -> Option<String> {
        match self.token.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn has_token(&self) -> bool {
        self.token().is_some()
    }

    /// 覆盖令牌：先持久化，成功后再更新内存。
    pub fn set(&self, token: &str) -> Result<(), AppError> {
        self.store.save(token)?;
        let mut slot = self
            .token
            .write()
            .map_err(|_| AppError::Storage("令牌槽位锁已中毒".to_string()))?;
        *slot = Some(token.to_string());
        Ok(())
    }

    /// 清空令牌。内存总会被清空，持久化失败时返回错误。
    pub fn clear(&self) -> Result<(), AppError> {
        match self.token.write() {
            Ok(mut slot) => *slot = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
        self.store.clear()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("has_token", &self.has_token())
            .finish()
    }
}
