//! 令牌持久化。
//!
//! 令牌以 `{ "auth_token": "<token>" }` 的 JSON 文档存放在单一文件中，
//! 登录时整体覆盖，登出或校验失败时删除。

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// 固定存储键。
pub const TOKEN_STORAGE_KEY: &str = "auth_token";

/// 令牌持久化后端。
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<String>, AppError>;
    fn save(&self, token: &str) -> Result<(), AppError>;
    fn clear(&self) -> Result<(), AppError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct TokenDocument {
    #[serde(rename = "auth_token", default)]
    auth_token: Option<String>,
}

/// 基于 JSON 文件的令牌存储。
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, AppError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| AppError::Storage(format!("读取令牌文件失败: {}", e)))?;
        let document = serde_json::from_str::<TokenDocument>(&content)
            .map_err(|e| AppError::Storage(format!("解析令牌文件失败: {}", e)))?;

        Ok(document.auth_token.filter(|token| !token.trim().is_empty()))
    }

    fn save(&self, token: &str) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| AppError::Storage(format!("创建令牌目录失败: {}", e)))?;
        }

        let document = TokenDocument {
            auth_token: Some(token.to_string()),
        };
        let content = serde_json::to_string_pretty(&document)
            .map_err(|e| AppError::Storage(format!("序列化令牌失败: {}", e)))?;
        fs::write(&self.path, content)
            .map_err(|e| AppError::Storage(format!("写入令牌文件失败: {}", e)))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Err(err) = fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600)) {
                log::warn!("⚠️ 设置令牌文件权限失败: {}", err);
            }
        }

        Ok(())
    }

    fn clear(&self) -> Result<(), AppError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AppError::Storage(format!("删除令牌文件失败: {}", err))),
        }
    }
}

/// 进程内存中的令牌存储（测试与一次性会话）。
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>, AppError> {
        self.token
            .lock()
            .map_err(|_| AppError::Storage("令牌存储锁已中毒".to_string()))
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, AppError> {
        Ok(self.lock()?.clone())
    }

    fn save(&self, token: &str) -> Result<(), AppError> {
        *self.lock()? = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), AppError> {
        *self.lock()? = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_temp_path(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock before epoch")
            .as_nanos();
        std::env::temp_dir()
            .join(format!("shop_admin_{}_{}", name, nanos))
            .join("auth.json")
    }

    #[test]
    fn file_store_round_trips_under_fixed_key() {
        let path = unique_temp_path("token_store");
        let store = FileTokenStore::new(&path);

        assert_eq!(store.load().expect("load"), None);

        store.save("abc.def.ghi").expect("save");
        let raw = fs::read_to_string(&path).expect("read raw");
        let json: serde_json::Value = serde_json::from_str(&raw).expect("json");
        assert_eq!(json[TOKEN_STORAGE_KEY], "abc.def.ghi");
        assert_eq!(store.load().expect("load").as_deref(), Some("abc.def.ghi"));

        store.clear().expect("clear");
        assert!(!path.exists());
        store.clear().expect("clearing twice is fine");

        if let Some(dir) = path.parent() {
            let _ = fs::remove_dir_all(dir);
        }
    }

    #[test]
    fn file_store_rejects_corrupt_document() {
        let path = unique_temp_path("token_corrupt");
        let store = FileTokenStore::new(&path);
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(&path, "not json").expect("write");

        assert!(matches!(store.load(), Err(AppError::Storage(_))));

        if let Some(dir) = path.parent() {
            let _ = fs::remove_dir_all(dir);
        }
    }

    #[test]
    fn memory_store_overwrites_wholesale() {
        let store = MemoryTokenStore::with_token("old");
        store.save("new").expect("save");
        assert_eq!(store.load().expect("load").as_deref(), Some("new"));

        store.clear().expect("clear");
        assert_eq!(store.load().expect("load"), None);
    }
}
