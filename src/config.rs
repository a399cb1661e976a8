//! 应用配置模块
//!
//! # 设计思路
//!
//! 配置来源按优先级：环境变量 > JSON 配置文件 > 内置默认值。
//! 文件缺省字段全部回落到默认值，旧配置文件不会因为新增字段而失效。
//!
//! - `SHOP_ADMIN_API_URL`：后端地址
//! - `SHOP_ADMIN_TOKEN_FILE`：登录令牌持久化文件

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::image_handler::{ImageConfig, ImagePerformanceProfile};

pub const ENV_API_URL: &str = "SHOP_ADMIN_API_URL";
pub const ENV_TOKEN_FILE: &str = "SHOP_ADMIN_TOKEN_FILE";

/// 未指定配置文件时，在当前目录查找的默认文件名。
pub const DEFAULT_CONFIG_FILE: &str = "shop-admin.json";

const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 后端 REST API 根地址（不含末尾斜杠）。
    pub api_base_url: String,
    /// 单次请求超时（秒）。
    pub request_timeout_secs: u64,
    /// 令牌文件路径；为空时使用 `$HOME/.shop-admin/auth.json`。
    pub token_file: Option<PathBuf>,
    pub image: ImageSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: 30,
            token_file: None,
            image: ImageSettings::default(),
        }
    }
}

/// 图片处理相关的可配置项（`ImageConfig` 的可序列化子集）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSettings {
    pub performance_profile: ImagePerformanceProfile,
    pub max_file_size_mb: u64,
    pub crop_output_size: u32,
    pub crop_quality: f32,
    pub resize_canvas_width: u32,
    pub resize_canvas_height: u32,
    pub resize_quality: f32,
}

impl Default for ImageSettings {
    fn default() -> Self {
        let base = ImageConfig::default();
        Self {
            performance_profile: ImagePerformanceProfile::Balanced,
            max_file_size_mb: base.max_file_size / 1024 / 1024,
            crop_output_size: base.crop_output_size,
            crop_quality: base.crop_quality,
            resize_canvas_width: base.resize_canvas_width,
            resize_canvas_height: base.resize_canvas_height,
            resize_quality: base.resize_quality,
        }
    }
}

impl ImageSettings {
    pub fn to_image_config(&self) -> ImageConfig {
        let mut config = ImageConfig {
            max_file_size: self.max_file_size_mb * 1024 * 1024,
            crop_output_size: self.crop_output_size,
            crop_quality: self.crop_quality,
            resize_canvas_width: self.resize_canvas_width,
            resize_canvas_height: self.resize_canvas_height,
            resize_quality: self.resize_quality,
            ..ImageConfig::default()
        };
        config.apply_performance_profile(self.performance_profile);
        config
    }
}

impl AppConfig {
    /// 加载配置。
    ///
    /// `path` 为空时尝试读取当前目录下的 `shop-admin.json`，不存在则使用默认值；
    /// 显式指定的文件不存在视为错误。
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        if !path.exists() {
            return Err(AppError::Config(format!("配置文件不存在: {}", path.display())));
        }

        let content = fs::read_to_string(path)?;
        let config = serde_json::from_str::<Self>(&content)
            .map_err(|e| AppError::Config(format!("解析配置文件失败: {}", e)))?;

        log::info!("⚙️ 已加载配置文件: {}", path.display());
        Ok(config)
    }

    /// 应用环境变量覆盖。`lookup` 便于测试时注入。
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            self.api_base_url = url.trim().to_string();
        }
        if let Some(file) = lookup(ENV_TOKEN_FILE).filter(|v| !v.trim().is_empty()) {
            self.token_file = Some(PathBuf::from(file.trim()));
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        let url = self.api_base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(AppError::Config(format!(
                "api_base_url 必须以 http:// 或 https:// 开头: {}",
                url
            )));
        }
        if !(1..=300).contains(&self.request_timeout_secs) {
            return Err(AppError::Config(
                "request_timeout_secs 必须在 1~300 秒之间".to_string(),
            ));
        }
        self.image
            .to_image_config()
            .validate()
            .map_err(|e| AppError::Config(e.to_string()))
    }

    /// 去掉末尾斜杠后的 API 根地址。
    pub fn base_url(&self) -> &str {
        self.api_base_url.trim().trim_end_matches('/')
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn token_path(&self) -> PathBuf {
        if let Some(path) = &self.token_file {
            return path.clone();
        }
        match std::env::var_os("HOME") {
            Some(home) => PathBuf::from(home).join(".shop-admin").join("auth.json"),
            None => PathBuf::from(".shop-admin-auth.json"),
        }
    }
}
