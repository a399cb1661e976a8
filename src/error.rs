//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义全局统一的 `AppError` 枚举，所有公开操作（API 调用、登录、视图提交、
//! 图片处理）统一返回 `Result<T, AppError>`，视图层把它转换成界面提示文案。
//!
//! 错误按三类处理：
//! - 校验类：图片过小、必填项缺失，只阻止当前提交，内联提示
//! - 网络/API 类：作为可关闭的横幅提示，从不自动重试
//! - 环境类：当前环境无法完成该操作，单次报告
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `ImageError`、`std::io::Error`、`reqwest::Error`、`serde_json::Error` 提供 `From` 转换。
//! - 实现 `Serialize` 将错误序列化为字符串，便于命令行 JSON 输出。

use serde::Serialize;

use crate::image_handler::ImageError;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 用户输入不满足要求
    #[error("{0}")]
    Validation(String),

    /// 后端返回非 2xx
    #[error("{message}")]
    Api { status: u16, message: String },

    /// 连接失败、DNS 失败等传输层错误
    #[error("网络错误: {0}")]
    Network(String),

    #[error("请求超时: {0}")]
    Timeout(String),

    /// 图片处理流水线错误（加载 / 解码 / 裁剪 / 编码）
    #[error("{0}")]
    Image(#[from] ImageError),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 令牌存储不可用
    #[error("令牌存储不可用: {0}")]
    Storage(String),

    #[error("配置错误: {0}")]
    Config(String),

    /// 请求在结果返回前已被取消（对话框已关闭）
    #[error("操作已取消")]
    Cancelled,

    /// 请求或响应体无法（反）序列化
    #[error("数据格式错误: {0}")]
    Serialization(String),
}

/// 错误大类，决定界面上的呈现方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// 内联提示，只禁用当前提交
    Validation,
    /// 可关闭的横幅提示
    Network,
    /// 环境不支持，单次报告
    Environment,
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Image(err) if err.is_validation() => ErrorKind::Validation,
            Self::Image(ImageError::Unsupported(_)) => ErrorKind::Environment,
            Self::Image(_) => ErrorKind::Validation,
            Self::Api { .. }
            | Self::Network(_)
            | Self::Timeout(_)
            | Self::Serialization(_)
            | Self::Cancelled => ErrorKind::Network,
            Self::Io(_) | Self::Storage(_) | Self::Config(_) => ErrorKind::Environment,
        }
    }

    /// HTTP 状态码（仅 API 错误）。
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// 后端是否拒绝了当前令牌。
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout(error.to_string())
        } else if error.is_decode() {
            Self::Serialization(error.to_string())
        } else if let Some(status) = error.status() {
            Self::Api {
                status: status.as_u16(),
                message: format!("HTTP error! status: {}", status.as_u16()),
            }
        } else {
            Self::Network(error.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

/// 将错误序列化为人类可读的字符串。
impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
