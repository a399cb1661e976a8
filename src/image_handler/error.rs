//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载裁剪/缩放链路中的所有错误来源，避免字符串拼接式错误处理。
//! 通过 `thiserror` 保持人类可读错误，同时让调用侧可按分支匹配：
//!
//! - 校验类（`Validation`）：图片过小、裁剪框非法等，只阻止本次提交
//! - 可恢复类（`Decode` / `Encode` / `InvalidFormat` / `FileSystem` / `ResourceLimit`）
//! - 环境类（`Unsupported`）：当前环境无法完成该操作

/// 图片处理统一错误类型。
///
/// 该类型会在上层被转换为 `AppError`，最终变成界面上的提示文案。
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("解码错误：{0}")]
    Decode(String),

    #[error("编码错误：{0}")]
    Encode(String),

    #[error("格式错误：{0}")]
    InvalidFormat(String),

    #[error("文件错误：{0}")]
    FileSystem(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),

    #[error("{0}")]
    Validation(String),

    #[error("环境不支持：{0}")]
    Unsupported(String),
}

impl ImageError {
    /// 稳定错误码，供命令行 JSON 输出与日志检索。
    pub fn code(&self) -> &'static str {
        match self {
            Self::Decode(_) => "E_DECODE",
            Self::Encode(_) => "E_ENCODE",
            Self::InvalidFormat(_) => "E_INVALID_FORMAT",
            Self::FileSystem(_) => "E_FILE",
            Self::ResourceLimit(_) => "E_RESOURCE_LIMIT",
            Self::Validation(_) => "E_VALIDATION",
            Self::Unsupported(_) => "E_UNSUPPORTED",
        }
    }

    /// 出错阶段。
    pub fn stage(&self) -> &'static str {
        match self {
            Self::FileSystem(_) | Self::InvalidFormat(_) => "load",
            Self::Decode(_) | Self::ResourceLimit(_) => "decode",
            Self::Validation(_) => "validate",
            Self::Encode(_) | Self::Unsupported(_) => "encode",
        }
    }

    /// 是否属于用户可修正的校验错误。
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<image::ImageError> for ImageError {
    fn from(error: image::ImageError) -> Self {
        match error {
            image::ImageError::Unsupported(e) => Self::Unsupported(e.to_string()),
            image::ImageError::Limits(e) => Self::ResourceLimit(e.to_string()),
            image::ImageError::Encoding(e) => Self::Encode(e.to_string()),
            image::ImageError::IoError(e) => Self::FileSystem(e.to_string()),
            other => Self::Decode(other.to_string()),
        }
    }
}
