//! # 数据源与中间模型
//!
//! ## 设计思路
//!
//! 将“外部输入类型”和“流水线中间结果”解耦：
//! - `ImageSource` 表示用户选择的图片来自哪里
//! - `RawImageData` 表示已加载但未解码的字节
//! - `SourceImage` 表示已解码、只读的源图（会话期间持有）
//! - `EncodedImage` 表示提交后得到的、带文件名与 MIME 的输出文件

use std::sync::Arc;

use bytes::Bytes;
use image::DynamicImage;

use super::geometry::Dimensions;

/// 图片输入来源。
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// 本地文件路径（文件选择器）。
    FilePath(String),
    /// Base64（支持 Data URL 与纯 Base64 字符串）。
    Base64 { data: String, file_name: String },
    /// 内存中的原始字节（拖拽、剪贴板等）。
    Bytes { bytes: Bytes, file_name: String },
}

impl ImageSource {
    pub fn file_name(&self) -> String {
        match self {
            Self::FilePath(path) => std::path::Path::new(path)
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| "image".to_string()),
            Self::Base64 { file_name, .. } | Self::Bytes { file_name, .. } => file_name.clone(),
        }
    }
}

/// 加载阶段输出：原始字节与来源标识。
pub(crate) struct RawImageData {
    /// 原始图片字节。
    pub(crate) bytes: Vec<u8>,
    /// 来源提示（用于日志与诊断）。
    pub(crate) source_hint: &'static str,
    /// 用户侧文件名，用于命名输出文件。
    pub(crate) file_name: String,
}

/// 已解码的源图。
///
/// 载入后不可变；像素数据放在 `Arc` 中，提交任务可廉价克隆到阻塞线程。
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub(crate) image: Arc<DynamicImage>,
    natural: Dimensions,
    file_name: String,
}

impl SourceImage {
    pub fn new(image: DynamicImage, file_name: impl Into<String>) -> Self {
        let natural = Dimensions::new(image.width(), image.height());
        Self {
            image: Arc::new(image),
            natural,
            file_name: file_name.into(),
        }
    }

    /// 源图原始宽高。
    pub fn natural(&self) -> Dimensions {
        self.natural
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

/// 提交后的输出文件。
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Bytes,
    pub width: u32,
    pub height: u32,
}

impl EncodedImage {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
