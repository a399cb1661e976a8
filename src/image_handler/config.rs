//! # 配置模块
//!
//! ## 设计思路
//!
//! 将所有“可调策略”集中到 `ImageConfig`，保证运行时行为可观测、可调整、可测试。
//! 其中重采样档位（quality / balanced / speed）作为高层语义，映射到具体滤镜。
//!
//! ## 实现思路
//!
//! - `Default` 提供生产可用的配置（商品图 300x300 JPEG，横幅缩放画布 800x800）。
//! - `ImagePerformanceProfile` 负责档位字符串解析与反向输出。
//! - `apply_performance_profile` 将档位转换为滤镜。
//! - `infer_performance_profile` 从当前滤镜反推档位（给调用方展示状态）。

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

use super::ImageError;

/// 图片处理配置。
///
/// 字段覆盖了读取、解码、重采样与裁剪/缩放默认参数四个阶段。
#[derive(Debug, Clone)]
pub struct ImageConfig {
    /// 读取原始字节时允许的最大文件体积（字节）。
    pub max_file_size: u64,
    /// 解码后的像素上限（`width * height`）。
    pub max_decoded_pixels: u64,
    /// 解码阶段允许的预计内存上限（按 RGBA 估算，字节）。
    pub max_decoded_bytes: u64,
    /// 重采样滤镜。
    pub resize_filter: FilterType,
    /// 裁剪输出边长（像素，正方形）。
    pub crop_output_size: u32,
    /// 裁剪输出质量（0~1）。
    pub crop_quality: f32,
    /// 缩放画布默认宽度。
    pub resize_canvas_width: u32,
    /// 缩放画布默认高度。
    pub resize_canvas_height: u32,
    /// 缩放输出质量（0~1）。
    pub resize_quality: f32,
    /// 缩放系数下限。
    pub min_zoom: f64,
    /// 缩放系数上限。
    pub max_zoom: f64,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_file_size: 20 * 1024 * 1024,
            max_decoded_pixels: 40_000_000,
            max_decoded_bytes: 160 * 1024 * 1024,
            resize_filter: FilterType::CatmullRom,
            crop_output_size: 300,
            crop_quality: 0.9,
            resize_canvas_width: 800,
            resize_canvas_height: 800,
            resize_quality: 0.9,
            min_zoom: 0.1,
            max_zoom: 3.0,
        }
    }
}

/// 重采样档位（面向用户的语义）。
///
/// - `Quality`：Lanczos3，尽量保真
/// - `Balanced`：CatmullRom，默认
/// - `Speed`：双线性，优先速度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImagePerformanceProfile {
    Quality,
    Balanced,
    Speed,
}

impl ImagePerformanceProfile {
    /// 从外部字符串解析档位。
    ///
    /// # 示例
    /// ```rust
    /// use shop_admin::image_handler::ImagePerformanceProfile;
    ///
    /// let p = ImagePerformanceProfile::parse("Balanced")?;
    /// assert_eq!(p.as_str(), "balanced");
    /// # Ok::<(), shop_admin::image_handler::ImageError>(())
    /// ```
    pub fn parse(profile: &str) -> Result<Self, ImageError> {
        match profile.trim().to_lowercase().as_str() {
            "quality" => Ok(Self::Quality),
            "balanced" => Ok(Self::Balanced),
            "speed" => Ok(Self::Speed),
            other => Err(ImageError::InvalidFormat(format!(
                "未知性能档位：{}（可选：quality / balanced / speed）",
                other
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quality => "quality",
            Self::Balanced => "balanced",
            Self::Speed => "speed",
        }
    }
}

impl ImageConfig {
    /// 基于当前滤镜反推档位。
    pub(crate) fn infer_performance_profile(&self) -> ImagePerformanceProfile {
        match self.resize_filter {
            FilterType::Lanczos3 | FilterType::Gaussian => ImagePerformanceProfile::Quality,
            FilterType::CatmullRom => ImagePerformanceProfile::Balanced,
            FilterType::Triangle | FilterType::Nearest => ImagePerformanceProfile::Speed,
        }
    }

    pub(crate) fn apply_performance_profile(&mut self, profile: ImagePerformanceProfile) {
        self.resize_filter = match profile {
            ImagePerformanceProfile::Quality => FilterType::Lanczos3,
            ImagePerformanceProfile::Balanced => FilterType::CatmullRom,
            ImagePerformanceProfile::Speed => FilterType::Triangle,
        };
    }

    /// 校验配置自洽性（加载外部配置后调用）。
    pub fn validate(&self) -> Result<(), ImageError> {
        if self.crop_output_size == 0 {
            return Err(ImageError::Validation("crop_output_size 必须大于 0".to_string()));
        }
        if self.resize_canvas_width == 0 || self.resize_canvas_height == 0 {
            return Err(ImageError::Validation("缩放画布宽高必须大于 0".to_string()));
        }
        if !(0.0..=1.0).contains(&self.crop_quality) || !(0.0..=1.0).contains(&self.resize_quality) {
            return Err(ImageError::Validation("输出质量必须在 0~1 之间".to_string()));
        }
        if !(self.min_zoom > 0.0 && self.min_zoom <= 1.0 && self.max_zoom >= 1.0) {
            return Err(ImageError::Validation(format!(
                "缩放区间非法：[{}, {}]（需包含 1.0 且下限大于 0）",
                self.min_zoom, self.max_zoom
            )));
        }
        if self.max_decoded_bytes < 8 * 1024 * 1024 {
            return Err(ImageError::Validation("max_decoded_bytes 不能小于 8MB".to_string()));
        }
        Ok(())
    }
}
