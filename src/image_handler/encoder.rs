//! # 编码模块
//!
//! 输出规格（`OutputSpec`）与最终编码。JPEG 按质量系数有损编码并丢弃透明通道；
//! PNG / WebP 走无损编码，质量系数不生效。

use bytes::Bytes;
use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use serde::{Deserialize, Serialize};

use super::ImageError;
use super::geometry::Dimensions;
use super::source::EncodedImage;

/// 输出编码格式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Jpeg,
    Png,
    WebP,
}

impl OutputFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::WebP => "image/webp",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::WebP => "webp",
        }
    }

    /// 是否保留透明通道。
    pub fn supports_alpha(self) -> bool {
        !matches!(self, Self::Jpeg)
    }

    pub fn parse(value: &str) -> Result<Self, ImageError> {
        match value.trim().to_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            "webp" => Ok(Self::WebP),
            other => Err(ImageError::InvalidFormat(format!(
                "未知输出格式：{}（可选：jpeg / png / webp）",
                other
            ))),
        }
    }
}

/// 输出规格：固定宽高 + 编码格式 + 质量系数（0~1）。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutputSpec {
    pub width: u32,
    pub height: u32,
    pub format: OutputFormat,
    pub quality: f32,
}

impl OutputSpec {
    pub fn new(width: u32, height: u32, format: OutputFormat, quality: f32) -> Self {
        Self {
            width,
            height,
            format,
            quality,
        }
    }

    /// 商品图默认规格：300x300 JPEG，质量 0.9。
    pub fn product_default() -> Self {
        Self::new(300, 300, OutputFormat::Jpeg, 0.9)
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    pub fn validate(&self) -> Result<(), ImageError> {
        if self.width == 0 || self.height == 0 {
            return Err(ImageError::Validation("宽度和高度必须大于 0".to_string()));
        }
        if !self.quality.is_finite() || !(0.0..=1.0).contains(&self.quality) {
            return Err(ImageError::Validation(format!(
                "输出质量必须在 0~1 之间：{}",
                self.quality
            )));
        }
        Ok(())
    }
}

/// JPEG 质量：`round(quality * 100)`，限制在 1..=100。
pub(crate) fn jpeg_quality(quality: f32) -> u8 {
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

/// 按原文件名主干 + 目标格式扩展名生成输出文件名。
pub(crate) fn output_file_name(original: &str, format: OutputFormat) -> String {
    let stem = std::path::Path::new(original)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "image".to_string());
    format!("{}.{}", stem, format.extension())
}

/// 将图像编码为输出文件。
///
/// 编码结果为空视为可恢复错误，调用方可以保持会话打开重试。
pub(crate) fn encode(
    image: &DynamicImage,
    format: OutputFormat,
    quality: f32,
    file_name: &str,
) -> Result<EncodedImage, ImageError> {
    let mut buffer: Vec<u8> = Vec::new();

    match format {
        OutputFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
            rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut buffer, jpeg_quality(quality)))?;
        }
        OutputFormat::Png => {
            image.write_with_encoder(PngEncoder::new(&mut buffer))?;
        }
        OutputFormat::WebP => {
            let rgba = DynamicImage::ImageRgba8(image.to_rgba8());
            rgba.write_with_encoder(WebPEncoder::new_lossless(&mut buffer))?;
        }
    }

    if buffer.is_empty() {
        return Err(ImageError::Encode("编码结果为空".to_string()));
    }

    Ok(EncodedImage {
        file_name: output_file_name(file_name, format),
        mime_type: format.mime_type(),
        bytes: Bytes::from(buffer),
        width: image.width(),
        height: image.height(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn sample() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(16, 8, Rgba([200, 100, 50, 128])))
    }

    #[test]
    fn jpeg_quality_maps_and_clamps() {
        assert_eq!(jpeg_quality(0.9), 90);
        assert_eq!(jpeg_quality(0.0), 1);
        assert_eq!(jpeg_quality(1.0), 100);
    }

    #[test]
    fn output_name_swaps_extension() {
        assert_eq!(output_file_name("photo.HEIC", OutputFormat::Jpeg), "photo.jpg");
        assert_eq!(output_file_name("banner", OutputFormat::Png), "banner.png");
        assert_eq!(output_file_name("", OutputFormat::WebP), "image.webp");
    }

    #[test]
    fn encode_every_format_decodes_back_to_same_size() {
        for format in [OutputFormat::Jpeg, OutputFormat::Png, OutputFormat::WebP] {
            let encoded = encode(&sample(), format, 0.8, "a.png").expect("encode");
            assert_eq!(encoded.mime_type, format.mime_type());

            let decoded = image::load_from_memory(&encoded.bytes).expect("decode back");
            assert_eq!((decoded.width(), decoded.height()), (16, 8));
        }
    }

    #[test]
    fn png_output_keeps_alpha() {
        let encoded = encode(&sample(), OutputFormat::Png, 0.9, "a.png").expect("encode");
        let decoded = image::load_from_memory(&encoded.bytes).expect("decode back");

        assert_eq!(decoded.to_rgba8().get_pixel(0, 0)[3], 128);
    }

    #[test]
    fn output_spec_validation() {
        assert!(OutputSpec::product_default().validate().is_ok());
        assert!(OutputSpec::new(0, 10, OutputFormat::Png, 0.9).validate().is_err());
        assert!(OutputSpec::new(10, 10, OutputFormat::Png, 1.5).validate().is_err());
    }
}
