//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `ImageHandler` 只负责流程编排与配置管理，不直接与界面或网络绑定。
//! 处理链路固定为：
//! 1. 读取配置快照
//! 2. 按来源加载原始字节
//! 3. 解码为只读源图
//! 4. 打开裁剪/缩放会话，或一次性完成裁剪/缩放并编码
//!
//! ## 实现思路
//!
//! - 配置通过 `Arc<RwLock<ImageConfig>>` 支持运行时动态切档。
//! - 单次操作内使用“同一配置快照”，避免处理中途配置漂移。
//! - 记录 `load/decode/render/total` 阶段耗时，便于性能诊断。

use std::sync::{Arc, RwLock};
use std::time::Instant;

use super::cropper::CropSession;
use super::encoder::{OutputFormat, OutputSpec};
use super::geometry::{CropConstraints, CropRegion, Dimensions};
use super::resizer::{ResizeSession, ZoomRange};
use super::source::{EncodedImage, SourceImage};
use super::{ImageConfig, ImageError, ImagePerformanceProfile, ImageSource};

/// 图片处理器。
///
/// 封装了配置状态，并编排加载、解码与会话创建。
#[derive(Debug)]
pub struct ImageHandler {
    pub(super) config: Arc<RwLock<ImageConfig>>,
}

impl ImageHandler {
    /// 根据初始配置创建处理器。
    ///
    /// # 示例
    /// ```rust
    /// use shop_admin::image_handler::{ImageConfig, ImageHandler};
    ///
    /// let handler = ImageHandler::new(ImageConfig::default());
    /// assert_eq!(handler.get_performance_profile()?.as_str(), "balanced");
    /// # Ok::<(), shop_admin::image_handler::ImageError>(())
    /// ```
    pub fn new(config: ImageConfig) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
        }
    }

    /// 获取配置快照。
    ///
    /// 作用：保证单次操作链路使用一致参数。
    pub(crate) fn config_snapshot(&self) -> Result<ImageConfig, ImageError> {
        self.config
            .read()
            .map(|cfg| cfg.clone())
            .map_err(|_| ImageError::ResourceLimit("配置读取锁已中毒".to_string()))
    }

    /// 整体替换配置（先校验）。
    pub fn replace_config(&self, config: ImageConfig) -> Result<(), ImageError> {
        config.validate()?;
        let mut current = self
            .config
            .write()
            .map_err(|_| ImageError::ResourceLimit("配置写入锁已中毒".to_string()))?;
        *current = config;
        Ok(())
    }

    /// 设置性能档位。
    pub fn set_performance_profile(&self, profile: ImagePerformanceProfile) -> Result<(), ImageError> {
        let mut config = self
            .config
            .write()
            .map_err(|_| ImageError::ResourceLimit("配置写入锁已中毒".to_string()))?;
        config.apply_performance_profile(profile);

        log::info!(
            "⚙️ 已切换图片性能档位：{:?}（filter={:?}）",
            profile,
            config.resize_filter
        );

        Ok(())
    }

    /// 获取当前生效档位。
    pub fn get_performance_profile(&self) -> Result<ImagePerformanceProfile, ImageError> {
        let config = self
            .config
            .read()
            .map_err(|_| ImageError::ResourceLimit("配置读取锁已中毒".to_string()))?;
        Ok(config.infer_performance_profile())
    }

    /// 加载并解码源图。
    pub fn load_source(&self, source: ImageSource) -> Result<SourceImage, ImageError> {
        let config = self.config_snapshot()?;

        let load_start = Instant::now();
        let raw = self.load_raw(source, &config)?;
        let load_elapsed = load_start.elapsed();

        let decode_start = Instant::now();
        let image = self.decode_source(raw, &config)?;
        let decode_elapsed = decode_start.elapsed();

        log::debug!(
            "⏱️ 源图就绪 - load={}ms decode={}ms",
            load_elapsed.as_millis(),
            decode_elapsed.as_millis()
        );

        Ok(image)
    }

    /// 商品图默认输出规格：`crop_output_size` 正方形 JPEG。
    pub fn default_crop_spec(&self) -> Result<OutputSpec, ImageError> {
        let config = self.config_snapshot()?;
        Ok(OutputSpec::new(
            config.crop_output_size,
            config.crop_output_size,
            OutputFormat::Jpeg,
            config.crop_quality,
        ))
    }

    /// 打开裁剪会话。`spec` 为空时使用配置中的商品图规格；约束由输出规格推导。
    pub fn open_crop(
        &self,
        source: SourceImage,
        spec: Option<OutputSpec>,
    ) -> Result<CropSession, ImageError> {
        let spec = match spec {
            Some(spec) => spec,
            None => self.default_crop_spec()?,
        };
        let constraints = CropConstraints::for_output(spec.dimensions());
        self.open_crop_with(source, spec, constraints)
    }

    /// 打开裁剪会话，并显式指定约束（自由比例、最大尺寸等）。
    pub fn open_crop_with(
        &self,
        source: SourceImage,
        spec: OutputSpec,
        constraints: CropConstraints,
    ) -> Result<CropSession, ImageError> {
        let config = self.config_snapshot()?;
        let output_pixels = spec.width as u64 * spec.height as u64;
        if output_pixels > config.max_decoded_pixels {
            return Err(ImageError::ResourceLimit(format!(
                "输出尺寸过大：{}（限制：{} 像素）",
                spec.dimensions(),
                config.max_decoded_pixels
            )));
        }
        Ok(CropSession::open(source, spec, constraints, config.resize_filter))
    }

    /// 打开缩放会话。画布与质量为空时使用配置默认值（800x800，0.9）。
    pub fn open_resize(
        &self,
        source: SourceImage,
        canvas: Option<Dimensions>,
        quality: Option<f32>,
    ) -> Result<ResizeSession, ImageError> {
        let config = self.config_snapshot()?;
        let canvas = canvas.unwrap_or(Dimensions::new(
            config.resize_canvas_width,
            config.resize_canvas_height,
        ));
        let range = ZoomRange {
            min: config.min_zoom,
            max: config.max_zoom,
        };

        Ok(ResizeSession::open(
            source,
            canvas,
            quality.unwrap_or(config.resize_quality),
            range,
            config.resize_filter,
        )
        .with_pixel_limit(config.max_decoded_pixels))
    }

    /// 一次性裁剪：加载 → 解码 → 按指定（或默认）裁剪框提交。
    pub fn crop_to_spec(
        &self,
        source: ImageSource,
        spec: Option<OutputSpec>,
        region: Option<CropRegion>,
    ) -> Result<EncodedImage, ImageError> {
        let total_start = Instant::now();

        let decode_start = Instant::now();
        let image = self.load_source(source)?;
        let decode_elapsed = decode_start.elapsed();

        let mut session = self.open_crop(image, spec)?;
        if let Some(region) = region {
            session.set_region(region);
        }

        let render_start = Instant::now();
        let output = session.commit()?;
        let render_elapsed = render_start.elapsed();

        log::info!(
            "✅ 裁剪处理完成 - load+decode={}ms render={}ms total={}ms 输出: {} ({} 字节)",
            decode_elapsed.as_millis(),
            render_elapsed.as_millis(),
            total_start.elapsed().as_millis(),
            output.file_name,
            output.len()
        );

        Ok(output)
    }

    /// 一次性缩放：加载 → 解码 → 以给定缩放系数渲染到画布。
    pub fn resize_to_canvas(
        &self,
        source: ImageSource,
        canvas: Option<Dimensions>,
        zoom: f64,
        quality: Option<f32>,
    ) -> Result<EncodedImage, ImageError> {
        let total_start = Instant::now();

        let decode_start = Instant::now();
        let image = self.load_source(source)?;
        let decode_elapsed = decode_start.elapsed();

        let mut session = self.open_resize(image, canvas, quality)?;
        session.set_zoom(zoom);

        let render_start = Instant::now();
        let output = session.commit()?;
        let render_elapsed = render_start.elapsed();

        log::info!(
            "✅ 缩放处理完成 - load+decode={}ms render={}ms total={}ms 输出: {} ({} 字节)",
            decode_elapsed.as_millis(),
            render_elapsed.as_millis(),
            total_start.elapsed().as_millis(),
            output.file_name,
            output.len()
        );

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use image::{DynamicImage, ImageBuffer, ImageFormat, Rgba};
    use std::io::Cursor;

    fn create_png_bytes(width: u32, height: u32) -> Bytes {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            Rgba([(x % 255) as u8, (y % 255) as u8, ((x + y) % 255) as u8, 255])
        });

        let mut cursor = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut cursor, ImageFormat::Png)
            .expect("failed to encode test image");
        Bytes::from(cursor.into_inner())
    }

    fn bytes_source(width: u32, height: u32) -> ImageSource {
        ImageSource::Bytes {
            bytes: create_png_bytes(width, height),
            file_name: "product.png".to_string(),
        }
    }

    #[test]
    fn performance_profile_switch_is_observable() {
        let handler = ImageHandler::new(ImageConfig::default());
        assert_eq!(
            handler.get_performance_profile().expect("profile"),
            ImagePerformanceProfile::Balanced
        );

        handler
            .set_performance_profile(ImagePerformanceProfile::Speed)
            .expect("switch profile");

        assert_eq!(
            handler.get_performance_profile().expect("profile"),
            ImagePerformanceProfile::Speed
        );
    }

    #[test]
    fn replace_config_rejects_invalid_values() {
        let handler = ImageHandler::new(ImageConfig::default());
        let mut config = ImageConfig::default();
        config.crop_output_size = 0;

        assert!(handler.replace_config(config).is_err());
        assert_eq!(handler.config_snapshot().expect("snapshot").crop_output_size, 300);
    }

    #[test]
    fn default_crop_uses_configured_product_spec() {
        let handler = ImageHandler::new(ImageConfig::default());

        let output = handler
            .crop_to_spec(bytes_source(900, 600), None, None)
            .expect("crop should succeed");

        assert_eq!(output.dimensions(), Dimensions::new(300, 300));
        assert_eq!(output.mime_type, "image/jpeg");
        assert_eq!(output.file_name, "product.jpg");
    }

    #[test]
    fn crop_of_small_image_reports_minimum_size() {
        let handler = ImageHandler::new(ImageConfig::default());

        let result = handler.crop_to_spec(bytes_source(200, 400), None, None);

        match result {
            Err(ImageError::Validation(message)) => assert!(message.contains("300x300")),
            other => panic!("expected validation error, got {:?}", other.map(|o| o.file_name)),
        }
    }

    #[test]
    fn resize_uses_configured_canvas() {
        let handler = ImageHandler::new(ImageConfig::default());

        let output = handler
            .resize_to_canvas(bytes_source(1600, 900), None, 0.5, None)
            .expect("resize should succeed");

        assert_eq!(output.dimensions(), Dimensions::new(800, 800));
        assert_eq!(output.mime_type, "image/png");
    }

    #[test]
    fn oversized_outputs_hit_pixel_limit() {
        let handler = ImageHandler::new(ImageConfig {
            max_decoded_pixels: 10_000,
            ..ImageConfig::default()
        });

        let resized = handler.resize_to_canvas(
            bytes_source(16, 16),
            Some(Dimensions::new(200, 200)),
            1.0,
            None,
        );
        assert!(matches!(resized, Err(ImageError::ResourceLimit(_))));

        let spec = OutputSpec::new(200, 200, OutputFormat::Png, 0.9);
        let cropped = handler.crop_to_spec(bytes_source(16, 16), Some(spec), None);
        assert!(matches!(cropped, Err(ImageError::ResourceLimit(_))));
    }

    #[test]
    fn open_resize_honours_overrides() {
        let handler = ImageHandler::new(ImageConfig::default());
        let image = handler.load_source(bytes_source(64, 32)).expect("load");

        let session = handler
            .open_resize(image, Some(Dimensions::new(120, 60)), Some(0.5))
            .expect("open");

        assert_eq!(session.canvas(), Dimensions::new(120, 60));
        assert_eq!(session.quality(), 0.5);
        assert_eq!(session.zoom(), 1.0);
    }
}
