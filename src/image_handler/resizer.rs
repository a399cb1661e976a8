//! # 缩放会话模块
//!
//! ## 设计思路
//!
//! 横幅等场景需要“固定画布 + 自由缩放取景”：源图不被裁剪，缩小时露出透明留白，
//! 放大时居中并裁掉画布外的部分。输出尺寸始终等于画布尺寸，缩放只改变图像在画布中的占位。
//!
//! ## 实现思路
//!
//! - 交互态只有一个缩放系数（限制在 `ZoomRange` 内）和画布尺寸
//! - 提交时按 `fit_then_zoom` 计算占位矩形，重采样后贴到透明 RGBA 画布
//! - 输出固定为 PNG，保证留白区域透明

use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};

use super::encoder::{self, OutputFormat};
use super::geometry::{Dimensions, Placement, fit_then_zoom};
use super::pipeline::resample_exact;
use super::source::{EncodedImage, SourceImage};
use super::ImageError;

/// 放大/缩小按钮的步进倍率。
pub const ZOOM_STEP_FACTOR: f64 = 1.2;

/// 质量滑块下限（对应界面上的 10%）。
const MIN_QUALITY: f32 = 0.1;

/// 缩放系数区间。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomRange {
    pub min: f64,
    pub max: f64,
}

impl Default for ZoomRange {
    fn default() -> Self {
        Self { min: 0.1, max: 3.0 }
    }
}

impl ZoomRange {
    pub fn clamp(&self, zoom: f64) -> f64 {
        if zoom.is_nan() {
            return 1.0_f64.clamp(self.min, self.max);
        }
        zoom.clamp(self.min, self.max)
    }
}

/// 交互式缩放会话。
#[derive(Debug)]
pub struct ResizeSession {
    source: SourceImage,
    canvas: Dimensions,
    zoom: f64,
    range: ZoomRange,
    quality: f32,
    filter: FilterType,
    pixel_limit: u64,
    error: Option<String>,
}

impl ResizeSession {
    pub fn open(
        source: SourceImage,
        canvas: Dimensions,
        quality: f32,
        range: ZoomRange,
        filter: FilterType,
    ) -> Self {
        let mut session = Self {
            source,
            canvas,
            zoom: range.clamp(1.0),
            range,
            quality: quality.clamp(MIN_QUALITY, 1.0),
            filter,
            pixel_limit: u64::MAX,
            error: None,
        };
        session.revalidate();
        session
    }

    /// 限制画布与缩放后图像的像素数，防止占用过多内存。
    pub fn with_pixel_limit(mut self, limit: u64) -> Self {
        self.pixel_limit = limit;
        self
    }

    pub fn source(&self) -> &SourceImage {
        &self.source
    }

    pub fn canvas(&self) -> Dimensions {
        self.canvas
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn range(&self) -> ZoomRange {
        self.range
    }

    pub fn quality(&self) -> f32 {
        self.quality
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn can_commit(&self) -> bool {
        self.error.is_none() && !self.canvas_exceeds_limit()
    }

    fn canvas_exceeds_limit(&self) -> bool {
        self.canvas.width as u64 * self.canvas.height as u64 > self.pixel_limit
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = self.range.clamp(zoom);
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom * ZOOM_STEP_FACTOR);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom / ZOOM_STEP_FACTOR);
    }

    /// 恢复默认缩放（1.0）。
    pub fn reset(&mut self) {
        self.set_zoom(1.0);
    }

    /// 修改目标画布尺寸；任一边为 0 时记录校验错误并禁用提交。
    pub fn set_canvas(&mut self, width: u32, height: u32) {
        self.canvas = Dimensions::new(width, height);
        self.revalidate();
    }

    /// 质量系数（0~1），PNG 输出下不影响结果。
    pub fn set_quality(&mut self, quality: f32) {
        if quality.is_finite() {
            self.quality = quality.clamp(MIN_QUALITY, 1.0);
        }
    }

    fn revalidate(&mut self) {
        self.error = if self.canvas.is_empty() {
            Some("宽度和高度必须大于 0".to_string())
        } else if self.source.natural().is_empty() {
            Some("图片尺寸为空".to_string())
        } else {
            None
        };
    }

    /// 当前缩放下图像在画布中的占位（未取整）。
    pub fn placement(&self) -> Placement {
        fit_then_zoom(self.source.natural(), self.canvas, self.zoom)
    }

    pub fn commit_job(&self) -> Result<ResizeJob, ImageError> {
        if let Some(error) = &self.error {
            return Err(ImageError::Validation(error.clone()));
        }
        if self.canvas_exceeds_limit() {
            return Err(ImageError::ResourceLimit(format!(
                "画布过大：{}（限制：{} 像素）",
                self.canvas, self.pixel_limit
            )));
        }

        let rect = self.placement().pixel_rect(self.canvas);
        let pixels = rect.2 as u64 * rect.3 as u64;
        if pixels > self.pixel_limit {
            return Err(ImageError::ResourceLimit(format!(
                "缩放后图像过大：{}x{}（限制：{} 像素）",
                rect.2, rect.3, self.pixel_limit
            )));
        }

        Ok(ResizeJob {
            source: self.source.clone(),
            canvas: self.canvas,
            rect,
            quality: self.quality,
            filter: self.filter,
        })
    }

    pub fn commit(&self) -> Result<EncodedImage, ImageError> {
        self.commit_job()?.render()
    }
}

/// 可在阻塞线程执行的缩放任务。
#[derive(Debug, Clone)]
pub struct ResizeJob {
    source: SourceImage,
    canvas: Dimensions,
    rect: (i64, i64, u32, u32),
    quality: f32,
    filter: FilterType,
}

impl ResizeJob {
    /// 图像在画布中的整数占位 `(x, y, width, height)`，偏移可为负。
    pub fn rect(&self) -> (i64, i64, u32, u32) {
        self.rect
    }

    pub fn render(self) -> Result<EncodedImage, ImageError> {
        let (x, y, width, height) = self.rect;
        let scaled = resample_exact(&self.source.image, width, height, self.filter).to_rgba8();

        let mut canvas = RgbaImage::new(self.canvas.width, self.canvas.height);
        imageops::replace(&mut canvas, &scaled, x, y);

        log::info!(
            "🔍 缩放完成 - 源图: {} 画布: {} 占位: {}x{}@({}, {})",
            self.source.natural(),
            self.canvas,
            width,
            height,
            x,
            y
        );

        encoder::encode(
            &DynamicImage::ImageRgba8(canvas),
            OutputFormat::Png,
            self.quality,
            self.source.file_name(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use image::Rgba;

    fn source(width: u32, height: u32) -> SourceImage {
        let img = RgbaImage::from_pixel(width, height, Rgba([20, 120, 220, 255]));
        SourceImage::new(DynamicImage::ImageRgba8(img), "banner.jpg")
    }

    fn session(width: u32, height: u32, canvas: u32) -> ResizeSession {
        ResizeSession::open(
            source(width, height),
            Dimensions::new(canvas, canvas),
            0.9,
            ZoomRange::default(),
            FilterType::Triangle,
        )
    }

    fn decode(output: &EncodedImage) -> RgbaImage {
        image::load_from_memory(&output.bytes).expect("decode output").to_rgba8()
    }

    #[test]
    fn wide_source_at_half_zoom_leaves_transparent_padding() {
        let mut session = session(1600, 900, 800);
        session.set_zoom(0.5);

        let placement = session.placement();
        assert_eq!((placement.width, placement.height), (400.0, 225.0));
        assert_eq!((placement.x, placement.y), (200.0, 287.5));

        let output = session.commit().expect("commit");
        assert_eq!(output.mime_type, "image/png");
        assert_eq!(output.file_name, "banner.png");

        let pixels = decode(&output);
        assert_eq!(pixels.dimensions(), (800, 800));
        assert_eq!(pixels.get_pixel(0, 0)[3], 0);
        assert_eq!(pixels.get_pixel(199, 400)[3], 0);
        assert_eq!(pixels.get_pixel(400, 286)[3], 0);
        assert_eq!(pixels.get_pixel(400, 400)[3], 255);
        assert_eq!(pixels.get_pixel(201, 400)[3], 255);
        assert_eq!(pixels.get_pixel(400, 288)[3], 255);
    }

    #[test]
    fn zoom_in_clips_but_keeps_canvas_size() {
        let mut session = session(800, 800, 800);
        session.set_zoom(3.0);

        let job = session.commit_job().expect("job");
        assert_eq!(job.rect(), (-800, -800, 2400, 2400));

        let pixels = decode(&job.render().expect("render"));
        assert_eq!(pixels.dimensions(), (800, 800));
        assert_eq!(pixels.get_pixel(0, 0)[3], 255);
        assert_eq!(pixels.get_pixel(799, 799)[3], 255);
    }

    #[test]
    fn zoom_is_clamped_and_reset() {
        let mut session = session(100, 100, 800);
        assert_eq!(session.zoom(), 1.0);

        session.set_zoom(10.0);
        assert_eq!(session.zoom(), 3.0);
        session.set_zoom(0.01);
        assert_eq!(session.zoom(), 0.1);
        session.zoom_out();
        assert_eq!(session.zoom(), 0.1);

        session.reset();
        session.zoom_in();
        assert!((session.zoom() - ZOOM_STEP_FACTOR).abs() < 1e-9);
        session.set_zoom(f64::NAN);
        assert_eq!(session.zoom(), 1.0);
    }

    #[test]
    fn zero_canvas_disables_commit() {
        let mut session = session(100, 100, 800);
        session.set_canvas(0, 800);

        assert!(!session.can_commit());
        assert_eq!(session.error(), Some("宽度和高度必须大于 0"));
        assert!(matches!(session.commit(), Err(ImageError::Validation(_))));

        session.set_canvas(640, 320);
        assert!(session.can_commit());
        let pixels = decode(&session.commit().expect("commit"));
        assert_eq!(pixels.dimensions(), (640, 320));
    }

    #[test]
    fn quality_is_clamped_to_slider_range() {
        let mut session = session(10, 10, 10);
        session.set_quality(0.0);
        assert_eq!(session.quality(), MIN_QUALITY);
        session.set_quality(2.0);
        assert_eq!(session.quality(), 1.0);
    }

    #[test]
    fn pixel_limit_rejects_oversized_zoom() {
        let mut session = session(800, 800, 800).with_pixel_limit(1_000_000);
        session.set_zoom(3.0);

        assert!(matches!(session.commit_job(), Err(ImageError::ResourceLimit(_))));
    }

    #[test]
    fn pixel_limit_rejects_oversized_canvas() {
        let session = session(4, 4, 60_000).with_pixel_limit(1_000_000);

        assert!(!session.can_commit());
        assert!(matches!(session.commit_job(), Err(ImageError::ResourceLimit(_))));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn output_always_matches_canvas(
            src_w in 1u32..160,
            src_h in 1u32..160,
            canvas_w in 1u32..96,
            canvas_h in 1u32..96,
            zoom in 0.1f64..3.0,
        ) {
            let mut session = ResizeSession::open(
                source(src_w, src_h),
                Dimensions::new(canvas_w, canvas_h),
                0.9,
                ZoomRange::default(),
                FilterType::Triangle,
            );
            session.set_zoom(zoom);

            let output = session.commit().expect("commit");
            prop_assert_eq!(output.dimensions(), Dimensions::new(canvas_w, canvas_h));
            prop_assert_eq!(decode(&output).dimensions(), (canvas_w, canvas_h));
        }
    }
}
