//! # 几何计算模块
//!
//! ## 设计思路
//!
//! 裁剪与缩放里所有“算坐标”的逻辑集中在这里，全部是纯函数：
//! 不持有图像、不做 I/O，便于单测和属性测试覆盖各种尺寸组合。
//!
//! - `CropRegion`：裁剪框，可用源图像素或百分比表示
//! - `CropConstraints`：宽高比与最小/最大裁剪尺寸
//! - `default_crop_region`：图片载入后的默认裁剪框（90% 宽度 + 居中）
//! - `fit_then_zoom`：缩放模式下“先适配画布、再乘缩放系数、最后居中”

use serde::{Deserialize, Serialize};

use super::ImageError;

/// 宽高比容差（相对值）。
///
/// 展示层坐标换算回源图时存在 1px 级别的取整误差，1% 足以覆盖。
pub const ASPECT_TOLERANCE: f64 = 0.01;

/// 默认裁剪框占源图宽度的比例。
const DEFAULT_CROP_WIDTH_RATIO: f64 = 0.9;

/// 边界比较时允许的浮点误差（像素）。
const EDGE_EPSILON: f64 = 1e-6;

/// 像素尺寸。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// 宽高比（width / height）。调用方需保证高度非零。
    pub fn aspect(self) -> f64 {
        self.width as f64 / self.height as f64
    }

    fn as_f64(self) -> (f64, f64) {
        (self.width as f64, self.height as f64)
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// 裁剪框坐标单位。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CropUnit {
    /// 源图（或展示层）像素。
    #[serde(alias = "px")]
    Pixels,
    /// 相对展示尺寸的百分比（0~100）。
    #[serde(alias = "%")]
    Percent,
}

/// 裁剪框。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRegion {
    pub unit: CropUnit,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropRegion {
    pub fn pixels(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            unit: CropUnit::Pixels,
            x,
            y,
            width,
            height,
        }
    }

    pub fn percent(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            unit: CropUnit::Percent,
            x,
            y,
            width,
            height,
        }
    }

    pub fn aspect(&self) -> f64 {
        self.width / self.height
    }

    /// 换算为源图像素坐标。像素单位原样返回。
    pub fn to_pixels(self, natural: Dimensions) -> Self {
        match self.unit {
            CropUnit::Pixels => self,
            CropUnit::Percent => {
                let (w, h) = natural.as_f64();
                Self::pixels(
                    self.x * w / 100.0,
                    self.y * h / 100.0,
                    self.width * w / 100.0,
                    self.height * h / 100.0,
                )
            }
        }
    }

    /// 换算为百分比坐标。
    pub fn to_percent(self, natural: Dimensions) -> Self {
        match self.unit {
            CropUnit::Percent => self,
            CropUnit::Pixels => {
                let (w, h) = natural.as_f64();
                Self::percent(
                    self.x * 100.0 / w,
                    self.y * 100.0 / h,
                    self.width * 100.0 / w,
                    self.height * 100.0 / h,
                )
            }
        }
    }

    /// 将展示层坐标映射回源图像素。
    ///
    /// 像素单位按 `natural / displayed` 分轴缩放；百分比与展示尺寸无关，直接按源图换算。
    pub fn scale_to_natural(
        self,
        displayed: Dimensions,
        natural: Dimensions,
    ) -> Result<Self, ImageError> {
        if self.unit == CropUnit::Percent {
            return Ok(self.to_pixels(natural));
        }

        if displayed.is_empty() {
            return Err(ImageError::Validation(format!(
                "展示尺寸无效：{}",
                displayed
            )));
        }

        let scale_x = natural.width as f64 / displayed.width as f64;
        let scale_y = natural.height as f64 / displayed.height as f64;

        Ok(Self::pixels(
            self.x * scale_x,
            self.y * scale_y,
            self.width * scale_x,
            self.height * scale_y,
        ))
    }

    /// 校验裁剪框是否满足不变量：非负起点、正尺寸、不越界，以及（可选）宽高比。
    pub fn validate(&self, natural: Dimensions, aspect: Option<f64>) -> Result<(), ImageError> {
        let px = self.to_pixels(natural);
        let (w, h) = natural.as_f64();

        let finite = [px.x, px.y, px.width, px.height].iter().all(|v| v.is_finite());
        if !finite {
            return Err(ImageError::Validation("裁剪区域包含非法数值".to_string()));
        }

        if px.width <= 0.0 || px.height <= 0.0 {
            return Err(ImageError::Validation("请选择裁剪区域".to_string()));
        }

        if px.x < -EDGE_EPSILON || px.y < -EDGE_EPSILON {
            return Err(ImageError::Validation("裁剪区域起点不能为负".to_string()));
        }

        if px.x + px.width > w + EDGE_EPSILON || px.y + px.height > h + EDGE_EPSILON {
            return Err(ImageError::Validation(format!(
                "裁剪区域超出图片范围（{}）",
                natural
            )));
        }

        if let Some(target) = aspect {
            let deviation = (px.aspect() - target).abs() / target;
            if deviation > ASPECT_TOLERANCE {
                return Err(ImageError::Validation(format!(
                    "裁剪区域宽高比 {:.3} 与要求的 {:.3} 不一致",
                    px.aspect(),
                    target
                )));
            }
        }

        Ok(())
    }

    /// 平移后仍保持在源图内部（尺寸不变，必要时贴边）。
    pub fn clamp_within(self, natural: Dimensions) -> Self {
        let px = self.to_pixels(natural);
        let (w, h) = natural.as_f64();
        let width = px.width.min(w);
        let height = px.height.min(h);
        let x = px.x.clamp(0.0, w - width);
        let y = px.y.clamp(0.0, h - height);
        let clamped = Self::pixels(x, y, width, height);

        match self.unit {
            CropUnit::Pixels => clamped,
            CropUnit::Percent => clamped.to_percent(natural),
        }
    }

    /// 取整为源图中的整数矩形 `(x, y, width, height)`，保证落在图内且至少 1px。
    pub fn to_pixel_rect(&self, natural: Dimensions) -> (u32, u32, u32, u32) {
        let px = self.to_pixels(natural);
        let x = (px.x.round().max(0.0) as u32).min(natural.width.saturating_sub(1));
        let y = (px.y.round().max(0.0) as u32).min(natural.height.saturating_sub(1));
        let width = (px.width.round() as u32).clamp(1, natural.width - x);
        let height = (px.height.round() as u32).clamp(1, natural.height - y);
        (x, y, width, height)
    }
}

/// 裁剪约束（源图像素）。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropConstraints {
    /// 锁定的宽高比；`None` 表示自由裁剪。
    pub aspect: Option<f64>,
    pub min_width: u32,
    pub min_height: u32,
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
}

impl CropConstraints {
    /// 按输出尺寸推导：锁定输出宽高比，最小裁剪尺寸即输出尺寸。
    pub fn for_output(output: Dimensions) -> Self {
        Self {
            aspect: Some(output.aspect()),
            min_width: output.width,
            min_height: output.height,
            max_width: None,
            max_height: None,
        }
    }

    /// 源图是否满足最小尺寸。
    pub fn check_source(&self, natural: Dimensions) -> Result<(), ImageError> {
        if natural.width < self.min_width || natural.height < self.min_height {
            return Err(ImageError::Validation(format!(
                "图片尺寸过小：{}，最小尺寸：{}x{}",
                natural, self.min_width, self.min_height
            )));
        }
        Ok(())
    }

    pub(crate) fn max_width_f64(&self) -> f64 {
        self.max_width.map(|v| v as f64).unwrap_or(f64::INFINITY)
    }

    fn max_height_f64(&self) -> f64 {
        self.max_height.map(|v| v as f64).unwrap_or(f64::INFINITY)
    }

    /// 在给定宽高比下允许的裁剪宽度区间 `[min, max]`（源图像素）。
    pub(crate) fn width_range(&self, natural: Dimensions, aspect: f64) -> (f64, f64) {
        let (w, h) = natural.as_f64();
        let min = (self.min_width as f64).max(self.min_height as f64 * aspect);
        let max = self
            .max_width_f64()
            .min(self.max_height_f64() * aspect)
            .min(w)
            .min(h * aspect);
        (min, max)
    }
}

/// 计算默认裁剪框。
///
/// 宽度取源图的 90%，按宽高比推导高度；高度溢出时改为占满高度再反推宽度。
/// 随后收敛到 `[min, max]` 区间与“图内最大同比例矩形”，最后居中。
pub fn default_crop_region(
    natural: Dimensions,
    constraints: &CropConstraints,
) -> Result<CropRegion, ImageError> {
    if natural.is_empty() {
        return Err(ImageError::Validation("图片尺寸为空".to_string()));
    }
    constraints.check_source(natural)?;

    let (img_w, img_h) = natural.as_f64();

    let (width, height) = match constraints.aspect {
        Some(aspect) if aspect.is_finite() && aspect > 0.0 => {
            let mut width = img_w * DEFAULT_CROP_WIDTH_RATIO;
            if width / aspect > img_h {
                width = img_h * aspect;
            }

            let (min, max) = constraints.width_range(natural, aspect);
            if min > max + EDGE_EPSILON {
                return Err(ImageError::Validation(format!(
                    "裁剪约束无法满足：最小宽度 {:.0}px 大于最大宽度 {:.0}px",
                    min, max
                )));
            }

            let width = width.max(min).min(max);
            (width, width / aspect)
        }
        Some(aspect) => {
            return Err(ImageError::Validation(format!("无效的宽高比：{}", aspect)));
        }
        None => {
            let width = (img_w * DEFAULT_CROP_WIDTH_RATIO)
                .max(constraints.min_width as f64)
                .min(constraints.max_width_f64())
                .min(img_w);
            let height = (img_h * DEFAULT_CROP_WIDTH_RATIO)
                .max(constraints.min_height as f64)
                .min(constraints.max_height_f64())
                .min(img_h);
            (width, height)
        }
    };

    Ok(CropRegion::pixels(
        (img_w - width) / 2.0,
        (img_h - height) / 2.0,
        width,
        height,
    ))
}

/// 图像在固定画布上的摆放位置（画布像素，可为负数表示被裁掉）。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Placement {
    /// 取整后的绘制矩形 `(x, y, width, height)`。
    ///
    /// 先取整尺寸，再用整数运算求居中偏移，保证左右（上下）留白最多相差 1px。
    pub fn pixel_rect(&self, canvas: Dimensions) -> (i64, i64, u32, u32) {
        let width = (self.width.round() as u32).max(1);
        let height = (self.height.round() as u32).max(1);
        let x = (canvas.width as i64 - width as i64).div_euclid(2);
        let y = (canvas.height as i64 - height as i64).div_euclid(2);
        (x, y, width, height)
    }
}

/// 先等比适配画布（仅在源图超出画布时缩小），再乘以缩放系数，最后居中。
pub fn fit_then_zoom(source: Dimensions, canvas: Dimensions, zoom: f64) -> Placement {
    let (canvas_w, canvas_h) = canvas.as_f64();
    let (mut width, mut height) = source.as_f64();
    let aspect = width / height;

    if width > canvas_w || height > canvas_h {
        if width / canvas_w > height / canvas_h {
            width = canvas_w;
            height = width / aspect;
        } else {
            height = canvas_h;
            width = height * aspect;
        }
    }

    width *= zoom;
    height *= zoom;

    Placement {
        x: (canvas_w - width) / 2.0,
        y: (canvas_h - height) / 2.0,
        width,
        height,
    }
}
