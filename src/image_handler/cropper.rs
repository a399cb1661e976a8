//! # 裁剪会话模块
//!
//! ## 设计思路
//!
//! 一次“选图 → 拖动/缩放裁剪框 → 提交”对应一个 `CropSession`。
//! 会话持有只读源图与当前裁剪框，每次交互后重新校验；校验未通过时
//! `can_commit()` 为 false，错误以文案形式挂在会话上，而不是直接返回 `Err`。
//!
//! ## 实现思路
//!
//! - `open`：源图小于最小尺寸时只记录校验错误，不产生裁剪框
//! - `set_region / move_by / resize_to`：更新裁剪框并重新校验
//! - `commit_job`：把当前裁剪框换算为源图整数矩形，生成可跨线程执行的 `CropJob`
//! - `CropJob::render`：裁剪 → 高质量重采样到输出尺寸 → 编码

use image::imageops::FilterType;

use super::encoder::{self, OutputSpec};
use super::geometry::{CropConstraints, CropRegion, Dimensions, default_crop_region};
use super::pipeline::resample_exact;
use super::source::{EncodedImage, SourceImage};
use super::ImageError;

/// 交互式裁剪会话。
#[derive(Debug)]
pub struct CropSession {
    source: SourceImage,
    spec: OutputSpec,
    constraints: CropConstraints,
    filter: FilterType,
    region: Option<CropRegion>,
    error: Option<String>,
}

impl CropSession {
    /// 打开会话：校验源图尺寸并初始化默认裁剪框。
    pub fn open(
        source: SourceImage,
        spec: OutputSpec,
        constraints: CropConstraints,
        filter: FilterType,
    ) -> Self {
        let mut session = Self {
            source,
            spec,
            constraints,
            filter,
            region: None,
            error: None,
        };

        if let Err(err) = spec.validate() {
            session.error = Some(err.to_string());
            return session;
        }

        match default_crop_region(session.source.natural(), &session.constraints) {
            Ok(region) => session.region = Some(region),
            Err(err) => {
                log::info!("✂️ 源图不满足裁剪要求：{}", err);
                session.error = Some(err.to_string());
            }
        }

        session
    }

    pub fn source(&self) -> &SourceImage {
        &self.source
    }

    pub fn spec(&self) -> &OutputSpec {
        &self.spec
    }

    pub fn constraints(&self) -> &CropConstraints {
        &self.constraints
    }

    /// 当前裁剪框（源图像素）。
    pub fn region(&self) -> Option<CropRegion> {
        self.region.map(|r| r.to_pixels(self.source.natural()))
    }

    /// 当前待处理的校验错误文案。
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn can_commit(&self) -> bool {
        self.region.is_some() && self.error.is_none()
    }

    /// 以源图坐标（像素或百分比）设置裁剪框。
    pub fn set_region(&mut self, region: CropRegion) {
        self.apply(Ok(region));
    }

    /// 以展示层坐标设置裁剪框：像素坐标按 `natural / displayed` 换算回源图。
    pub fn set_display_region(&mut self, region: CropRegion, displayed: Dimensions) {
        let natural = self.source.natural();
        self.apply(region.scale_to_natural(displayed, natural));
    }

    /// 拖动裁剪框（源图像素），越界时贴边。
    pub fn move_by(&mut self, dx: f64, dy: f64) {
        let Some(current) = self.region() else {
            return;
        };
        let natural = self.source.natural();
        let moved = CropRegion::pixels(current.x + dx, current.y + dy, current.width, current.height)
            .clamp_within(natural);
        self.apply(Ok(moved));
    }

    /// 以中心为锚点调整裁剪框宽度；锁定宽高比时高度随之变化，结果收敛到约束区间内。
    pub fn resize_to(&mut self, width: f64) {
        let Some(current) = self.region() else {
            return;
        };
        let natural = self.source.natural();

        let (new_width, new_height) = match self.constraints.aspect {
            Some(aspect) => {
                let (min, max) = self.constraints.width_range(natural, aspect);
                let w = width.max(min).min(max);
                (w, w / aspect)
            }
            None => (
                width
                    .max(self.constraints.min_width as f64)
                    .min(self.constraints.max_width_f64())
                    .min(natural.width as f64),
                current.height,
            ),
        };

        let cx = current.x + current.width / 2.0;
        let cy = current.y + current.height / 2.0;
        let resized = CropRegion::pixels(
            cx - new_width / 2.0,
            cy - new_height / 2.0,
            new_width,
            new_height,
        )
        .clamp_within(natural);

        self.apply(Ok(resized));
    }

    /// 源图过小或输出规格非法时，会话整体处于拒绝状态，交互不再生效。
    fn is_rejected(&self) -> bool {
        self.spec.validate().is_err() || self.constraints.check_source(self.source.natural()).is_err()
    }

    fn apply(&mut self, region: Result<CropRegion, ImageError>) {
        if self.is_rejected() {
            return;
        }

        let region = match region {
            Ok(region) => region,
            Err(err) => {
                self.error = Some(err.to_string());
                return;
            }
        };

        // 非法裁剪框依然保留（界面需要显示框的位置），但提交被禁用。
        self.error = self.validate_region(region).err().map(|err| err.to_string());
        self.region = Some(region);
    }

    fn validate_region(&self, region: CropRegion) -> Result<(), ImageError> {
        let natural = self.source.natural();
        region.validate(natural, self.constraints.aspect)?;

        let px = region.to_pixels(natural);
        if px.width + 0.5 < self.constraints.min_width as f64
            || px.height + 0.5 < self.constraints.min_height as f64
        {
            return Err(ImageError::Validation(format!(
                "裁剪区域过小：最小 {}x{}px",
                self.constraints.min_width, self.constraints.min_height
            )));
        }
        if let Some(max) = self.constraints.max_width {
            if px.width - 0.5 > max as f64 {
                return Err(ImageError::Validation(format!("裁剪区域宽度不能超过 {}px", max)));
            }
        }
        if let Some(max) = self.constraints.max_height {
            if px.height - 0.5 > max as f64 {
                return Err(ImageError::Validation(format!("裁剪区域高度不能超过 {}px", max)));
            }
        }
        Ok(())
    }

    /// 生成提交任务。校验未通过时返回 `Validation`，会话保持可用。
    pub fn commit_job(&self) -> Result<CropJob, ImageError> {
        if let Some(error) = &self.error {
            return Err(ImageError::Validation(error.clone()));
        }
        let region = self
            .region
            .ok_or_else(|| ImageError::Validation("请选择裁剪区域".to_string()))?;
        self.validate_region(region)?;

        Ok(CropJob {
            source: self.source.clone(),
            rect: region.to_pixel_rect(self.source.natural()),
            spec: self.spec,
            filter: self.filter,
        })
    }

    /// 同步提交：直接在当前线程渲染并编码。
    pub fn commit(&self) -> Result<EncodedImage, ImageError> {
        self.commit_job()?.render()
    }
}

/// 可在阻塞线程执行的裁剪任务。
#[derive(Debug, Clone)]
pub struct CropJob {
    source: SourceImage,
    rect: (u32, u32, u32, u32),
    spec: OutputSpec,
    filter: FilterType,
}

impl CropJob {
    /// 源图中的整数裁剪矩形 `(x, y, width, height)`。
    pub fn rect(&self) -> (u32, u32, u32, u32) {
        self.rect
    }

    pub fn render(self) -> Result<EncodedImage, ImageError> {
        let (x, y, width, height) = self.rect;
        let cropped = self.source.image.crop_imm(x, y, width, height);
        let output = resample_exact(&cropped, self.spec.width, self.spec.height, self.filter);

        log::info!(
            "✂️ 裁剪完成 - 源图: {} 区域: {}x{}+{}+{} 输出: {}x{} {:?}",
            self.source.natural(),
            width,
            height,
            x,
            y,
            self.spec.width,
            self.spec.height,
            self.spec.format
        );

        encoder::encode(&output, self.spec.format, self.spec.quality, self.source.file_name())
    }
}
