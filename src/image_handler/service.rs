//! # 服务层（异步入口）
//!
//! ## 设计思路
//!
//! 视图层运行在 tokio 上，而解码、重采样、编码都是 CPU 密集的同步操作。
//! `ImageService` 持有共享的 `ImageHandler`，把这些操作统一投递到
//! `spawn_blocking`，避免阻塞异步运行时。
//!
//! ## 实现思路
//!
//! 会话本身（拖动、缩放）是纯计算，调用方直接同步调用；只有
//! `load` 与 `commit_*` 需要异步化。提交时先在当前线程生成独立的任务（`CropJob` /
//! `ResizeJob`），再把任务移动到阻塞线程执行，会话本身不跨线程。

use std::sync::Arc;

use tokio::task::JoinError;

use super::cropper::CropSession;
use super::encoder::OutputSpec;
use super::geometry::{CropRegion, Dimensions};
use super::resizer::ResizeSession;
use super::source::{EncodedImage, SourceImage};
use super::{ImageConfig, ImageError, ImageHandler, ImageSource};

/// 图片处理服务。
///
/// 可廉价克隆，多个视图共享同一份配置。
#[derive(Debug, Clone)]
pub struct ImageService {
    handler: Arc<ImageHandler>,
}

impl Default for ImageService {
    fn default() -> Self {
        Self::with_config(ImageConfig::default())
    }
}

impl ImageService {
    /// 使用自定义配置创建服务。
    ///
    /// # 示例
    /// ```rust
    /// use shop_admin::image_handler::{ImageConfig, ImageService};
    ///
    /// let mut config = ImageConfig::default();
    /// config.crop_output_size = 600;
    /// let service = ImageService::with_config(config);
    /// assert_eq!(service.handler().default_crop_spec()?.width, 600);
    /// # Ok::<(), shop_admin::image_handler::ImageError>(())
    /// ```
    pub fn with_config(config: ImageConfig) -> Self {
        Self {
            handler: Arc::new(ImageHandler::new(config)),
        }
    }

    /// 同步 API 入口（打开会话、切换档位）。
    pub fn handler(&self) -> &ImageHandler {
        &self.handler
    }

    /// 在阻塞线程中加载并解码源图。
    pub async fn load(&self, source: ImageSource) -> Result<SourceImage, ImageError> {
        let handler = Arc::clone(&self.handler);
        tokio::task::spawn_blocking(move || handler.load_source(source))
            .await
            .map_err(join_error)?
    }

    /// 提交裁剪会话。校验失败会立即返回，不占用阻塞线程。
    pub async fn commit_crop(&self, session: &CropSession) -> Result<EncodedImage, ImageError> {
        let job = session.commit_job()?;
        tokio::task::spawn_blocking(move || job.render())
            .await
            .map_err(join_error)?
    }

    /// 提交缩放会话。
    pub async fn commit_resize(&self, session: &ResizeSession) -> Result<EncodedImage, ImageError> {
        let job = session.commit_job()?;
        tokio::task::spawn_blocking(move || job.render())
            .await
            .map_err(join_error)?
    }

    /// 一次性裁剪（命令行与批量上传使用）。
    pub async fn crop_to_spec(
        &self,
        source: ImageSource,
        spec: Option<OutputSpec>,
        region: Option<CropRegion>,
    ) -> Result<EncodedImage, ImageError> {
        let handler = Arc::clone(&self.handler);
        tokio::task::spawn_blocking(move || handler.crop_to_spec(source, spec, region))
            .await
            .map_err(join_error)?
    }

    /// 一次性缩放到画布。
    pub async fn resize_to_canvas(
        &self,
        source: ImageSource,
        canvas: Option<Dimensions>,
        zoom: f64,
        quality: Option<f32>,
    ) -> Result<EncodedImage, ImageError> {
        let handler = Arc::clone(&self.handler);
        tokio::task::spawn_blocking(move || handler.resize_to_canvas(source, canvas, zoom, quality))
            .await
            .map_err(join_error)?
    }
}

fn join_error(err: JoinError) -> ImageError {
    log::error!("❌ 图片后台任务异常终止：{}", err);
    ImageError::Unsupported(format!("图片后台任务异常终止：{}", err))
}
