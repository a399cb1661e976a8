//! # 图片处理模块（image_handler）
//!
//! ## 设计思路
//!
//! 该模块将“图片来源识别 → 加载校验 → 解码 → 交互式裁剪/缩放 → 编码输出”
//! 按职责拆分为多个子模块，避免单文件膨胀与耦合。
//!
//! - `service`：异步入口，把重活投递到阻塞线程
//! - `handler`：编排整条处理流水线
//! - `loader`：负责文件/Base64/字节加载与安全校验
//! - `pipeline`：负责解码、像素限制、高质量重采样
//! - `geometry`：裁剪框与缩放占位的纯几何计算
//! - `cropper` / `resizer`：两种交互会话
//! - `encoder`：输出规格与编码
//! - `config/error/source`：配置、错误、中间数据模型
//!
//! ## 实现思路
//!
//! 对外仅暴露必要类型，内部细节保持 `mod` 私有。
//!
//! ## 新同事快速上手
//!
//! 可以按下面顺序理解调用链：
//!
//! ```text
//! 视图层（选图）
//!    ↓
//! service.rs（spawn_blocking）
//!    ↓
//! handler.rs（统一编排 + 阶段耗时日志）
//!    ├─ loader.rs（来源加载 + 体积/签名校验）
//!    ├─ pipeline.rs（解码 + 像素限制）
//!    └─ cropper.rs / resizer.rs（交互会话）
//!          ├─ geometry.rs（裁剪框 / 占位计算）
//!          └─ encoder.rs（编码为 EncodedImage）
//!    ↓
//! 视图层（作为 multipart 文件上传）
//! ```
//!
//! ## 分层职责建议
//!
//! - 配置与策略变更优先改 `config.rs`
//! - 业务流程顺序变更优先改 `handler.rs`
//! - 坐标换算、默认裁剪框问题优先看 `geometry.rs`
//! - 输出格式/质量问题优先看 `encoder.rs`

mod config;
mod cropper;
mod encoder;
mod error;
mod geometry;
mod handler;
mod loader;
mod pipeline;
mod resizer;
mod service;
mod source;

pub use config::{ImageConfig, ImagePerformanceProfile};
pub use cropper::{CropJob, CropSession};
pub use encoder::{OutputFormat, OutputSpec};
pub use error::ImageError;
pub use geometry::{
    ASPECT_TOLERANCE, CropConstraints, CropRegion, CropUnit, Dimensions, Placement,
    default_crop_region, fit_then_zoom,
};
pub use handler::ImageHandler;
pub use resizer::{ResizeJob, ResizeSession, ZOOM_STEP_FACTOR, ZoomRange};
pub use service::ImageService;
pub use source::{EncodedImage, ImageSource, SourceImage};
