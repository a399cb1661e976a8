//! 横幅管理页。
//!
//! 选图后先进入裁剪会话，裁剪结果作为 `image` 字段上传；
//! 保存成功后就地更新列表（新建插到最前），不重新拉取。

use super::dialog::Dialog;
use super::list_state::ListState;
use super::submit_guard::{Completed, PendingSubmit, SubmitGuard, SubmitOutcome};
use crate::api::{ApiClient, Banner, BannerForm, UploadFile};
use crate::error::AppError;
use crate::image_handler::{CropSession, ImageService, ImageSource};

const LOAD_FAILED: &str = "Failed to load banners. Please try again.";
const SAVE_FAILED: &str = "Failed to save banner. Please try again.";
const DELETE_FAILED: &str = "Failed to delete banner. Please try again.";
const TOGGLE_FAILED: &str = "Failed to update status. Please try again.";

#[derive(Debug)]
pub struct BannersView {
    api: ApiClient,
    images: ImageService,
    pub list: ListState<Banner>,
    pub dialog: Dialog<BannerForm>,
    cropper: Option<CropSession>,
    guard: SubmitGuard,
}

impl BannersView {
    pub fn new(api: ApiClient, images: ImageService) -> Self {
        Self {
            api,
            images,
            list: ListState::new(),
            dialog: Dialog::default(),
            cropper: None,
            guard: SubmitGuard::new(),
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.guard.is_busy()
    }

    pub fn can_submit(&self) -> bool {
        self.dialog.is_open() && self.dialog.form.is_valid() && !self.guard.is_busy()
    }

    pub async fn refresh(&mut self) {
        self.list.loading = true;
        match self.api.get_banners().await {
            Ok(banners) => self.list.apply(Ok(banners)),
            Err(err) => {
                log::error!("❌ 加载横幅失败: {}", err);
                self.list.loading = false;
                self.list.fail(LOAD_FAILED);
            }
        }
    }

    pub fn open_create(&mut self) {
        self.guard.cancel();
        self.cropper = None;
        self.dialog.open_create();
    }

    pub fn open_edit(&mut self, id: &str) -> Result<(), AppError> {
        let banner = self
            .list
            .items
            .iter()
            .find(|banner| banner.id == id)
            .ok_or_else(|| AppError::Validation(format!("横幅不存在: {}", id)))?;
        let form = BannerForm::from_banner(banner);
        self.guard.cancel();
        self.cropper = None;
        self.dialog.open_edit(id, form);
        Ok(())
    }

    pub fn close_dialog(&mut self) {
        self.guard.cancel();
        self.cropper = None;
        self.dialog.close();
    }

    // ---------------------------------------------------------------- 裁剪

    /// 载入选中的图片并打开裁剪会话（默认商品图规格）。
    pub async fn select_image(&mut self, source: ImageSource) -> Result<(), AppError> {
        let image = self.images.load(source).await?;
        let session = self.images.handler().open_crop(image, None)?;
        self.cropper = Some(session);
        Ok(())
    }

    pub fn cropper(&self) -> Option<&CropSession> {
        self.cropper.as_ref()
    }

    pub fn cropper_mut(&mut self) -> Option<&mut CropSession> {
        self.cropper.as_mut()
    }

    pub fn cancel_crop(&mut self) {
        self.cropper = None;
    }

    /// 提交裁剪，结果设置为表单图片并关闭裁剪会话。
    ///
    /// 裁剪区域不合法时会话保持打开，由用户继续调整。
    pub async fn complete_crop(&mut self) -> Result<(), AppError> {
        let Some(session) = self.cropper.as_ref() else {
            return Err(AppError::Validation("没有正在进行的裁剪".to_string()));
        };
        let encoded = self.images.commit_crop(session).await?;
        log::info!(
            "✂️ 横幅图片裁剪完成 - {} ({}x{})",
            encoded.file_name,
            encoded.width,
            encoded.height
        );
        self.dialog.form.set_image(UploadFile::from(encoded));
        self.cropper = None;
        Ok(())
    }

    // ---------------------------------------------------------------- 提交

    /// 结果附带“是否为编辑”，由提交时的对话框决定。
    pub fn begin_submit(&mut self) -> Option<PendingSubmit<(bool, Banner)>> {
        if !self.dialog.is_open() {
            return None;
        }
        let ticket = self.guard.begin()?;
        let api = self.api.clone();
        let form = self.dialog.form.clone();
        let editing = self.dialog.editing_id().map(str::to_string);

        Some(ticket.run(async move {
            match editing {
                Some(id) => api.update_banner(&id, &form).await.map(|banner| (true, banner)),
                None => api.create_banner(&form).await.map(|banner| (false, banner)),
            }
        }))
    }

    pub fn finish_submit(&mut self, completed: Completed<(bool, Banner)>) -> SubmitOutcome {
        match completed.into_result() {
            Ok((editing, banner)) => {
                log::info!("✅ 横幅已保存 - {}", banner.id);
                if editing {
                    self.replace(banner);
                } else {
                    self.list.items.insert(0, banner);
                }
                self.close_dialog();
                SubmitOutcome::Saved
            }
            Err(AppError::Cancelled) => SubmitOutcome::Discarded,
            Err(err) => {
                log::error!("❌ 保存横幅失败: {}", err);
                let message = match err {
                    AppError::Validation(message) => message,
                    _ => SAVE_FAILED.to_string(),
                };
                self.list.fail(message.clone());
                SubmitOutcome::Failed(message)
            }
        }
    }

    pub async fn submit(&mut self) -> SubmitOutcome {
        let Some(pending) = self.begin_submit() else {
            return SubmitOutcome::Skipped;
        };
        let completed = pending.await;
        self.finish_submit(completed)
    }

    // ---------------------------------------------------------------- 列表操作

    /// 切换启用状态，只提交 `isActive`。
    pub async fn toggle_active(&mut self, id: &str) -> Result<(), AppError> {
        let Some(banner) = self.list.items.iter().find(|banner| banner.id == id) else {
            return Ok(());
        };
        let next = !banner.active();

        match self.api.set_banner_active(id, next).await {
            Ok(updated) => {
                log::info!("🔁 横幅 {} 启用状态 -> {}", id, next);
                self.replace(updated);
                Ok(())
            }
            Err(err) => {
                log::error!("❌ 更新横幅状态失败: {}", err);
                self.list.fail(TOGGLE_FAILED);
                Err(err)
            }
        }
    }

    pub async fn delete(&mut self, id: &str) -> Result<(), AppError> {
        match self.api.delete_banner(id).await {
            Ok(_) => {
                log::info!("🗑️ 横幅已删除 - {}", id);
                self.list.items.retain(|banner| banner.id != id);
                Ok(())
            }
            Err(err) => {
                log::error!("❌ 删除横幅失败: {}", err);
                self.list.fail(DELETE_FAILED);
                Err(err)
            }
        }
    }

    fn replace(&mut self, updated: Banner) {
        if let Some(slot) = self
            .list
            .items
            .iter_mut()
            .find(|banner| banner.id == updated.id)
        {
            *slot = updated;
        }
    }
}
