use super::dialog::Dialog;
use super::list_state::ListState;
use super::submit_guard::{Completed, PendingSubmit, SubmitGuard, SubmitOutcome};
use crate::api::{ApiClient, Category, CategoryForm, UploadFile};
use crate::error::AppError;

#[derive(Debug)]
pub struct CategoriesView {
    api: ApiClient,
    pub list: ListState<Category>,
    pub dialog: Dialog<CategoryForm>,
    guard: SubmitGuard,
}

impl CategoriesView {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            list: ListState::new(),
            dialog: Dialog::default(),
            guard: SubmitGuard::new(),
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.guard.is_busy()
    }

    pub async fn refresh(&mut self) {
        self.list.loading = true;
        let result = self.api.get_categories().await;
        self.list.apply(result);
    }

    pub fn open_create(&mut self) {
        self.guard.cancel();
        self.dialog.open_create();
    }

    pub fn open_edit(&mut self, id: &str) -> Result<(), AppError> {
        let category = self
            .list
            .items
            .iter()
            .find(|category| category.id == id)
            .ok_or_else(|| AppError::Validation(format!("分类不存在: {}", id)))?;
        let form = CategoryForm::from_category(category);
        self.guard.cancel();
        self.dialog.open_edit(id, form);
        Ok(())
    }

    pub fn close_dialog(&mut self) {
        self.guard.cancel();
        self.dialog.close();
    }

    /// 选了新图片时改用 multipart 提交。
    pub fn set_image(&mut self, image: UploadFile) {
        self.dialog.form.image = Some(image);
    }

    pub fn begin_submit(&mut self) -> Option<PendingSubmit<Category>> {
        if !self.dialog.is_open() {
            return None;
        }
        let ticket = self.guard.begin()?;
        let api = self.api.clone();
        let form = self.dialog.form.clone();
        let editing = self.dialog.editing_id().map(str::to_string);

        Some(ticket.run(async move {
            form.validate()?;
            match (editing, form.has_upload()) {
                (Some(id), true) => api.update_category_with_image(&id, &form).await,
                (Some(id), false) => api.update_category(&id, &form.to_input()).await,
                (None, true) => api.create_category_with_image(&form).await,
                (None, false) => api.create_category(&form.to_input()).await,
            }
        }))
    }

    pub async fn finish_submit(&mut self, completed: Completed<Category>) -> SubmitOutcome {
        match completed.into_result() {
            Ok(category) => {
                log::info!("✅ 分类已保存 - {}", category.title);
                self.refresh().await;
                self.dialog.close();
                SubmitOutcome::Saved
            }
            Err(AppError::Cancelled) => SubmitOutcome::Discarded,
            Err(err) => {
                let message = err.to_string();
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
        self.finish_submit(completed).await
    }

    pub async fn delete(&mut self, id: &str) -> Result<(), AppError> {
        match self.api.delete_category(id).await {
            Ok(_) => {
                log::info!("🗑️ 分类已删除 - {}", id);
                self.refresh().await;
                Ok(())
            }
            Err(err) => {
                self.list.fail(err.to_string());
                Err(err)
            }
        }
    }
}
