use super::dialog::Dialog;
use super::list_state::ListState;
use super::submit_guard::{Completed, PendingSubmit, SubmitGuard, SubmitOutcome};
use crate::api::{ApiClient, Category, Subcategory, SubcategoryInput};
use crate::error::AppError;

const UNKNOWN_CATEGORY: &str = "Unknown";

/// 子分类管理页。分类列表单独加载，失败只写错误横幅，不影响子分类列表。
#[derive(Debug)]
pub struct SubcategoriesView {
    api: ApiClient,
    pub list: ListState<Subcategory>,
    categories: Vec<Category>,
    pub dialog: Dialog<SubcategoryInput>,
    guard: SubmitGuard,
}

impl SubcategoriesView {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            list: ListState::new(),
            categories: Vec::new(),
            dialog: Dialog::default(),
            guard: SubmitGuard::new(),
        }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn is_submitting(&self) -> bool {
        self.guard.is_busy()
    }

    pub async fn refresh(&mut self) {
        self.list.loading = true;
        let (subcategories, categories) = tokio::join!(
            self.api.get_subcategories(),
            self.api.get_categories()
        );

        self.list.apply(subcategories);
        match categories {
            Ok(categories) => self.categories = categories,
            Err(err) => self.list.fail(err.to_string()),
        }
    }

    /// 子分类所属分类的标题；优先使用响应里内嵌的分类。
    pub fn category_name<'a>(&'a self, subcategory: &'a Subcategory) -> &'a str {
        if let Some(category) = &subcategory.category {
            return &category.title;
        }
        self.categories
            .iter()
            .find(|category| category.id == subcategory.category_id)
            .map(|category| category.title.as_str())
            .unwrap_or(UNKNOWN_CATEGORY)
    }

    pub fn open_create(&mut self) {
        self.guard.cancel();
        self.dialog.open_create();
    }

    pub fn open_edit(&mut self, id: &str) -> Result<(), AppError> {
        let subcategory = self
            .list
            .items
            .iter()
            .find(|subcategory| subcategory.id == id)
            .ok_or_else(|| AppError::Validation(format!("子分类不存在: {}", id)))?;
        let form = SubcategoryInput {
            title: subcategory.title.clone(),
            category_id: subcategory.category_id.clone(),
        };
        self.guard.cancel();
        self.dialog.open_edit(id, form);
        Ok(())
    }

    pub fn close_dialog(&mut self) {
        self.guard.cancel();
        self.dialog.close();
    }

    pub fn begin_submit(&mut self) -> Option<PendingSubmit<Subcategory>> {
        if !self.dialog.is_open() {
            return None;
        }
        let ticket = self.guard.begin()?;
        let api = self.api.clone();
        let input = self.dialog.form.clone();
        let editing = self.dialog.editing_id().map(str::to_string);

        Some(ticket.run(async move {
            validate(&input)?;
            match editing {
                Some(id) => api.update_subcategory(&id, &input).await,
                None => api.create_subcategory(&input).await,
            }
        }))
    }

    pub async fn finish_submit(&mut self, completed: Completed<Subcategory>) -> SubmitOutcome {
        match completed.into_result() {
            Ok(subcategory) => {
                log::info!("✅ 子分类已保存 - {}", subcategory.title);
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
        match self.api.delete_subcategory(id).await {
            Ok(_) => {
                log::info!("🗑️ 子分类已删除 - {}", id);
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

fn validate(input: &SubcategoryInput) -> Result<(), AppError> {
    if input.title.trim().is_empty() {
        return Err(AppError::Validation("子分类标题不能为空".to_string()));
    }
    if input.category_id.is_empty() {
        return Err(AppError::Validation("请选择所属分类".to_string()));
    }
    Ok(())
}
