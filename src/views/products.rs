use super::dialog::Dialog;
use super::list_state::ListState;
use super::submit_guard::{Completed, PendingSubmit, SubmitGuard, SubmitOutcome};
use crate::api::{ApiClient, Category, PageMeta, PageQuery, Product, ProductForm, UploadFile};
use crate::error::AppError;

/// 商品管理页：商品列表 + 分类下拉数据 + 新建/编辑对话框。
#[derive(Debug)]
pub struct ProductsView {
    api: ApiClient,
    pub list: ListState<Product>,
    categories: Vec<Category>,
    meta: PageMeta,
    query: PageQuery,
    pub dialog: Dialog<ProductForm>,
    guard: SubmitGuard,
}

impl ProductsView {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            list: ListState::new(),
            categories: Vec::new(),
            meta: PageMeta::default(),
            query: PageQuery::default(),
            dialog: Dialog::default(),
            guard: SubmitGuard::new(),
        }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn meta(&self) -> &PageMeta {
        &self.meta
    }

    pub fn set_query(&mut self, query: PageQuery) {
        self.query = query;
    }

    pub fn is_submitting(&self) -> bool {
        self.guard.is_busy()
    }

    /// 并发拉取商品与分类；任一失败都显示错误并保留旧数据。
    pub async fn refresh(&mut self) {
        self.list.loading = true;
        let (products, categories) = tokio::join!(
            self.api.get_products(self.query),
            self.api.get_categories()
        );

        match (products, categories) {
            (Ok(page), Ok(categories)) => {
                self.meta = page.meta;
                self.categories = categories;
                self.list.apply(Ok(page.data));
            }
            (Err(err), _) | (_, Err(err)) => self.list.apply(Err(err)),
        }
    }

    pub fn open_create(&mut self) {
        self.guard.cancel();
        self.dialog.open_create();
    }

    pub fn open_edit(&mut self, id: &str) -> Result<(), AppError> {
        let product = self
            .list
            .items
            .iter()
            .find(|product| product.id == id)
            .ok_or_else(|| AppError::Validation(format!("商品不存在: {}", id)))?;
        let form = ProductForm::from_product(product);
        self.guard.cancel();
        self.dialog.open_edit(id, form);
        Ok(())
    }

    pub fn close_dialog(&mut self) {
        self.guard.cancel();
        self.dialog.close();
    }

    /// 追加图片；超过上限时整批拒绝，并把提示写入错误横幅。
    pub fn add_images(&mut self, files: Vec<UploadFile>) -> bool {
        match self.dialog.form.add_images(files) {
            Ok(()) => true,
            Err(err) => {
                self.list.fail(err.to_string());
                false
            }
        }
    }

    pub fn begin_submit(&mut self) -> Option<PendingSubmit<Product>> {
        if !self.dialog.is_open() {
            return None;
        }
        let ticket = self.guard.begin()?;
        let api = self.api.clone();
        let form = self.dialog.form.clone();
        let editing = self.dialog.editing_id().map(str::to_string);

        Some(ticket.run(async move {
            match editing {
                Some(id) => api.update_product(&id, &form).await,
                None => api.create_product(&form).await,
            }
        }))
    }

    pub async fn finish_submit(&mut self, completed: Completed<Product>) -> SubmitOutcome {
        match completed.into_result() {
            Ok(product) => {
                log::info!("✅ 商品已保存 - {}", product.title);
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
        match self.api.delete_product(id).await {
            Ok(_) => {
                log::info!("🗑️ 商品已删除 - {}", id);
                self.refresh().await;
                Ok(())
            }
            Err(err) => {
                self.list.fail(err.to_string());
                Err(err)
            }
        }
    }

    /// 分类 id 对应的标题。
    pub fn category_title(&self, category_id: &str) -> Option<&str> {
        self.categories
            .iter()
            .find(|category| category.id == category_id)
            .map(|category| category.title.as_str())
    }
}
