/// 新建/编辑对话框：是否打开、正在编辑的实体 id、表单数据。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dialog<F> {
    open: bool,
    editing: Option<String>,
    pub form: F,
}

impl<F: Default> Dialog<F> {
    pub fn open_create(&mut self) {
        self.open = true;
        self.editing = None;
        self.form = F::default();
    }

    pub fn open_edit(&mut self, id: impl Into<String>, form: F) {
        self.open = true;
        self.editing = Some(id.into());
        self.form = form;
    }

    /// 关闭并重置表单。
    pub fn close(&mut self) {
        self.open = false;
        self.editing = None;
        self.form = F::default();
    }
}

impl<F> Dialog<F> {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn editing_id(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }
}
