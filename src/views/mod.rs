//! # 页面视图（views）
//!
//! 每个管理页都是同一套流程：
//!
//! ```text
//! refresh()（拉取列表）→ open_create()/open_edit(id)（打开对话框）
//!   → submit()（begin_submit → 请求 → finish_submit）→ 重新拉取 / 就地更新
//! ```
//!
//! 失败只写入错误横幅（`ListState::error`），不会 panic。
//! `begin_submit()` 返回的 future 不借用视图，可以在等待期间关闭对话框；
//! 关闭后回来的结果会被丢弃。

mod banners;
mod categories;
mod dashboard;
mod dialog;
mod list_state;
mod orders;
mod products;
mod sign_in;
mod subcategories;
mod submit_guard;

pub use banners::BannersView;
pub use categories::CategoriesView;
pub use dashboard::{DashboardView, format_revenue};
pub use dialog::Dialog;
pub use list_state::ListState;
pub use orders::OrdersView;
pub use products::ProductsView;
pub use sign_in::SignInView;
pub use subcategories::SubcategoriesView;
pub use submit_guard::{Completed, PendingSubmit, SubmitGuard, SubmitOutcome, SubmitTicket};
