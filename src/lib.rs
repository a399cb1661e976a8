//! # 电商后台管理 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  页面层 (views + nav)                     │
//! │                                                          │
//! │  ProductsView ── CategoriesView ── SubcategoriesView     │
//! │  OrdersView ──── BannersView ───── DashboardView         │
//! │       │  (ListState 错误横幅 + SubmitGuard 单次提交)      │
//! │  SignInView ── auth::guard (protected_route / redirect)  │
//! └───────┼──────────────────────────────────────────────────┘
//!         ↕ Result<T, AppError>
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↕            服务层                                 │
//! │                                                          │
//! │  ┌─ error ────── AppError (统一错误类型)                  │
//! │  │                                                       │
//! │  ├─ config ───── AppConfig (JSON 文件 + 环境变量)         │
//! │  │                                                       │
//! │  ├─ api ──────── ApiClient (reqwest) 端点 + 表单          │
//! │  │                                                       │
//! │  ├─ auth ─────── Credentials + AuthSession 状态机         │
//! │  │   └─ token_store    令牌持久化 (文件 / 内存)           │
//! │  │                                                       │
//! │  └─ image_handler      裁剪 · 缩放 · 编码                 │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError`，所有公开操作的错误类型 |
//! | [`config`] | 后端地址、超时、令牌文件、图片参数 |
//! | [`api`] | REST 客户端：认证、商品、分类、子分类、订单、横幅 |
//! | [`auth`] | 令牌存储、登录态状态机、路由守卫 |
//! | [`image_handler`] | 固定尺寸裁剪、画布缩放、JPEG/PNG 编码 |
//! | [`views`] | 各管理页的列表/对话框/提交状态 |
//! | [`nav`] | 路由路径与侧边栏菜单 |

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod image_handler;
pub mod nav;
pub mod views;
