//! # 后端 API 模块（api）
//!
//! - `client`：传输层（URL、令牌、错误转换）
//! - `endpoints`：按业务实体划分的端点方法
//! - `models`：请求/响应模型
//! - `forms`：multipart 表单构建与输入校验

mod client;
mod endpoints;
mod forms;
mod models;

pub use client::ApiClient;
pub use forms::{
    BannerForm, CategoryForm, DEFAULT_BANNER_PRIORITY, MAX_PRODUCT_IMAGES, ProductForm, UploadFile,
};
pub use models::{
    Banner, Category, CategoryInput, DashboardStats, LoginCredentials, LoginResponse,
    MessageResponse, MonthlyRevenue, Order, OrderItem, OrderPage, OrderQuery, OrderStatus,
    OrdersByStatus, PageMeta, PageQuery, Product, ProductList, ProductPage, ShippingAddress,
    Subcategory, SubcategoryInput,
};
