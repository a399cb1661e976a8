//! 业务端点：认证、商品、分类、子分类、订单、横幅、首页公开数据。

use reqwest::Method;

use super::client::ApiClient;
use super::forms::{BannerForm, CategoryForm, ProductForm};
use super::models::{
    Banner, Category, CategoryInput, DashboardStats, LoginCredentials, LoginResponse,
    MessageResponse, Order, OrderPage, OrderQuery, OrderStatus, PageQuery, Product, ProductList,
    ProductPage, StatusUpdate, Subcategory, SubcategoryInput,
};
use crate::error::AppError;

impl ApiClient {
    // ---------------------------------------------------------------- 认证

    /// 登录并保存令牌。
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<LoginResponse, AppError> {
        log::info!("🔐 登录中 - {}", credentials.email);
        let response: LoginResponse = self
            .send_json(Method::POST, "/admin/login", credentials)
            .await?;
        self.credentials().set(&response.access_token)?;
        log::info!("✅ 登录成功 - {} ({})", response.email, response.role);
        Ok(response)
    }

    /// 后端没有专门的校验端点，用一次带令牌的 `GET /categories` 代替。
    pub async fn verify_token(&self) -> Result<(), AppError> {
        if !self.credentials().has_token() {
            return Err(AppError::Validation("No token available".to_string()));
        }
        let _: serde_json::Value = self.get_json("/categories").await?;
        Ok(())
    }

    pub fn logout(&self) -> Result<(), AppError> {
        self.credentials().clear()
    }

    // ---------------------------------------------------------------- 商品

    pub async fn get_products(&self, query: PageQuery) -> Result<ProductPage, AppError> {
        let url = self.url_with_query(
            "/products",
            &[
                ("page", query.page.map(|p| p.to_string())),
                ("limit", query.limit.map(|l| l.to_string())),
            ],
        )?;
        let list: ProductList = self.get_json_url(url).await?;
        Ok(list.into_page())
    }

    pub async fn get_product(&self, id: &str) -> Result<Product, AppError> {
        self.get_json(&format!("/products/{}", id)).await
    }

    pub async fn create_product(&self, form: &ProductForm) -> Result<Product, AppError> {
        self.send_multipart(Method::POST, "/products", form.to_multipart()?)
            .await
    }

    pub async fn update_product(&self, id: &str, form: &ProductForm) -> Result<Product, AppError> {
        self.send_multipart(Method::PUT, &format!("/products/{}", id), form.to_multipart()?)
            .await
    }

    pub async fn delete_product(&self, id: &str) -> Result<MessageResponse, AppError> {
        self.delete(&format!("/products/{}", id)).await
    }

    // ---------------------------------------------------------------- 分类

    pub async fn get_categories(&self) -> Result<Vec<Category>, AppError> {
        self.get_json("/categories").await
    }

    pub async fn get_category(&self, id: &str) -> Result<Category, AppError> {
        self.get_json(&format!("/categories/{}", id)).await
    }

    pub async fn create_category(&self, input: &CategoryInput) -> Result<Category, AppError> {
        self.send_json(Method::POST, "/categories", input).await
    }

    pub async fn update_category(&self, id: &str, input: &CategoryInput) -> Result<Category, AppError> {
        self.send_json(Method::PUT, &format!("/categories/{}", id), input)
            .await
    }

    pub async fn create_category_with_image(&self, form: &CategoryForm) -> Result<Category, AppError> {
        self.send_multipart(Method::POST, "/categories", form.to_multipart()?)
            .await
    }

    pub async fn update_category_with_image(
        &self,
        id: &str,
        form: &CategoryForm,
    ) -> Result<Category, AppError> {
        self.send_multipart(Method::PUT, &format!("/categories/{}", id), form.to_multipart()?)
            .await
    }

    pub async fn delete_category(&self, id: &str) -> Result<MessageResponse, AppError> {
        self.delete(&format!("/categories/{}", id)).await
    }

    // ---------------------------------------------------------------- 子分类

    pub async fn get_subcategories(&self) -> Result<Vec<Subcategory>, AppError> {
        self.get_json("/subcategories").await
    }

    pub async fn create_subcategory(&self, input: &SubcategoryInput) -> Result<Subcategory, AppError> {
        self.send_json(Method::POST, "/subcategories", input).await
    }

    pub async fn update_subcategory(
        &self,
        id: &str,
        input: &SubcategoryInput,
    ) -> Result<Subcategory, AppError> {
        self.send_json(Method::PUT, &format!("/subcategories/{}", id), input)
            .await
    }

    pub async fn delete_subcategory(&self, id: &str) -> Result<MessageResponse, AppError> {
        self.delete(&format!("/subcategories/{}", id)).await
    }

    // ---------------------------------------------------------------- 订单

    pub async fn get_orders(&self, query: OrderQuery) -> Result<OrderPage, AppError> {
        let url = self.url_with_query(
            "/orders",
            &[
                ("status", query.status.map(|s| s.as_str().to_string())),
                ("page", query.page.map(|p| p.to_string())),
                ("limit", query.limit.map(|l| l.to_string())),
            ],
        )?;
        self.get_json_url(url).await
    }

    pub async fn get_order(&self, id: &str) -> Result<Order, AppError> {
        self.get_json(&format!("/orders/{}", id)).await
    }

    pub async fn update_order_status(&self, id: &str, status: OrderStatus) -> Result<Order, AppError> {
        self.send_json(
            Method::PATCH,
            &format!("/orders/{}/status", id),
            &StatusUpdate { status },
        )
        .await
    }

    pub async fn delete_order(&self, id: &str) -> Result<MessageResponse, AppError> {
        self.delete(&format!("/orders/{}", id)).await
    }

    pub async fn get_dashboard_stats(&self) -> Result<DashboardStats, AppError> {
        self.get_json("/orders/statistics/dashboard").await
    }

    // ---------------------------------------------------------------- 横幅

    pub async fn get_banners(&self) -> Result<Vec<Banner>, AppError> {
        self.get_json("/banners").await
    }

    pub async fn create_banner(&self, form: &BannerForm) -> Result<Banner, AppError> {
        self.send_multipart(Method::POST, "/banners", form.to_multipart()?)
            .await
    }

    pub async fn update_banner(&self, id: &str, form: &BannerForm) -> Result<Banner, AppError> {
        self.send_multipart(Method::PUT, &format!("/banners/{}", id), form.to_multipart()?)
            .await
    }

    /// 只提交 `isActive` 字段。
    pub async fn set_banner_active(&self, id: &str, is_active: bool) -> Result<Banner, AppError> {
        self.send_multipart(
            Method::PUT,
            &format!("/banners/{}", id),
            BannerForm::status_only(is_active),
        )
        .await
    }

    pub async fn delete_banner(&self, id: &str) -> Result<MessageResponse, AppError> {
        self.delete(&format!("/banners/{}", id)).await
    }

    // ---------------------------------------------------------------- 首页公开数据

    pub async fn get_public_categories(&self) -> Result<Vec<Category>, AppError> {
        self.get_json("/home/categories").await
    }

    pub async fn get_featured_products(&self) -> Result<Vec<Product>, AppError> {
        self.get_json("/home/slider").await
    }

    pub async fn get_best_sellers(&self) -> Result<Vec<Product>, AppError> {
        self.get_json("/home/best-seller").await
    }

    pub async fn get_best_select(&self) -> Result<Vec<Product>, AppError> {
        self.get_json("/home/best-select").await
    }
}
