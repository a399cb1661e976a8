//! 后端 REST API 的请求/响应模型。
//!
//! 字段名与后端 JSON 保持一致（camelCase），可选字段缺省时回落为 `None` / 默认值。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub email: String,
    pub role: String,
}

/// 删除等操作返回的 `{ "message": "..." }`。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

/// 分页信息。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageMeta {
    pub has_next: bool,
    pub has_previous: bool,
    pub limit: u32,
    pub page: u32,
    pub pages: u32,
    pub total: u64,
}

/// 分页查询参数；为空的字段不会出现在查询串中。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageQuery {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
    pub stock: i64,
    pub category_id: String,
    #[serde(default)]
    pub is_featured: Option<bool>,
    #[serde(default)]
    pub is_best_seller: Option<bool>,
    #[serde(default)]
    pub is_best_select: Option<bool>,
    #[serde(default)]
    pub priority: Option<i64>,
    #[serde(default)]
    pub image_urls: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPage {
    pub data: Vec<Product>,
    #[serde(default)]
    pub meta: PageMeta,
}

/// 商品列表响应。
///
/// 分页接口返回 `{ data, meta }`；部分后端版本直接返回数组，两种形态都接受。
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ProductList {
    Paged(ProductPage),
    Plain(Vec<Product>),
}

impl ProductList {
    pub fn into_page(self) -> ProductPage {
        match self {
            Self::Paged(page) => page,
            Self::Plain(data) => {
                let total = data.len() as u64;
                ProductPage {
                    meta: PageMeta {
                        limit: data.len() as u32,
                        page: 1,
                        pages: 1,
                        total,
                        ..PageMeta::default()
                    },
                    data,
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default)]
    pub image: String,
}

/// JSON 方式创建/更新分类时的请求体。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryInput {
    pub title: String,
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subcategory {
    pub id: String,
    pub title: String,
    pub category_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubcategoryInput {
    pub title: String,
    pub category_id: String,
}

/// 订单状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        Self::Pending,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Result<Self, AppError> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == value.trim().to_lowercase())
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "未知订单状态: {}（可选：pending / processing / shipped / delivered / cancelled）",
                    value
                ))
            })
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: String,
    pub product_title: String,
    pub price: f64,
    pub quantity: u32,
    pub total_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub order_number: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub shipping_address: ShippingAddress,
    pub items: Vec<OrderItem>,
    pub subtotal: f64,
    pub tax: f64,
    pub shipping_cost: f64,
    pub total: f64,
    pub status: OrderStatus,
    pub payment_method: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderPage {
    pub orders: Vec<Order>,
    #[serde(default)]
    pub meta: PageMeta,
}

/// 订单查询参数。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderQuery {
    pub status: Option<OrderStatus>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StatusUpdate {
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrdersByStatus {
    pub pending: u64,
    pub processing: u64,
    pub shipped: u64,
    pub delivered: u64,
    pub cancelled: u64,
}

impl OrdersByStatus {
    pub fn count(&self, status: OrderStatus) -> u64 {
        match status {
            OrderStatus::Pending => self.pending,
            OrderStatus::Processing => self.processing,
            OrderStatus::Shipped => self.shipped,
            OrderStatus::Delivered => self.delivered,
            OrderStatus::Cancelled => self.cancelled,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRevenue {
    pub month: String,
    pub revenue: f64,
    pub orders: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardStats {
    pub total_orders: u64,
    pub total_revenue: f64,
    pub orders_by_status: OrdersByStatus,
    pub monthly_revenue: Vec<MonthlyRevenue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Banner {
    pub id: String,
    pub image: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl Banner {
    /// 未返回 `isActive` 的横幅视为启用。
    pub fn active(&self) -> bool {
        self.is_active.unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_list_accepts_both_shapes() {
        let paged: ProductList = serde_json::from_str(
            r#"{"data":[{"id":"p1","title":"Tee","price":9.5,"stock":3,"categoryId":"c1"}],
                "meta":{"hasNext":true,"hasPrevious":false,"limit":1,"page":1,"pages":4,"total":4}}"#,
        )
        .expect("paged");
        let page = paged.into_page();
        assert_eq!(page.data[0].category_id, "c1");
        assert!(page.meta.has_next);
        assert_eq!(page.meta.pages, 4);

        let plain: ProductList = serde_json::from_str(
            r#"[{"id":"p1","title":"Tee","price":9.5,"stock":3,"categoryId":"c1","imageUrls":["a.jpg"]}]"#,
        )
        .expect("plain");
        let page = plain.into_page();
        assert_eq!(page.meta.total, 1);
        assert_eq!(page.data[0].image_urls.as_deref(), Some(&["a.jpg".to_string()][..]));
    }

    #[test]
    fn order_parses_status_and_timestamps() {
        let order: Order = serde_json::from_str(
            r#"{
                "id": "o1", "orderNumber": "ORD-1", "customerName": "Ann",
                "customerEmail": "ann@example.com", "customerPhone": "123",
                "shippingAddress": {"street": "1 Main", "city": "X", "state": "Y", "zipCode": "000", "country": "Z"},
                "items": [{"productId": "p1", "productTitle": "Tee", "price": 10, "quantity": 2, "totalPrice": 20}],
                "subtotal": 20, "tax": 2, "shippingCost": 5, "total": 27,
                "status": "shipped", "paymentMethod": "card",
                "createdAt": "2024-03-01T10:00:00.000Z", "updatedAt": "2024-03-02T10:00:00Z"
            }"#,
        )
        .expect("order");

        assert_eq!(order.status, OrderStatus::Shipped);
        assert_eq!(order.items[0].quantity, 2);
        assert!(order.updated_at > order.created_at);
    }

    #[test]
    fn order_status_parse_is_case_insensitive() {
        assert_eq!(OrderStatus::parse(" Delivered ").expect("parse"), OrderStatus::Delivered);
        assert!(OrderStatus::parse("lost").is_err());
    }

    #[test]
    fn banner_defaults_to_active() {
        let banner: Banner =
            serde_json::from_str(r#"{"id":"b1","image":"uploads/b1.jpg","url":"/products"}"#)
                .expect("banner");
        assert!(banner.active());
        assert!(banner.text.is_none());
    }
}
