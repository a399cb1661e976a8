//! # HTTP 传输层
//!
//! ## 设计思路
//!
//! `ApiClient` 只做三件事：拼接 URL、附加 Bearer 令牌、把非 2xx 响应转换成 `AppError`。
//! 具体业务端点在 `endpoints.rs` 中以 `impl ApiClient` 的方式扩展。
//!
//! ## 实现思路
//!
//! - 令牌在每次请求前从 `Credentials` 读取，登录/登出后立即生效
//! - JSON 请求显式设置 `Content-Type: application/json`；multipart 由 reqwest 生成 boundary
//! - 错误体 `{ "message": string | string[] }`，数组按 ", " 拼接；缺失时回落为 `HTTP error! status: N`
//! - 不做任何自动重试

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use reqwest::multipart::Form;
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Instant;

use crate::auth::Credentials;
use crate::config::AppConfig;
use crate::error::AppError;

use super::models::MessageResponse;

/// 后端 REST API 客户端。可廉价克隆，内部共享连接池与令牌槽位。
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<ErrorMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorMessage {
    One(String),
    Many(Vec<String>),
}

impl ApiClient {
    pub fn new(config: &AppConfig, credentials: Credentials) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| AppError::Config(format!("初始化 HTTP 客户端失败: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url().to_string(),
            credentials,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// 后端返回的相对图片路径转为可访问的绝对地址。
    pub fn asset_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub(crate) fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// 拼接带查询串的 URL，值为 `None` 的参数被跳过。
    pub(crate) fn url_with_query(
        &self,
        endpoint: &str,
        params: &[(&str, Option<String>)],
    ) -> Result<Url, AppError> {
        let mut url = Url::parse(&self.url(endpoint))
            .map_err(|e| AppError::Config(format!("无效的请求地址: {}", e)))?;

        let present: Vec<(&str, &String)> = params
            .iter()
            .filter_map(|(key, value)| value.as_ref().map(|v| (*key, v)))
            .collect();
        if !present.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in present {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }

    fn authorize(&self, builder: RequestBuilder) -> Result<RequestBuilder, AppError> {
        match self.credentials.token() {
            Some(token) => {
                let value = HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|_| AppError::Validation("令牌包含非法字符".to_string()))?;
                Ok(builder.header(AUTHORIZATION, value))
            }
            None => Ok(builder),
        }
    }

    fn json_request(&self, method: Method, url: impl reqwest::IntoUrl) -> Result<RequestBuilder, AppError> {
        let builder = self
            .http
            .request(method, url)
            .header(CONTENT_TYPE, "application/json");
        self.authorize(builder)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, AppError> {
        let builder = self.json_request(Method::GET, self.url(endpoint))?;
        self.execute(Method::GET, endpoint, builder).await
    }

    pub(crate) async fn get_json_url<T: DeserializeOwned>(&self, url: Url) -> Result<T, AppError> {
        let endpoint = url.path().to_string();
        let builder = self.json_request(Method::GET, url)?;
        self.execute(Method::GET, &endpoint, builder).await
    }

    pub(crate) async fn send_json<B, T>(
        &self,
        method: Method,
        endpoint: &str,
        body: &B,
    ) -> Result<T, AppError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = serde_json::to_vec(body)?;
        let builder = self
            .json_request(method.clone(), self.url(endpoint))?
            .body(payload);
        self.execute(method, endpoint, builder).await
    }

    pub(crate) async fn send_multipart<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        form: Form,
    ) -> Result<T, AppError> {
        let builder = self
            .authorize(self.http.request(method.clone(), self.url(endpoint)))?
            .multipart(form);
        self.execute(method, endpoint, builder).await
    }

    /// DELETE 请求。响应体为空或不是 JSON 时返回空消息。
    pub(crate) async fn delete(&self, endpoint: &str) -> Result<MessageResponse, AppError> {
        let builder = self.json_request(Method::DELETE, self.url(endpoint))?;
        let response = self.dispatch(&Method::DELETE, endpoint, builder).await?;
        let text = response.text().await?;
        Ok(serde_json::from_str(&text).unwrap_or_default())
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        builder: RequestBuilder,
    ) -> Result<T, AppError> {
        let response = self.dispatch(&method, endpoint, builder).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| {
            log::warn!("⚠️ 响应解析失败 - {} {}: {}", method, endpoint, e);
            AppError::Serialization(format!("响应解析失败: {}", e))
        })
    }

    async fn dispatch(
        &self,
        method: &Method,
        endpoint: &str,
        builder: RequestBuilder,
    ) -> Result<Response, AppError> {
        let start = Instant::now();
        let response = builder.send().await.map_err(|e| {
            log::error!("❌ 请求失败 - {} {}: {}", method, endpoint, e);
            AppError::from(e)
        })?;

        let status = response.status();
        log::debug!(
            "🌐 {} {} -> {} ({}ms)",
            method,
            endpoint,
            status.as_u16(),
            start.elapsed().as_millis()
        );

        if status.is_success() {
            return Ok(response);
        }

        let error = error_from_response(response).await;
        log::warn!("⚠️ 接口返回错误 - {} {}: {}", method, endpoint, error);
        Err(error)
    }
}

/// 将非 2xx 响应转换为 `AppError::Api`。
async fn error_from_response(response: Response) -> AppError {
    let status = response.status().as_u16();
    let body = response.bytes().await.unwrap_or_default();
    AppError::Api {
        status,
        message: error_message(status, &body),
    }
}

pub(crate) fn error_message(status: u16, body: &[u8]) -> String {
    let message = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.message)
        .map(|message| match message {
            ErrorMessage::One(text) => text,
            ErrorMessage::Many(items) => items.join(", "),
        })
        .filter(|text| !text.trim().is_empty());

    message.unwrap_or_else(|| format!("HTTP error! status: {}", status))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        let config = AppConfig {
            api_base_url: base.to_string(),
            ..AppConfig::default()
        };
        ApiClient::new(&config, Credentials::in_memory()).expect("client")
    }

    #[test]
    fn error_message_prefers_backend_text() {
        assert_eq!(error_message(400, br#"{"message":"Invalid credentials"}"#), "Invalid credentials");
        assert_eq!(
            error_message(422, br#"{"message":["title must be a string","price must be positive"]}"#),
            "title must be a string, price must be positive"
        );
    }

    #[test]
    fn error_message_falls_back_to_status() {
        assert_eq!(error_message(500, b"<html>oops</html>"), "HTTP error! status: 500");
        assert_eq!(error_message(404, br#"{"message":""}"#), "HTTP error! status: 404");
        assert_eq!(error_message(409, br#"{"message":[]}"#), "HTTP error! status: 409");
        assert_eq!(error_message(401, b""), "HTTP error! status: 401");
    }

    #[test]
    fn query_skips_absent_params() {
        let api = client("http://localhost:3000/");
        let url = api
            .url_with_query(
                "/orders",
                &[
                    ("status", Some("pending".to_string())),
                    ("page", None),
                    ("limit", Some("20".to_string())),
                ],
            )
            .expect("url");

        assert_eq!(url.as_str(), "http://localhost:3000/orders?status=pending&limit=20");

        let bare = api.url_with_query("/products", &[("page", None)]).expect("url");
        assert_eq!(bare.as_str(), "http://localhost:3000/products");
    }

    #[test]
    fn asset_url_joins_relative_paths() {
        let api = client("http://localhost:3000");
        assert_eq!(api.asset_url("uploads/a.jpg"), "http://localhost:3000/uploads/a.jpg");
        assert_eq!(api.asset_url("https://cdn.example.com/a.jpg"), "https://cdn.example.com/a.jpg");
    }
}
