//! 集成测试公共设施：按顺序回放预设响应的本地 HTTP 服务。
//!
//! 每个连接只处理一个请求（响应带 `Connection: close`），
//! 收到的请求被记录下来供断言使用。

#![allow(dead_code)]

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

use shop_admin::api::ApiClient;
use shop_admin::auth::{Credentials, MemoryTokenStore};
use shop_admin::config::AppConfig;

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("request body is json")
    }
}

/// 预设响应。带路由的响应只匹配对应请求，不带路由的按顺序使用。
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub body: String,
    route: Option<(&'static str, &'static str)>,
}

impl Reply {
    pub fn ok(body: serde_json::Value) -> Self {
        Self::status(200, body)
    }

    pub fn status(status: u16, body: serde_json::Value) -> Self {
        Self {
            status,
            body: body.to_string(),
            route: None,
        }
    }

    pub fn empty(status: u16) -> Self {
        Self {
            status,
            body: String::new(),
            route: None,
        }
    }

    /// 只响应 `method path`（path 不含查询串）。
    pub fn on(mut self, method: &'static str, path: &'static str) -> Self {
        self.route = Some((method, path));
        self
    }

    fn matches(&self, request: &Recorded) -> bool {
        match self.route {
            Some((method, path)) => {
                request.method == method && request.path.split('?').next() == Some(path)
            }
            None => true,
        }
    }
}

pub struct MockServer {
    url: String,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl MockServer {
    pub fn start(replies: Vec<Reply>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock server");
        let url = format!("http://{}", listener.local_addr().expect("local addr"));
        let requests = Arc::new(Mutex::new(Vec::new()));

        let recorded = Arc::clone(&requests);
        thread::spawn(move || {
            let mut pending: Vec<Option<Reply>> = replies.into_iter().map(Some).collect();
            for _ in 0..pending.len() {
                let Ok((stream, _)) = listener.accept() else {
                    return;
                };
                serve_one(stream, &mut pending, &recorded);
            }
        });

        Self { url, requests }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub fn request(&self, index: usize) -> Recorded {
        self.requests()
            .get(index)
            .cloned()
            .unwrap_or_else(|| panic!("request #{index} was not received"))
    }

    pub fn config(&self) -> AppConfig {
        AppConfig {
            api_base_url: self.url.clone(),
            ..AppConfig::default()
        }
    }

    pub fn client(&self, token: Option<&str>) -> ApiClient {
        let store = match token {
            Some(token) => MemoryTokenStore::with_token(token),
            None => MemoryTokenStore::default(),
        };
        let credentials = Credentials::load(Arc::new(store)).expect("credentials");
        ApiClient::new(&self.config(), credentials).expect("client")
    }
}

fn serve_one(stream: TcpStream, pending: &mut [Option<Reply>], recorded: &Mutex<Vec<Recorded>>) {
    let mut reader = BufReader::new(stream);

    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let mut headers = Vec::new();
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((key, value)) = line.split_once(':') {
            headers.push((key.trim().to_string(), value.trim().to_string()));
        }
    }

    let header = |name: &str| {
        headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.clone())
    };

    let body = if header("transfer-encoding").is_some_and(|v| v.eq_ignore_ascii_case("chunked")) {
        read_chunked(&mut reader)
    } else {
        let length = header("content-length")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(0);
        let mut body = vec![0; length];
        if reader.read_exact(&mut body).is_err() {
            return;
        }
        body
    };

    let request = Recorded {
        method,
        path,
        headers,
        body,
    };
    let scripted = |slot: &Option<Reply>, routed: bool| {
        slot.as_ref()
            .is_some_and(|reply| reply.route.is_some() == routed && reply.matches(&request))
    };
    let reply = pending
        .iter()
        .position(|slot| scripted(slot, true))
        .or_else(|| pending.iter().position(|slot| scripted(slot, false)))
        .and_then(|index| pending[index].take())
        .unwrap_or_else(|| Reply::status(404, serde_json::json!({ "message": "no scripted reply" })));
    recorded.lock().expect("requests lock").push(request);

    let response = format!(
        "HTTP/1.1 {} Mock\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        reply.status,
        reply.body.len(),
        reply.body
    );
    let mut stream = reader.into_inner();
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

fn read_chunked(reader: &mut BufReader<TcpStream>) -> Vec<u8> {
    let mut body = Vec::new();
    loop {
        let mut size_line = String::new();
        if reader.read_line(&mut size_line).unwrap_or(0) == 0 {
            break;
        }
        let size = usize::from_str_radix(size_line.trim(), 16).unwrap_or(0);
        let mut chunk = vec![0; size + 2];
        if reader.read_exact(&mut chunk).is_err() {
            break;
        }
        if size == 0 {
            break;
        }
        chunk.truncate(size);
        body.extend_from_slice(&chunk);
    }
    body
}

/// 最小可用的 JWT（签名不校验）。
pub fn jwt(payload: serde_json::Value) -> String {
    use base64::Engine as _;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    format!(
        "{}.{}.sig",
        URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
        URL_SAFE_NO_PAD.encode(payload.to_string())
    )
}

pub fn product_json(id: &str, title: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "title": title,
        "price": 19.5,
        "stock": 3,
        "categoryId": "c1",
        "imageUrls": ["/uploads/p1.jpg"]
    })
}

pub fn banner_json(id: &str, is_active: bool) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "image": format!("/uploads/{id}.jpg"),
        "url": "https://shop.example/sale",
        "text": "Sale",
        "priority": 1,
        "isActive": is_active
    })
}

pub fn order_json(id: &str, status: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "orderNumber": format!("ORD-{id}"),
        "customerName": "Ana",
        "customerEmail": "ana@example.com",
        "customerPhone": "555-0100",
        "shippingAddress": {
            "street": "1 Main St",
            "city": "Springfield",
            "state": "IL",
            "zipCode": "62701",
            "country": "US"
        },
        "items": [{
            "productId": "p1",
            "productTitle": "Shoe",
            "price": 10.0,
            "quantity": 2,
            "totalPrice": 20.0
        }],
        "subtotal": 20.0,
        "tax": 2.0,
        "shippingCost": 5.0,
        "total": 27.0,
        "status": status,
        "paymentMethod": "card",
        "createdAt": "2024-05-01T10:00:00Z",
        "updatedAt": "2024-05-02T10:00:00Z"
    })
}
