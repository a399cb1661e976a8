//! # 认证模块（auth）
//!
//! 调用链：
//!
//! ```text
//! TokenStore（文件 / 内存）
//!    ↓
//! Credentials（进程内唯一令牌槽位，显式传递）
//!    ↓
//! ApiClient（每次请求前读取令牌）
//!    ↓
//! AuthSession（Loading → Authenticated / Unauthenticated）
//!    ↓
//! guard（protected_route / auth_redirect）
//! ```

mod credentials;
mod guard;
mod session;
mod token_store;

pub use credentials::Credentials;
pub use guard::{GuardOutcome, auth_redirect, protected_route};
pub use session::{AuthSession, AuthState, User};
pub use token_store::{FileTokenStore, MemoryTokenStore, TOKEN_STORAGE_KEY, TokenStore};
