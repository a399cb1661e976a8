//! # 提交守卫
//!
//! 每个实体对话框同一时间只允许一个提交在途：
//! - `begin()` 在已有提交时返回 `None`，重复点击直接忽略
//! - 关闭对话框调用 `cancel()`，在途请求的结果回来后被丢弃，不再写回视图
//!
//! 请求本身不会被中断；取消只影响“结果是否生效”。

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::AppError;

/// 提交结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// 保存成功，对话框已关闭。
    Saved,
    /// 已有提交在途，或没有打开的对话框。
    Skipped,
    /// 校验或请求失败，错误文本已写入视图。
    Failed(String),
    /// 对话框已关闭，结果被丢弃。
    Discarded,
}

#[derive(Debug, Default)]
pub struct SubmitGuard {
    in_flight: Arc<AtomicBool>,
    current: Option<Arc<AtomicBool>>,
}

impl SubmitGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) -> Option<SubmitTicket> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            log::debug!("⏳ 已有提交在途，忽略重复提交");
            return None;
        }

        let cancelled = Arc::new(AtomicBool::new(false));
        self.current = Some(Arc::clone(&cancelled));
        Some(SubmitTicket {
            in_flight: Arc::clone(&self.in_flight),
            cancelled,
        })
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// 取消当前在途提交（若有）。
    pub fn cancel(&mut self) {
        if let Some(flag) = self.current.take() {
            flag.store(true, Ordering::Release);
        }
    }
}

/// 一次提交的凭据。释放时解除在途标记。
#[derive(Debug)]
pub struct SubmitTicket {
    in_flight: Arc<AtomicBool>,
    cancelled: Arc<AtomicBool>,
}

impl SubmitTicket {
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// 把请求包装成不借用视图的 future，可交给 `tokio::spawn`。
    pub fn run<T, F>(self, work: F) -> PendingSubmit<T>
    where
        T: Send + 'static,
        F: Future<Output = Result<T, AppError>> + Send + 'static,
    {
        Box::pin(async move {
            let result = work.await;
            Completed {
                ticket: self,
                result,
            }
        })
    }
}

impl Drop for SubmitTicket {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::Release);
    }
}

pub type PendingSubmit<T> = Pin<Box<dyn Future<Output = Completed<T>> + Send>>;

/// 已完成的提交。凭据随之一起释放。
#[derive(Debug)]
pub struct Completed<T> {
    ticket: SubmitTicket,
    result: Result<T, AppError>,
}

impl<T> Completed<T> {
    /// 取出结果；凭据已取消时返回 `AppError::Cancelled`。
    pub fn into_result(self) -> Result<T, AppError> {
        if self.ticket.is_cancelled() {
            log::debug!("🚫 对话框已关闭，丢弃提交结果");
            return Err(AppError::Cancelled);
        }
        self.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_begin_is_refused_until_ticket_drops() {
        let mut guard = SubmitGuard::new();
        let ticket = guard.begin().expect("first ticket");

        assert!(guard.is_busy());
        assert!(guard.begin().is_none());

        drop(ticket);
        assert!(!guard.is_busy());
        assert!(guard.begin().is_some());
    }

    #[tokio::test]
    async fn cancelled_result_is_discarded() {
        let mut guard = SubmitGuard::new();
        let pending = guard.begin().expect("ticket").run(async { Ok(7) });

        guard.cancel();
        let completed = pending.await;
        assert!(matches!(completed.into_result(), Err(AppError::Cancelled)));
        assert!(!guard.is_busy());
    }

    #[tokio::test]
    async fn cancel_only_affects_the_current_ticket() {
        let mut guard = SubmitGuard::new();
        let first = guard.begin().expect("ticket").run(async { Ok("first") });
        assert_eq!(first.await.into_result().expect("kept"), "first");

        guard.cancel();
        let second = guard.begin().expect("ticket").run(async { Ok("second") });
        assert_eq!(second.await.into_result().expect("kept"), "second");
    }
}
