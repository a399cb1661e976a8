use super::list_state::ListState;
use super::submit_guard::{SubmitGuard, SubmitOutcome};
use crate::api::{ApiClient, Order, OrderQuery, OrderStatus};
use crate::error::AppError;

/// 订单管理页：按状态筛选、查看详情、修改状态、删除。
#[derive(Debug)]
pub struct OrdersView {
    api: ApiClient,
    pub list: ListState<Order>,
    status_filter: Option<OrderStatus>,
    selected: Option<Order>,
    guard: SubmitGuard,
}

impl OrdersView {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            list: ListState::new(),
            status_filter: None,
            selected: None,
            guard: SubmitGuard::new(),
        }
    }

    pub fn status_filter(&self) -> Option<OrderStatus> {
        self.status_filter
    }

    pub fn selected(&self) -> Option<&Order> {
        self.selected.as_ref()
    }

    pub fn is_updating(&self) -> bool {
        self.guard.is_busy()
    }

    pub async fn refresh(&mut self) {
        self.list.loading = true;
        let query = OrderQuery {
            status: self.status_filter,
            ..OrderQuery::default()
        };
        let result = self.api.get_orders(query).await.map(|page| page.orders);
        self.list.apply(result);
    }

    /// 切换筛选条件并重新加载。
    pub async fn set_status_filter(&mut self, status: Option<OrderStatus>) {
        self.status_filter = status;
        self.refresh().await;
    }

    pub fn open_detail(&mut self, id: &str) -> Result<(), AppError> {
        let order = self
            .list
            .items
            .iter()
            .find(|order| order.id == id)
            .cloned()
            .ok_or_else(|| AppError::Validation(format!("订单不存在: {}", id)))?;
        self.selected = Some(order);
        Ok(())
    }

    pub fn close_dialog(&mut self) {
        self.guard.cancel();
        self.selected = None;
    }

    /// 修改订单状态。成功后重新加载列表，并同步详情对话框中的订单。
    pub async fn change_status(&mut self, id: &str, status: OrderStatus) -> SubmitOutcome {
        let Some(ticket) = self.guard.begin() else {
            return SubmitOutcome::Skipped;
        };
        let api = self.api.clone();
        let order_id = id.to_string();
        let completed = ticket
            .run(async move { api.update_order_status(&order_id, status).await })
            .await;

        match completed.into_result() {
            Ok(_) => {
                log::info!("✅ 订单 {} 状态已更新为 {}", id, status);
                self.refresh().await;
                if let Some(selected) = self.selected.as_mut().filter(|order| order.id == id) {
                    selected.status = status;
                }
                SubmitOutcome::Saved
            }
            Err(AppError::Cancelled) => SubmitOutcome::Discarded,
            Err(err) => {
                let message = err.to_string();
                self.list.fail(message.clone());
                SubmitOutcome::Failed(message)
            }
        }
    }

    pub async fn delete(&mut self, id: &str) -> Result<(), AppError> {
        match self.api.delete_order(id).await {
            Ok(_) => {
                log::info!("🗑️ 订单已删除 - {}", id);
                self.refresh().await;
                if self.selected.as_ref().is_some_and(|order| order.id == id) {
                    self.close_dialog();
                }
                Ok(())
            }
            Err(err) => {
                self.list.fail(err.to_string());
                Err(err)
            }
        }
    }
}
