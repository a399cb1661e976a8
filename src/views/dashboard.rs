use crate::api::{ApiClient, DashboardStats, MonthlyRevenue, OrderStatus};

/// 收入趋势只展示最近几个月。
const RECENT_MONTHS: usize = 6;

/// 首页概览：订单总数、收入、各状态订单数、月度收入。
#[derive(Debug)]
pub struct DashboardView {
    api: ApiClient,
    stats: Option<DashboardStats>,
    pub loading: bool,
    pub error: Option<String>,
}

impl DashboardView {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            stats: None,
            loading: true,
            error: None,
        }
    }

    pub async fn refresh(&mut self) {
        self.loading = true;
        match self.api.get_dashboard_stats().await {
            Ok(stats) => {
                self.stats = Some(stats);
                self.error = None;
            }
            Err(err) => {
                log::warn!("⚠️ 加载概览数据失败: {}", err);
                self.error = Some(err.to_string());
            }
        }
        self.loading = false;
    }

    pub fn stats(&self) -> Option<&DashboardStats> {
        self.stats.as_ref()
    }

    pub fn total_orders(&self) -> u64 {
        self.stats.as_ref().map_or(0, |stats| stats.total_orders)
    }

    pub fn total_revenue(&self) -> f64 {
        self.stats.as_ref().map_or(0.0, |stats| stats.total_revenue)
    }

    pub fn orders_with_status(&self, status: OrderStatus) -> u64 {
        self.stats
            .as_ref()
            .map_or(0, |stats| stats.orders_by_status.count(status))
    }

    pub fn recent_revenue(&self) -> &[MonthlyRevenue] {
        let Some(stats) = &self.stats else {
            return &[];
        };
        let months = &stats.monthly_revenue;
        &months[months.len().saturating_sub(RECENT_MONTHS)..]
    }
}

/// `$1234.50 (12 orders)`
pub fn format_revenue(item: &MonthlyRevenue) -> String {
    format!("${:.2} ({} orders)", item.revenue, item.orders)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revenue_line_uses_two_decimals() {
        let item = MonthlyRevenue {
            month: "2024-05".to_string(),
            revenue: 1234.5,
            orders: 12,
        };
        assert_eq!(format_revenue(&item), "$1234.50 (12 orders)");
    }
}
