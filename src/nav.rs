//! 后台导航：路由路径与侧边栏菜单。

/// 路由路径。
pub mod routes {
    pub const DASHBOARD: &str = "/";
    pub const PRODUCTS: &str = "/products";
    pub const CATEGORIES: &str = "/categories";
    pub const SUBCATEGORIES: &str = "/subcategories";
    pub const ORDERS: &str = "/orders";
    pub const BANNERS: &str = "/banners";
    pub const SIGN_IN: &str = "/sign-in";
}

/// 侧边栏菜单项。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub title: &'static str,
    pub path: &'static str,
    /// 图标资源名（`/assets/icons/navbar/<icon>.svg`）。
    pub icon: &'static str,
}

impl NavItem {
    pub fn icon_path(&self) -> String {
        format!("/assets/icons/navbar/{}.svg", self.icon)
    }
}

pub const NAV_ITEMS: [NavItem; 6] = [
    NavItem { title: "Dashboard", path: routes::DASHBOARD, icon: "ic-analytics" },
    NavItem { title: "Products", path: routes::PRODUCTS, icon: "ic-cart" },
    NavItem { title: "Categories", path: routes::CATEGORIES, icon: "ic-blog" },
    NavItem { title: "Subcategories", path: routes::SUBCATEGORIES, icon: "ic-blog" },
    NavItem { title: "Orders", path: routes::ORDERS, icon: "ic-user" },
    NavItem { title: "Banners", path: routes::BANNERS, icon: "ic-blog" },
];

/// 按路径查找菜单项（忽略末尾斜杠）。
pub fn find(path: &str) -> Option<&'static NavItem> {
    let normalized = match path.trim_end_matches('/') {
        "" => routes::DASHBOARD,
        other => other,
    };
    NAV_ITEMS.iter().find(|item| item.path == normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_normalizes_trailing_slash() {
        assert_eq!(find("/orders/").map(|item| item.title), Some("Orders"));
        assert_eq!(find("/").map(|item| item.icon), Some("ic-analytics"));
        assert_eq!(find(""), find("/"));
        assert!(find(routes::SIGN_IN).is_none());
    }

    #[test]
    fn icon_path_points_at_navbar_assets() {
        assert_eq!(NAV_ITEMS[1].icon_path(), "/assets/icons/navbar/ic-cart.svg");
    }
}
