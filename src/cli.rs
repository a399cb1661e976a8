// 命令行入口：无界面地完成图片裁剪/缩放与后台数据查询。
//
//   shop-admin crop -i photo.jpg -o product.jpg --size 600
//   shop-admin resize -i banner.png -o banner-800.png --zoom 0.8
//   shop-admin login --email admin@example.com --password admin123
//   shop-admin list orders --status pending

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use shop_admin::api::{ApiClient, OrderQuery, OrderStatus, PageQuery};
use shop_admin::auth::{AuthSession, AuthState, Credentials, FileTokenStore};
use shop_admin::config::AppConfig;
use shop_admin::error::AppError;
use shop_admin::image_handler::{
    CropRegion, Dimensions, EncodedImage, ImageService, ImageSource, OutputFormat, OutputSpec,
};
use shop_admin::nav::NAV_ITEMS;
use shop_admin::views::{
    BannersView, CategoriesView, DashboardView, OrdersView, ProductsView, SignInView,
    SubcategoriesView, format_revenue,
};

#[derive(Parser, Debug)]
#[command(name = "shop-admin", about = "电商后台管理命令行工具", version)]
pub struct CliArgs {
    /// 配置文件（JSON）。缺省读取当前目录下的 shop-admin.json。
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// 裁剪为固定尺寸（默认 300x300 JPEG）。
    Crop {
        /// 文件路径，或 `data:image/...;base64,` Data URL。
        #[arg(short, long)]
        input: String,
        #[arg(short, long)]
        output: PathBuf,
        /// 正方形输出边长；与 --width/--height 二选一。
        #[arg(long)]
        size: Option<u32>,
        #[arg(long, requires = "height")]
        width: Option<u32>,
        #[arg(long, requires = "width")]
        height: Option<u32>,
        /// jpeg / png
        #[arg(short, long, default_value = "jpeg")]
        format: String,
        #[arg(short, long, value_name = "0-1")]
        quality: Option<f32>,
        /// 源图像素坐标裁剪框：x,y,宽,高。缺省居中取最大区域。
        #[arg(long, value_name = "X,Y,W,H")]
        region: Option<String>,
    },
    /// 按缩放系数绘制到固定画布（PNG）。
    Resize {
        /// 文件路径，或 `data:image/...;base64,` Data URL。
        #[arg(short, long)]
        input: String,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long, requires = "height")]
        width: Option<u32>,
        #[arg(long, requires = "width")]
        height: Option<u32>,
        #[arg(short, long, default_value_t = 1.0)]
        zoom: f64,
        #[arg(short, long, value_name = "0.1-1")]
        quality: Option<f32>,
    },
    /// 登录并保存令牌。
    Login {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },
    /// 清除已保存的令牌。
    Logout,
    /// 校验已保存的令牌并显示当前用户。
    Whoami,
    /// 列出后台数据（JSON 输出）。
    List {
        #[arg(value_enum)]
        entity: Entity,
        /// 订单状态筛选。
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// 概览统计。
    Stats,
    /// 侧边栏菜单。
    Routes,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Entity {
    Products,
    Categories,
    Subcategories,
    Orders,
    Banners,
}

pub async fn run(args: CliArgs) -> ExitCode {
    match execute(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

async fn execute(args: CliArgs) -> Result<(), AppError> {
    let config = AppConfig::load(args.config.as_deref())?;

    match args.command {
        Command::Crop {
            input,
            output,
            size,
            width,
            height,
            format,
            quality,
            region,
        } => {
            let images = ImageService::with_config(config.image.to_image_config());
            let default_spec = images.handler().default_crop_spec()?;
            let (width, height) = match (size, width, height) {
                (Some(size), _, _) => (size, size),
                (None, Some(width), Some(height)) => (width, height),
                _ => (default_spec.width, default_spec.height),
            };
            let spec = OutputSpec::new(
                width,
                height,
                OutputFormat::parse(&format)?,
                quality.unwrap_or(default_spec.quality),
            );
            let region = region.as_deref().map(parse_region).transpose()?;
            let encoded = images
                .crop_to_spec(image_source(&input), Some(spec), region)
                .await?;
            write_output(&output, &encoded)
        }
        Command::Resize {
            input,
            output,
            width,
            height,
            zoom,
            quality,
        } => {
            let images = ImageService::with_config(config.image.to_image_config());
            let canvas = width.zip(height).map(|(w, h)| Dimensions::new(w, h));
            let encoded = images
                .resize_to_canvas(image_source(&input), canvas, zoom, quality)
                .await?;
            write_output(&output, &encoded)
        }
        Command::Login { email, password } => {
            let mut session = AuthSession::new(api_client(&config)?);
            let mut form = SignInView::new();
            if let Some(email) = email {
                form.email = email;
            }
            if let Some(password) = password {
                form.password = password;
            }
            match form.submit(&mut session).await {
                Some(_) => {
                    if let Some(user) = session.user() {
                        println!("已登录: {} ({})", user.email, user.role);
                    }
                    Ok(())
                }
                None => Err(AppError::Validation(
                    form.error.unwrap_or_else(|| "请填写邮箱和密码".to_string()),
                )),
            }
        }
        Command::Logout => {
            let mut session = AuthSession::new(api_client(&config)?);
            session.logout()?;
            println!("已登出");
            Ok(())
        }
        Command::Whoami => {
            let mut session = AuthSession::new(api_client(&config)?);
            match session.bootstrap().await {
                AuthState::Authenticated(user) => {
                    println!("{} <{}> 角色: {}", user.username, user.email, user.role);
                    Ok(())
                }
                _ => Err(AppError::Validation("未登录，请先执行 login".to_string())),
            }
        }
        Command::List {
            entity,
            status,
            page,
            limit,
        } => list(&config, entity, status.as_deref(), PageQuery { page, limit }).await,
        Command::Stats => {
            let mut view = DashboardView::new(api_client(&config)?);
            view.refresh().await;
            if let Some(message) = view.error.take() {
                return Err(AppError::Validation(message));
            }
            println!("订单总数: {}", view.total_orders());
            println!("总收入: ${:.2}", view.total_revenue());
            for status in OrderStatus::ALL {
                println!("  {:<10} {}", status, view.orders_with_status(status));
            }
            for item in view.recent_revenue() {
                println!("  {}  {}", item.month, format_revenue(item));
            }
            Ok(())
        }
        Command::Routes => {
            for item in NAV_ITEMS {
                println!("{:<14} {:<16} {}", item.title, item.path, item.icon_path());
            }
            Ok(())
        }
    }
}

async fn list(
    config: &AppConfig,
    entity: Entity,
    status: Option<&str>,
    query: PageQuery,
) -> Result<(), AppError> {
    let api = api_client(config)?;

    let json = match entity {
        Entity::Products => {
            let mut view = ProductsView::new(api);
            view.set_query(query);
            view.refresh().await;
            surface(view.list.error.take())?;
            serde_json::to_string_pretty(&view.list.items)?
        }
        Entity::Categories => {
            let mut view = CategoriesView::new(api);
            view.refresh().await;
            surface(view.list.error.take())?;
            serde_json::to_string_pretty(&view.list.items)?
        }
        Entity::Subcategories => {
            let mut view = SubcategoriesView::new(api);
            view.refresh().await;
            surface(view.list.error.take())?;
            serde_json::to_string_pretty(&view.list.items)?
        }
        Entity::Orders => {
            let mut view = OrdersView::new(api);
            let status = status.map(OrderStatus::parse).transpose()?;
            view.set_status_filter(status).await;
            surface(view.list.error.take())?;
            serde_json::to_string_pretty(&view.list.items)?
        }
        Entity::Banners => {
            let mut view = BannersView::new(api, ImageService::default());
            view.refresh().await;
            surface(view.list.error.take())?;
            serde_json::to_string_pretty(&view.list.items)?
        }
    };

    println!("{}", json);
    Ok(())
}

fn api_client(config: &AppConfig) -> Result<ApiClient, AppError> {
    let store = FileTokenStore::new(config.token_path());
    let credentials = Credentials::load(std::sync::Arc::new(store))?;
    ApiClient::new(config, credentials)
}

fn surface(error: Option<String>) -> Result<(), AppError> {
    match error {
        Some(message) => Err(AppError::Validation(message)),
        None => Ok(()),
    }
}

/// 以 `data:` 开头的输入按 Data URL 处理，其余视为文件路径。
fn image_source(input: &str) -> ImageSource {
    let Some(rest) = input.strip_prefix("data:") else {
        return ImageSource::FilePath(input.to_string());
    };
    let extension = rest
        .split([';', ','])
        .next()
        .and_then(|mime| mime.strip_prefix("image/"))
        .filter(|ext| !ext.is_empty())
        .unwrap_or("img");
    ImageSource::Base64 {
        data: input.to_string(),
        file_name: format!("inline.{}", extension),
    }
}

fn parse_region(value: &str) -> Result<CropRegion, AppError> {
    let parts = value
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| AppError::Validation(format!("裁剪框格式应为 X,Y,W,H: {}", value)))?;

    match parts.as_slice() {
        [x, y, width, height] => Ok(CropRegion::pixels(*x, *y, *width, *height)),
        _ => Err(AppError::Validation(format!(
            "裁剪框格式应为 X,Y,W,H: {}",
            value
        ))),
    }
}

fn write_output(path: &std::path::Path, encoded: &EncodedImage) -> Result<(), AppError> {
    std::fs::write(path, &encoded.bytes)?;
    println!(
        "{} ({}x{}, {}, {} 字节)",
        path.display(),
        encoded.width,
        encoded.height,
        encoded.mime_type,
        encoded.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

    fn png_data_url(width: u32, height: u32) -> String {
        let mut cursor = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([9, 99, 199, 255])))
            .write_to(&mut cursor, ImageFormat::Png)
            .expect("encode png");
        format!("data:image/png;base64,{}", STANDARD.encode(cursor.into_inner()))
    }

    #[test]
    fn plain_input_is_a_file_path() {
        match image_source("photos/shoe.png") {
            ImageSource::FilePath(path) => assert_eq!(path, "photos/shoe.png"),
            other => panic!("expected file path, got {:?}", other.file_name()),
        }
    }

    #[test]
    fn data_url_input_crops_through_base64_source() {
        let source = image_source(&png_data_url(400, 200));
        assert!(matches!(source, ImageSource::Base64 { .. }));
        assert_eq!(source.file_name(), "inline.png");

        let images = ImageService::default();
        let spec = OutputSpec::new(100, 100, OutputFormat::Jpeg, 0.9);
        let encoded = images
            .handler()
            .crop_to_spec(source, Some(spec), None)
            .expect("crop data url");

        assert_eq!(encoded.dimensions(), Dimensions::new(100, 100));
        assert_eq!(encoded.file_name, "inline.jpg");
    }

    #[test]
    fn region_needs_four_numbers() {
        let region = parse_region("10, 20, 300, 150").expect("region");
        assert_eq!((region.x, region.y, region.width, region.height), (10.0, 20.0, 300.0, 150.0));
        assert!(parse_region("10,20,300").is_err());
        assert!(parse_region("a,b,c,d").is_err());
    }
}
