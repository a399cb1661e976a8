//! # multipart 表单构建
//!
//! 带图片的创建/更新请求统一使用 multipart/form-data。表单对象本身只保存
//! 用户输入，提交时才转换成 `reqwest::multipart::Form`；文本字段通过 `fields()`
//! 暴露，便于校验与测试。

use bytes::Bytes;
use reqwest::multipart::{Form, Part};

use super::models::{Banner, Category, CategoryInput, Product};
use crate::error::AppError;
use crate::image_handler::EncodedImage;

/// 单个商品最多允许的图片数量（含已保存的图片）。
pub const MAX_PRODUCT_IMAGES: usize = 5;

/// 新横幅的默认优先级。
pub const DEFAULT_BANNER_PRIORITY: i64 = 1;

/// 待上传的文件。
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Bytes,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Bytes) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    fn to_part(&self) -> Result<Part, AppError> {
        Part::bytes(self.bytes.to_vec())
            .file_name(self.file_name.clone())
            .mime_str(&self.mime_type)
            .map_err(|e| AppError::Validation(format!("无效的文件类型 {}: {}", self.mime_type, e)))
    }
}

impl From<EncodedImage> for UploadFile {
    fn from(image: EncodedImage) -> Self {
        Self {
            file_name: image.file_name,
            mime_type: image.mime_type.to_string(),
            bytes: image.bytes,
        }
    }
}

fn bool_field(value: bool) -> String {
    let text = if value { "true" } else { "false" };
    text.to_string()
}

fn text_form(fields: Vec<(String, String)>) -> Form {
    fields
        .into_iter()
        .fold(Form::new(), |form, (name, value)| form.text(name, value))
}

/// 商品表单。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductForm {
    pub title: String,
    pub price: f64,
    pub stock: i64,
    pub category_id: String,
    pub is_featured: bool,
    pub is_best_seller: bool,
    pub is_best_select: bool,
    pub priority: i64,
    images: Vec<UploadFile>,
    existing_images: Vec<String>,
    images_to_remove: Vec<String>,
}

impl ProductForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以已有商品预填表单（编辑模式）。
    pub fn from_product(product: &Product) -> Self {
        Self {
            title: product.title.clone(),
            price: product.price,
            stock: product.stock,
            category_id: product.category_id.clone(),
            is_featured: product.is_featured.unwrap_or(false),
            is_best_seller: product.is_best_seller.unwrap_or(false),
            is_best_select: product.is_best_select.unwrap_or(false),
            priority: product.priority.unwrap_or(0),
            images: Vec::new(),
            existing_images: product.image_urls.clone().unwrap_or_default(),
            images_to_remove: Vec::new(),
        }
    }

    pub fn images(&self) -> &[UploadFile] {
        &self.images
    }

    pub fn existing_images(&self) -> &[String] {
        &self.existing_images
    }

    pub fn images_to_remove(&self) -> &[String] {
        &self.images_to_remove
    }

    pub fn total_images(&self) -> usize {
        self.images.len() + self.existing_images.len()
    }

    /// 追加新图片；总数（含已保存图片）超过上限时整批拒绝。
    pub fn add_images(&mut self, files: Vec<UploadFile>) -> Result<(), AppError> {
        if self.total_images() + files.len() > MAX_PRODUCT_IMAGES {
            return Err(AppError::Validation(format!(
                "Maximum {} images allowed",
                MAX_PRODUCT_IMAGES
            )));
        }
        self.images.extend(files);
        Ok(())
    }

    pub fn remove_image(&mut self, index: usize) {
        if index < self.images.len() {
            self.images.remove(index);
        }
    }

    /// 移除已保存的图片，并记录到 `imagesToRemove`。
    pub fn remove_existing_image(&mut self, index: usize) {
        if index < self.existing_images.len() {
            let url = self.existing_images.remove(index);
            self.images_to_remove.push(url);
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.title.trim().is_empty() {
            return Err(AppError::Validation("商品标题不能为空".to_string()));
        }
        if self.category_id.trim().is_empty() {
            return Err(AppError::Validation("请选择商品分类".to_string()));
        }
        if !self.price.is_finite() {
            return Err(AppError::Validation("商品价格无效".to_string()));
        }
        if self.total_images() > MAX_PRODUCT_IMAGES {
            return Err(AppError::Validation(format!(
                "Maximum {} images allowed",
                MAX_PRODUCT_IMAGES
            )));
        }
        Ok(())
    }

    /// 文本字段（提交顺序）。价格、库存、优先级小于 0 时按 0 提交。
    pub fn fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![
            ("title".to_string(), self.title.clone()),
            ("price".to_string(), self.price.max(0.0).to_string()),
            ("stock".to_string(), self.stock.max(0).to_string()),
            ("categoryId".to_string(), self.category_id.clone()),
            ("isFeatured".to_string(), bool_field(self.is_featured)),
            ("isBestSeller".to_string(), bool_field(self.is_best_seller)),
            ("isBestSelect".to_string(), bool_field(self.is_best_select)),
            ("priority".to_string(), self.priority.max(0).to_string()),
        ];
        fields.extend(
            self.images_to_remove
                .iter()
                .enumerate()
                .map(|(index, url)| (format!("imagesToRemove[{}]", index), url.clone())),
        );
        fields
    }

    pub fn to_multipart(&self) -> Result<Form, AppError> {
        self.validate()?;
        let mut form = text_form(self.fields());
        for image in &self.images {
            form = form.part("images", image.to_part()?);
        }
        Ok(form)
    }
}

/// 横幅表单。
#[derive(Debug, Clone, PartialEq)]
pub struct BannerForm {
    pub image: Option<UploadFile>,
    pub url: String,
    pub text: String,
    pub priority: i64,
    pub is_active: bool,
    /// 当前预览图（编辑时为已保存图片路径，选图后为新文件名）。
    preview: Option<String>,
}

impl Default for BannerForm {
    fn default() -> Self {
        Self {
            image: None,
            url: String::new(),
            text: String::new(),
            priority: DEFAULT_BANNER_PRIORITY,
            is_active: true,
            preview: None,
        }
    }
}

impl BannerForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_banner(banner: &Banner) -> Self {
        Self {
            image: None,
            url: banner.url.clone(),
            text: banner.text.clone().unwrap_or_default(),
            priority: banner.priority.filter(|p| *p != 0).unwrap_or(DEFAULT_BANNER_PRIORITY),
            is_active: banner.active(),
            preview: Some(banner.image.clone()).filter(|p| !p.is_empty()),
        }
    }

    /// 设置裁剪后的新图片。
    pub fn set_image(&mut self, image: UploadFile) {
        self.preview = Some(image.file_name.clone());
        self.image = Some(image);
    }

    pub fn preview(&self) -> Option<&str> {
        self.preview.as_deref()
    }

    /// 有图片（新选或已保存）时表单才可提交。
    pub fn is_valid(&self) -> bool {
        self.preview.is_some()
    }

    pub fn fields(&self) -> Vec<(String, String)> {
        vec![
            ("url".to_string(), self.url.clone()),
            ("text".to_string(), self.text.clone()),
            ("priority".to_string(), self.priority.to_string()),
            ("isActive".to_string(), bool_field(self.is_active)),
        ]
    }

    pub fn to_multipart(&self) -> Result<Form, AppError> {
        if !self.is_valid() {
            return Err(AppError::Validation("请先选择横幅图片".to_string()));
        }
        let mut form = Form::new();
        if let Some(image) = &self.image {
            form = form.part("image", image.to_part()?);
        }
        Ok(self
            .fields()
            .into_iter()
            .fold(form, |form, (name, value)| form.text(name, value)))
    }

    /// 仅切换启用状态的表单。
    pub fn status_only(is_active: bool) -> Form {
        Form::new().text("isActive", bool_field(is_active))
    }
}

/// 分类表单。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryForm {
    pub title: String,
    pub slug: String,
    /// 已有图片地址（JSON 提交时使用）。
    pub image_url: String,
    pub image: Option<UploadFile>,
}

impl CategoryForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_category(category: &Category) -> Self {
        Self {
            title: category.title.clone(),
            slug: category.slug.clone().unwrap_or_default(),
            image_url: category.image.clone(),
            image: None,
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.title.trim().is_empty() {
            return Err(AppError::Validation("分类标题不能为空".to_string()));
        }
        Ok(())
    }

    /// 是否需要以 multipart 方式提交（选了新图片）。
    pub fn has_upload(&self) -> bool {
        self.image.is_some()
    }

    pub fn to_input(&self) -> CategoryInput {
        CategoryInput {
            title: self.title.clone(),
            image: self.image_url.clone(),
            slug: Some(self.slug.clone()).filter(|s| !s.trim().is_empty()),
        }
    }

    pub fn fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![("title".to_string(), self.title.clone())];
        if !self.slug.trim().is_empty() {
            fields.push(("slug".to_string(), self.slug.clone()));
        }
        fields
    }

    pub fn to_multipart(&self) -> Result<Form, AppError> {
        self.validate()?;
        let mut form = text_form(self.fields());
        if let Some(image) = &self.image {
            form = form.part("image", image.to_part()?);
        }
        Ok(form)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jpeg(name: &str) -> UploadFile {
        UploadFile::new(name, "image/jpeg", Bytes::from_static(&[0xFF, 0xD8, 0xFF]))
    }

    fn product_with_images(count: usize) -> Product {
        Product {
            id: "p1".to_string(),
            title: "Tee".to_string(),
            description: None,
            price: 12.5,
            stock: 4,
            category_id: "c1".to_string(),
            is_featured: Some(true),
            is_best_seller: None,
            is_best_select: None,
            priority: Some(3),
            image_urls: Some((0..count).map(|i| format!("uploads/{}.jpg", i)).collect()),
        }
    }

    #[test]
    fn product_image_limit_counts_existing_images() {
        let mut form = ProductForm::from_product(&product_with_images(3));

        let err = form
            .add_images(vec![jpeg("a.jpg"), jpeg("b.jpg"), jpeg("c.jpg")])
            .expect_err("six images must be rejected");
        assert_eq!(err.to_string(), "Maximum 5 images allowed");
        assert!(form.images().is_empty());

        form.add_images(vec![jpeg("a.jpg"), jpeg("b.jpg")]).expect("five is fine");
        assert_eq!(form.total_images(), 5);

        form.remove_existing_image(0);
        form.add_images(vec![jpeg("c.jpg")]).expect("room freed by removal");
        assert_eq!(form.images_to_remove(), &["uploads/0.jpg".to_string()]);
    }

    #[test]
    fn product_fields_clamp_negatives_and_encode_flags() {
        let mut form = ProductForm::from_product(&product_with_images(2));
        form.price = -3.0;
        form.stock = -1;
        form.priority = -7;
        form.remove_existing_image(1);
        form.remove_existing_image(0);

        let fields = form.fields();
        let get = |name: &str| {
            fields
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str())
        };

        assert_eq!(get("price"), Some("0"));
        assert_eq!(get("stock"), Some("0"));
        assert_eq!(get("priority"), Some("0"));
        assert_eq!(get("isFeatured"), Some("true"));
        assert_eq!(get("isBestSeller"), Some("false"));
        assert_eq!(get("imagesToRemove[0]"), Some("uploads/1.jpg"));
        assert_eq!(get("imagesToRemove[1]"), Some("uploads/0.jpg"));
    }

    #[test]
    fn product_requires_title_and_category() {
        let mut form = ProductForm::new();
        assert!(form.validate().is_err());

        form.title = "Mug".to_string();
        assert!(form.to_multipart().is_err());

        form.category_id = "c9".to_string();
        assert!(form.to_multipart().is_ok());
    }

    #[test]
    fn banner_defaults_and_validity() {
        let mut form = BannerForm::new();
        assert_eq!(form.priority, 1);
        assert!(form.is_active);
        assert!(!form.is_valid());
        assert!(form.to_multipart().is_err());

        form.set_image(jpeg("hero.jpg"));
        assert!(form.is_valid());
        assert_eq!(form.preview(), Some("hero.jpg"));
        assert!(form.to_multipart().is_ok());
    }

    #[test]
    fn banner_edit_keeps_existing_image_as_preview() {
        let banner = Banner {
            id: "b1".to_string(),
            image: "uploads/b1.jpg".to_string(),
            url: "/products".to_string(),
            text: None,
            priority: None,
            created_at: None,
            is_active: Some(false),
        };
        let form = BannerForm::from_banner(&banner);

        assert!(form.is_valid());
        assert!(form.image.is_none());
        assert_eq!(form.priority, 1);
        assert_eq!(
            form.fields(),
            vec![
                ("url".to_string(), "/products".to_string()),
                ("text".to_string(), String::new()),
                ("priority".to_string(), "1".to_string()),
                ("isActive".to_string(), "false".to_string()),
            ]
        );
    }

    #[test]
    fn category_form_omits_blank_slug() {
        let mut form = CategoryForm::new();
        form.title = "Shoes".to_string();
        form.slug = "  ".to_string();

        assert_eq!(form.to_input().slug, None);
        assert_eq!(form.fields().len(), 1);
        assert!(!form.has_upload());

        form.image = Some(jpeg("shoes.jpg"));
        assert!(form.has_upload());
        assert!(form.to_multipart().is_ok());
    }

    #[test]
    fn upload_file_from_encoded_image() {
        let encoded = EncodedImage {
            file_name: "x.jpg".to_string(),
            mime_type: "image/jpeg",
            bytes: Bytes::from_static(b"jpg"),
            width: 300,
            height: 300,
        };

        let upload = UploadFile::from(encoded);
        assert_eq!(upload.mime_type, "image/jpeg");
        assert_eq!(upload.file_name, "x.jpg");
    }
}
