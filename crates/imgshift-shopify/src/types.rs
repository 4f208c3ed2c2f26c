//! Admin GraphQL response shapes.
//!
//! Product fields are modeled as `Option` even where the schema marks them
//! non-null: a token missing `read_products` scope, or a query trimmed by a
//! proxy, yields partial objects, and [`crate::normalize`] reports exactly
//! which field was absent instead of failing inside serde.

use serde::Deserialize;

/// Standard GraphQL envelope.
#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
    #[serde(default)]
    pub extensions: Option<GraphQlErrorExtensions>,
}

impl GraphQlError {
    /// Shopify signals cost-based throttling with `extensions.code = "THROTTLED"`
    /// on an HTTP 200 response.
    #[must_use]
    pub fn is_throttled(&self) -> bool {
        self.extensions
            .as_ref()
            .and_then(|ext| ext.code.as_deref())
            .is_some_and(|code| code == "THROTTLED")
    }
}

#[derive(Debug, Deserialize)]
pub struct GraphQlErrorExtensions {
    pub code: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "T: Deserialize<'de>"))]
pub struct Connection<T> {
    #[serde(default)]
    pub edges: Vec<Edge<T>>,
    pub page_info: Option<PageInfo>,
}

impl<T> Connection<T> {
    #[must_use]
    pub fn has_next_page(&self) -> bool {
        self.page_info.as_ref().is_some_and(|p| p.has_next_page)
    }
}

#[derive(Debug, Deserialize)]
pub struct Edge<T> {
    pub node: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

// ---------------------------------------------------------------------------
// product(id:)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ProductQueryData {
    pub product: Option<GqlProduct>,
}

#[derive(Debug, Deserialize)]
pub struct GqlProduct {
    pub id: Option<String>,
    pub handle: Option<String>,
    pub title: Option<String>,
    pub images: Option<Connection<GqlImage>>,
    pub variants: Option<Connection<GqlVariant>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GqlImage {
    pub id: Option<String>,
    /// `originalSrc` on API versions before 2023-01.
    #[serde(alias = "originalSrc")]
    pub url: Option<String>,
    pub alt_text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GqlVariant {
    pub id: Option<String>,
    #[serde(default)]
    pub selected_options: Vec<GqlSelectedOption>,
    pub image: Option<GqlImageRef>,
}

#[derive(Debug, Deserialize)]
pub struct GqlSelectedOption {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct GqlImageRef {
    pub id: Option<String>,
}

// ---------------------------------------------------------------------------
// products(query:)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ProductSearchData {
    pub products: Connection<ProductSummary>,
}

/// One search hit, as listed by `count` and consumed by `batch`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProductSummary {
    pub id: String,
    pub title: String,
    pub handle: String,
    #[serde(default)]
    pub vendor: Option<String>,
}

// ---------------------------------------------------------------------------
// Staged uploads and files
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StagedUploadsData {
    pub staged_uploads_create: Option<StagedUploadsPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StagedUploadsPayload {
    #[serde(default)]
    pub staged_targets: Vec<StagedTarget>,
    #[serde(default)]
    pub user_errors: Vec<UserError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StagedTarget {
    pub url: Option<String>,
    pub resource_url: Option<String>,
    #[serde(default)]
    pub parameters: Vec<StagedParameter>,
}

#[derive(Debug, Deserialize)]
pub struct StagedParameter {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct UserError {
    #[serde(default)]
    pub field: Option<Vec<String>>,
    pub message: String,
}

impl std::fmt::Display for UserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.field {
            Some(field) if !field.is_empty() => write!(f, "{}: {}", field.join("."), self.message),
            _ => f.write_str(&self.message),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileCreateData {
    pub file_create: Option<FileCreatePayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileCreatePayload {
    #[serde(default)]
    pub files: Vec<FileNode>,
    #[serde(default)]
    pub user_errors: Vec<UserError>,
}

#[derive(Debug, Deserialize)]
pub struct FileNodeData {
    pub node: Option<FileNode>,
}

/// A `MediaImage` or `GenericFile` node; whichever URL field is present wins.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileNode {
    pub id: Option<String>,
    pub file_status: Option<String>,
    pub image: Option<FileImage>,
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FileImage {
    pub url: Option<String>,
}

impl FileNode {
    #[must_use]
    pub fn public_url(&self) -> Option<&str> {
        self.image
            .as_ref()
            .and_then(|img| img.url.as_deref())
            .or(self.url.as_deref())
            .filter(|url| !url.is_empty())
    }

    #[must_use]
    pub fn has_failed(&self) -> bool {
        self.file_status.as_deref() == Some("FAILED")
    }
}
