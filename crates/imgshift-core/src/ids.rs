//! Helpers for Shopify global ids (`gid://shopify/<Type>/<n>`).

const PRODUCT_GID_PREFIX: &str = "gid://shopify/Product/";

/// Returns the trailing numeric segment of a global id, or the input
/// unchanged when it contains no `/`.
#[must_use]
pub fn legacy_id(gid: &str) -> &str {
    gid.rsplit('/').next().unwrap_or(gid)
}

/// Expands a bare numeric product id to its global id form. Inputs that are
/// already global ids are returned unchanged.
#[must_use]
pub fn product_gid(id: &str) -> String {
    let id = id.trim();
    if id.starts_with("gid://") {
        id.to_owned()
    } else {
        format!("{PRODUCT_GID_PREFIX}{id}")
    }
}
