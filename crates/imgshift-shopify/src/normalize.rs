//! Conversion from Admin GraphQL shapes to [`imgshift_core::Product`].

use imgshift_core::{Product, ProductImage, SelectedOption, Variant};

use crate::error::ShopifyError;
use crate::types::{Connection, GqlImage, GqlProduct, GqlVariant};

/// Normalizes a fetched product, preserving image and variant order.
///
/// # Errors
///
/// Returns [`ShopifyError::DataShape`] when a required field (product id,
/// handle, title, either connection, or an image/variant id or image URL) is
/// missing from the response.
pub fn normalize_product(product: GqlProduct) -> Result<Product, ShopifyError> {
    let context = product
        .id
        .clone()
        .unwrap_or_else(|| "product".to_owned());
    let shape = |reason: &str| ShopifyError::DataShape {
        context: context.clone(),
        reason: reason.to_owned(),
    };

    let id = product.id.clone().ok_or_else(|| shape("missing id"))?;
    let handle = product.handle.ok_or_else(|| shape("missing handle"))?;
    let title = product.title.ok_or_else(|| shape("missing title"))?;
    let images = product
        .images
        .ok_or_else(|| shape("missing images connection"))?;
    let variants = product
        .variants
        .ok_or_else(|| shape("missing variants connection"))?;

    warn_if_truncated(&id, "images", &images);
    warn_if_truncated(&id, "variants", &variants);

    let images = images
        .edges
        .into_iter()
        .enumerate()
        .map(|(idx, edge)| normalize_image(edge.node).map_err(|r| shape(&format!("image {idx}: {r}"))))
        .collect::<Result<Vec<_>, _>>()?;
    let variants = variants
        .edges
        .into_iter()
        .enumerate()
        .map(|(idx, edge)| {
            normalize_variant(edge.node).map_err(|r| shape(&format!("variant {idx}: {r}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Product {
        id,
        handle,
        title,
        images,
        variants,
    })
}

fn normalize_image(image: GqlImage) -> Result<ProductImage, &'static str> {
    Ok(ProductImage {
        id: image.id.ok_or("missing id")?,
        source_url: image.url.filter(|u| !u.is_empty()).ok_or("missing url")?,
        alt_text: image.alt_text.filter(|a| !a.trim().is_empty()),
    })
}

fn normalize_variant(variant: GqlVariant) -> Result<Variant, &'static str> {
    Ok(Variant {
        id: variant.id.ok_or("missing id")?,
        selected_options: variant
            .selected_options
            .into_iter()
            .map(|opt| SelectedOption::new(opt.name, opt.value))
            .collect(),
        linked_image_id: variant.image.and_then(|img| img.id),
    })
}

fn warn_if_truncated<T>(product_id: &str, connection: &str, conn: &Connection<T>) {
    if conn.has_next_page() {
        tracing::warn!(
            product_id,
            connection,
            fetched = conn.edges.len(),
            "connection has more than one page; only the first page is migrated"
        );
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
