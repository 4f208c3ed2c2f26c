//! Read-only diagnostics: `count` and `inspect`.

use imgshift_core::{legacy_id, AppConfig, Product};
use imgshift_pipeline::{
    build_associations, rename, AssociationEntry, CarryForwardPolicy, NamingState,
};
use imgshift_shopify::ShopifyAdminClient;

/// # Errors
///
/// Returns an error if the client cannot be built or the search fails.
pub(crate) async fn run_count(config: &AppConfig, query: &str) -> anyhow::Result<()> {
    let client = ShopifyAdminClient::new(config)?;
    let products = client.search_products(query).await?;

    println!("{} products match \"{query}\"", products.len());
    for product in &products {
        println!(
            "  {:<16} {:<40} {}",
            legacy_id(&product.id),
            product.handle,
            product.vendor.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

/// Prints a product's images with their variant links, then the filenames a
/// migration would assign. Nothing is downloaded.
///
/// # Errors
///
/// Returns an error if the client cannot be built or the fetch fails.
pub(crate) async fn run_inspect(
    config: &AppConfig,
    product_id: &str,
    policy: CarryForwardPolicy,
) -> anyhow::Result<()> {
    let client = ShopifyAdminClient::new(config)?;
    let product = client.fetch_product(product_id).await?;
    let entries = build_associations(&product.images, &product.variants);

    for line in describe(&product, &entries) {
        println!("{line}");
    }

    let (renamed, _) = rename(&entries, &product.title, policy, NamingState::new());
    println!("planned filenames:");
    for entry in &renamed {
        println!(
            "  {:<48} <- {} ({:?})",
            entry.new_filename,
            legacy_id(&entry.image.id),
            entry.attribution
        );
    }
    Ok(())
}

fn describe(product: &Product, entries: &[AssociationEntry]) -> Vec<String> {
    let schema = product.option_schema();
    let mut lines = vec![
        format!("{} ({})", product.title, product.handle),
        format!(
            "  {} images, {} variants, options [{}]",
            product.images.len(),
            product.variants.len(),
            schema.names().join(", ")
        ),
    ];
    for (idx, entry) in entries.iter().enumerate() {
        let linked = if entry.is_linked() {
            entry
                .variants
                .iter()
                .map(|v| v.option_values().collect::<Vec<_>>().join(" / "))
                .collect::<Vec<_>>()
                .join(", ")
        } else {
            "-".to_owned()
        };
        lines.push(format!(
            "  #{:<3} {:<16} {}",
            idx + 1,
            legacy_id(&entry.image.id),
            linked
        ));
    }
    lines
}

#[cfg(test)]
mod tests {
    use imgshift_core::{ProductImage, SelectedOption, Variant};

    use super::*;

    #[test]
    fn describe_lists_links_per_image() {
        let product = Product {
            id: "gid://shopify/Product/1".to_owned(),
            handle: "tee".to_owned(),
            title: "Tee".to_owned(),
            images: vec![
                ProductImage {
                    id: "gid://shopify/ProductImage/5".to_owned(),
                    source_url: "https://cdn.example.com/5.jpg".to_owned(),
                    alt_text: None,
                },
                ProductImage {
                    id: "gid://shopify/ProductImage/6".to_owned(),
                    source_url: "https://cdn.example.com/6.jpg".to_owned(),
                    alt_text: None,
                },
            ],
            variants: vec![
                Variant {
                    id: "v1".to_owned(),
                    selected_options: vec![
                        SelectedOption::new("Color", "Red"),
                        SelectedOption::new("Size", "S"),
                    ],
                    linked_image_id: Some("gid://shopify/ProductImage/5".to_owned()),
                },
                Variant {
                    id: "v2".to_owned(),
                    selected_options: vec![
                        SelectedOption::new("Color", "Red"),
                        SelectedOption::new("Size", "L"),
                    ],
                    linked_image_id: Some("gid://shopify/ProductImage/5".to_owned()),
                },
            ],
        };
        let entries = build_associations(&product.images, &product.variants);
        let lines = describe(&product, &entries);

        assert_eq!(lines[0], "Tee (tee)");
        assert_eq!(lines[1], "  2 images, 2 variants, options [Color, Size]");
        assert!(lines[2].ends_with("Red / S, Red / L"), "got {}", lines[2]);
        assert!(lines[3].ends_with(" -"), "got {}", lines[3]);
    }
}
