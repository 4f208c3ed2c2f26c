//! Product reads: single-product fetch and paginated search.

use imgshift_core::{product_gid, Product};
use serde_json::json;

use crate::error::ShopifyError;
use crate::normalize::normalize_product;
use crate::queries;
use crate::types::{ProductQueryData, ProductSearchData, ProductSummary};

use super::{ShopifyAdminClient, MAX_PAGES};

impl ShopifyAdminClient {
    /// Fetches one product with its images and variants in catalog order.
    ///
    /// `product_id` may be a bare numeric id or a global id.
    ///
    /// # Errors
    ///
    /// - [`ShopifyError::NotFound`] when the store has no such product.
    /// - [`ShopifyError::DataShape`] when required fields are missing.
    /// - Any transport or GraphQL error from the request.
    pub async fn fetch_product(&self, product_id: &str) -> Result<Product, ShopifyError> {
        let gid = product_gid(product_id);
        let data: ProductQueryData = self
            .graphql("product", queries::PRODUCT, &json!({ "id": gid }))
            .await?;
        let product = data
            .product
            .ok_or_else(|| ShopifyError::NotFound { id: gid })?;
        let product = normalize_product(product)?;
        tracing::debug!(
            product_id = %product.id,
            images = product.images.len(),
            variants = product.variants.len(),
            "fetched product"
        );
        Ok(product)
    }

    /// Lists every product matching a search `query`
    /// (e.g. `vendor:Acme tag:tiles`), following cursors until exhausted.
    ///
    /// # Errors
    ///
    /// Returns [`ShopifyError::PaginationLimit`] after [`MAX_PAGES`] pages,
    /// or any error from an individual page request.
    pub async fn search_products(&self, query: &str) -> Result<Vec<ProductSummary>, ShopifyError> {
        let mut found = Vec::new();
        let mut cursor: Option<String> = None;
        let mut page_count = 0usize;

        loop {
            page_count += 1;
            if page_count > MAX_PAGES {
                return Err(ShopifyError::PaginationLimit {
                    query: query.to_owned(),
                    max_pages: MAX_PAGES,
                });
            }

            let data: ProductSearchData = self
                .graphql(
                    "productSearch",
                    queries::PRODUCT_SEARCH,
                    &json!({ "query": query, "after": cursor }),
                )
                .await?;
            let connection = data.products;
            let next = connection
                .page_info
                .as_ref()
                .filter(|p| p.has_next_page)
                .and_then(|p| p.end_cursor.clone());
            found.extend(connection.edges.into_iter().map(|edge| edge.node));

            match next {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        tracing::debug!(query, pages = page_count, found = found.len(), "product search complete");
        Ok(found)
    }

    /// Global ids of every product matching `query`, in search order.
    ///
    /// # Errors
    ///
    /// See [`Self::search_products`].
    pub async fn search_product_ids(&self, query: &str) -> Result<Vec<String>, ShopifyError> {
        Ok(self
            .search_products(query)
            .await?
            .into_iter()
            .map(|p| p.id)
            .collect())
    }
}
