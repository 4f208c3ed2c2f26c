//! In-memory catalog record for one product, fetched once and never mutated.
//!
//! Image and variant order is catalog order (gallery order for images,
//! declaration order for variants) and is preserved by every later stage.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A product with its image gallery and purchasable variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Catalog identifier, e.g. `gid://shopify/Product/9678733148457`.
    pub id: String,
    pub handle: String,
    pub title: String,
    /// Gallery order.
    pub images: Vec<ProductImage>,
    /// Declaration order.
    pub variants: Vec<Variant>,
}

impl Product {
    /// Returns the variant with the given id, if present.
    #[must_use]
    pub fn variant(&self, variant_id: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.id == variant_id)
    }

    #[must_use]
    pub fn option_schema(&self) -> OptionSchema {
        OptionSchema::from_variants(&self.variants)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    /// Opaque catalog id, unique within the product.
    pub id: String,
    pub source_url: String,
    #[serde(default)]
    pub alt_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedOption {
    pub name: String,
    pub value: String,
}

impl SelectedOption {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A purchasable configuration of a [`Product`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub id: String,
    /// Option pairs in the order the catalog reports them.
    pub selected_options: Vec<SelectedOption>,
    /// The single image this variant points at, if any.
    #[serde(default)]
    pub linked_image_id: Option<String>,
}

impl Variant {
    /// Option values in declaration order.
    pub fn option_values(&self) -> impl Iterator<Item = &str> {
        self.selected_options.iter().map(|o| o.value.as_str())
    }
}

/// Distinct option names across a product's variants, sorted lexicographically.
///
/// Drives the `Option{n} Name` / `Option{n} Value` columns of the import file:
/// every variant's options are aligned to this list by name before emission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSchema {
    names: Vec<String>,
}

impl OptionSchema {
    #[must_use]
    pub fn from_variants(variants: &[Variant]) -> Self {
        let names: BTreeSet<&str> = variants
            .iter()
            .flat_map(|v| v.selected_options.iter().map(|o| o.name.as_str()))
            .collect();
        Self {
            names: names.into_iter().map(str::to_owned).collect(),
        }
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Aligns `options` to the schema by name. The result always has
    /// `self.len()` entries; names absent from `options` yield `""`.
    #[must_use]
    pub fn align(&self, options: &[SelectedOption]) -> Vec<String> {
        self.names
            .iter()
            .map(|name| {
                options
                    .iter()
                    .find(|o| &o.name == name)
                    .map(|o| o.value.clone())
                    .unwrap_or_default()
            })
            .collect()
    }
}
