//! Reassembles uploaded copies into one global gallery ordering.
//!
//! Variant groups come first, in catalog variant order; within a group the
//! first copy is the variant's canonical image and the rest become anonymous
//! rows right behind it. Product-level images follow in their original order.

use std::collections::{HashMap, HashSet};

use imgshift_core::{OptionSchema, Product};
use serde::{Deserialize, Serialize};

use crate::rename::RenamedEntry;

/// A renamed copy together with the public URL it was uploaded to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedEntry {
    #[serde(flatten)]
    pub renamed: RenamedEntry,
    pub file_url: String,
}

/// Write-mode directive for the import tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImageCommand {
    /// Replace the whole gallery; only the first row carries it.
    Replace,
    Merge,
}

impl ImageCommand {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ImageCommand::Replace => "REPLACE",
            ImageCommand::Merge => "MERGE",
        }
    }
}

impl std::fmt::Display for ImageCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryRow {
    pub product_id: String,
    pub handle: String,
    pub image_src: String,
    pub image_command: ImageCommand,
    /// 1-based, contiguous across the product.
    pub image_position: usize,
    pub variant_id: Option<String>,
    /// `(name, value)` pairs, one per schema column.
    pub options: Vec<(String, String)>,
    pub is_canonical_variant_image: bool,
}

impl GalleryRow {
    /// The `Variant Image` column: the image URL on canonical rows only.
    #[must_use]
    pub fn variant_image(&self) -> Option<&str> {
        self.is_canonical_variant_image
            .then_some(self.image_src.as_str())
    }
}

/// Builds the gallery rows for one product.
///
/// `uploads` must be in renaming order. Entries whose variant is not declared
/// on `product` are treated as product-level images.
#[must_use]
pub fn build_rows(
    product: &Product,
    uploads: &[UploadedEntry],
    schema: &OptionSchema,
) -> Vec<GalleryRow> {
    // Pass 1: partition.
    let mut variant_mapped: HashMap<&str, Vec<&UploadedEntry>> = HashMap::new();
    let mut product_level: Vec<&UploadedEntry> = Vec::new();
    for entry in uploads {
        match entry.renamed.variant_id.as_deref() {
            Some(variant_id) if product.variant(variant_id).is_some() => {
                variant_mapped.entry(variant_id).or_default().push(entry);
            }
            Some(variant_id) => {
                tracing::warn!(
                    product_id = %product.id,
                    variant_id,
                    filename = %entry.renamed.new_filename,
                    "uploaded copy references an unknown variant; treating as gallery image"
                );
                product_level.push(entry);
            }
            None => product_level.push(entry),
        }
    }

    // Pass 2: variant groups in declaration order.
    let mut ordered: Vec<(&UploadedEntry, bool)> = Vec::with_capacity(uploads.len());
    let mut consumed: HashSet<&str> = HashSet::new();
    for variant in &product.variants {
        let Some(group) = variant_mapped.get(variant.id.as_str()) else {
            continue;
        };
        for (idx, &entry) in group.iter().enumerate() {
            consumed.insert(entry.renamed.image.id.as_str());
            ordered.push((entry, idx == 0));
        }
    }

    // Pass 3: leftover product-level images.
    for entry in product_level {
        if !consumed.contains(entry.renamed.image.id.as_str()) {
            ordered.push((entry, false));
        }
    }

    ordered
        .into_iter()
        .enumerate()
        .map(|(idx, (entry, canonical))| {
            let image_position = idx + 1;
            let values = if canonical {
                schema.align(&entry.renamed.options)
            } else {
                vec![String::new(); schema.len()]
            };
            GalleryRow {
                product_id: product.id.clone(),
                handle: product.handle.clone(),
                image_src: entry.file_url.clone(),
                image_command: if image_position == 1 {
                    ImageCommand::Replace
                } else {
                    ImageCommand::Merge
                },
                image_position,
                variant_id: if canonical {
                    entry.renamed.variant_id.clone()
                } else {
                    None
                },
                options: schema.names().iter().cloned().zip(values).collect(),
                is_canonical_variant_image: canonical,
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "gallery_test.rs"]
mod tests;
