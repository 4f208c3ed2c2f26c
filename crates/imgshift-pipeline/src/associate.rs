//! Image-to-variant association.
//!
//! Each variant may point at one image; an image may be pointed at by any
//! number of variants. [`build_associations`] inverts those links into one
//! [`AssociationEntry`] per image, in gallery order. [`CarryForward`] models
//! the "current variant" context used to attribute unlinked follow-on shots.

use std::collections::HashMap;

use imgshift_core::{ProductImage, Variant};
use serde::{Deserialize, Serialize};

/// One catalog image and the variants that link to it directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationEntry {
    pub image: ProductImage,
    /// Linking variants in declaration order; empty for pure gallery images.
    pub variants: Vec<Variant>,
}

impl AssociationEntry {
    #[must_use]
    pub fn is_linked(&self) -> bool {
        !self.variants.is_empty()
    }
}

/// Builds one entry per image, preserving gallery order.
///
/// Variants whose `linked_image_id` does not match any image are ignored.
#[must_use]
pub fn build_associations(images: &[ProductImage], variants: &[Variant]) -> Vec<AssociationEntry> {
    let mut buckets: HashMap<&str, Vec<&Variant>> = HashMap::new();
    for variant in variants {
        if let Some(image_id) = variant.linked_image_id.as_deref() {
            buckets.entry(image_id).or_default().push(variant);
        }
    }

    let entries: Vec<AssociationEntry> = images
        .iter()
        .map(|image| AssociationEntry {
            image: image.clone(),
            variants: buckets
                .remove(image.id.as_str())
                .map(|linked| linked.into_iter().cloned().collect())
                .unwrap_or_default(),
        })
        .collect();

    for (image_id, orphaned) in &buckets {
        tracing::debug!(
            image_id,
            variants = orphaned.len(),
            "variant links an image that is not in the product gallery"
        );
    }

    entries
}

/// The most recently seen set of directly linked variants.
///
/// Empty before the first linked image; replaced wholesale by every linked
/// image; untouched by unlinked images.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CarryForward {
    variants: Vec<Variant>,
}

impl CarryForward {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the context that applies after `entry` has been seen.
    #[must_use]
    pub fn advance(self, entry: &AssociationEntry) -> Self {
        if entry.is_linked() {
            Self {
                variants: entry.variants.clone(),
            }
        } else {
            self
        }
    }

    #[must_use]
    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}
