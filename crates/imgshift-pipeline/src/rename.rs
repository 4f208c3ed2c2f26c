//! Deterministic filenames and per-variant sequence numbers.
//!
//! Every (image, variant) pairing gets its own [`RenamedEntry`]. Filenames
//! encode the product title and the variant's option values, so a shared
//! image yields one copy per linking variant. Filenames double as storage
//! keys and are therefore unique within a run.

use std::collections::{HashMap, HashSet};

use imgshift_core::{ProductImage, SelectedOption, Variant};
use serde::{Deserialize, Serialize};

use crate::associate::{AssociationEntry, CarryForward};
use crate::slug::normalize;

const DEFAULT_EXTENSION: &str = ".jpg";

/// Whether unlinked images inherit the most recent linked variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CarryForwardPolicy {
    #[default]
    Carry,
    Disabled,
}

/// How a renamed copy came to be attributed to its variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribution {
    /// The variant links this image.
    Direct,
    /// The image follows a linked image and inherits its variants.
    CarriedForward,
    /// Product-level image with no variant.
    Gallery,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenamedEntry {
    pub image: ProductImage,
    /// 1-based position of the source image in the catalog gallery.
    pub gallery_position: usize,
    pub variant_id: Option<String>,
    pub attribution: Attribution,
    /// Option pairs of the attributed variant; empty for gallery images.
    pub options: Vec<SelectedOption>,
    pub new_filename: String,
    /// 1-based, per variant (or per product for gallery images).
    pub sequence_number: u32,
}

/// Counters and claimed filenames threaded through [`rename`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamingState {
    variant_counters: HashMap<String, u32>,
    gallery_counter: u32,
    taken: HashSet<String>,
}

impl NamingState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// State for the next product in a batch: claimed filenames carry over,
    /// counters restart.
    #[must_use]
    pub fn next_product(self) -> Self {
        Self {
            taken: self.taken,
            ..Self::default()
        }
    }

    /// Marks `names` as claimed without touching the counters. Used for
    /// filenames recorded by other products in earlier runs.
    #[must_use]
    pub fn reserve<I>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        self.taken.extend(names);
        self
    }

    fn next_variant_sequence(&mut self, variant_id: &str) -> u32 {
        let counter = self
            .variant_counters
            .entry(variant_id.to_owned())
            .or_insert(0);
        *counter += 1;
        *counter
    }

    fn next_gallery_sequence(&mut self) -> u32 {
        self.gallery_counter += 1;
        self.gallery_counter
    }

    /// Claims `{stem}{ext}`, or the first free `{stem}-{n}{ext}` for n = 1, 2, ...
    fn claim(&mut self, stem: &str, ext: &str) -> String {
        let mut candidate = format!("{stem}{ext}");
        let mut n = 0u32;
        while self.taken.contains(&candidate) {
            n += 1;
            candidate = format!("{stem}-{n}{ext}");
        }
        self.taken.insert(candidate.clone());
        candidate
    }
}

/// Names every entry, in order.
///
/// Linked entries yield one copy per linking variant. Unlinked entries yield
/// one copy per carried-forward variant under [`CarryForwardPolicy::Carry`]
/// when a context exists, otherwise a single gallery copy.
#[must_use]
pub fn rename(
    entries: &[AssociationEntry],
    title: &str,
    policy: CarryForwardPolicy,
    state: NamingState,
) -> (Vec<RenamedEntry>, NamingState) {
    let title_slug = normalize(title);
    let mut state = state;
    let mut renamed = Vec::with_capacity(entries.len());
    let mut context = CarryForward::empty();

    for (idx, entry) in entries.iter().enumerate() {
        context = rename_entry(
            entry,
            idx + 1,
            &title_slug,
            policy,
            context,
            &mut state,
            &mut renamed,
        );
    }

    (renamed, state)
}

/// Names one entry and returns the carry-forward context for the next one.
fn rename_entry(
    entry: &AssociationEntry,
    gallery_position: usize,
    title_slug: &str,
    policy: CarryForwardPolicy,
    context: CarryForward,
    state: &mut NamingState,
    out: &mut Vec<RenamedEntry>,
) -> CarryForward {
    let ext = extension_of(&entry.image.source_url);

    if entry.is_linked() {
        for variant in &entry.variants {
            out.push(variant_copy(
                entry,
                gallery_position,
                variant,
                Attribution::Direct,
                title_slug,
                &ext,
                state,
            ));
        }
    } else if policy == CarryForwardPolicy::Carry && !context.is_empty() {
        for variant in context.variants() {
            out.push(variant_copy(
                entry,
                gallery_position,
                variant,
                Attribution::CarriedForward,
                title_slug,
                &ext,
                state,
            ));
        }
    } else {
        let sequence_number = state.next_gallery_sequence();
        let stem = join_stem(&[title_slug, "gallery", &format!("{sequence_number:02}")]);
        out.push(RenamedEntry {
            image: entry.image.clone(),
            gallery_position,
            variant_id: None,
            attribution: Attribution::Gallery,
            options: Vec::new(),
            new_filename: state.claim(&stem, &ext),
            sequence_number,
        });
    }

    context.advance(entry)
}

fn variant_copy(
    entry: &AssociationEntry,
    gallery_position: usize,
    variant: &Variant,
    attribution: Attribution,
    title_slug: &str,
    ext: &str,
    state: &mut NamingState,
) -> RenamedEntry {
    let sequence_number = state.next_variant_sequence(&variant.id);
    let values: Vec<&str> = variant.option_values().collect();
    let option_slug = normalize(&values.join("-"));
    let stem = join_stem(&[title_slug, &option_slug, &format!("{sequence_number:02}")]);

    RenamedEntry {
        image: entry.image.clone(),
        gallery_position,
        variant_id: Some(variant.id.clone()),
        attribution,
        options: variant.selected_options.clone(),
        new_filename: state.claim(&stem, ext),
        sequence_number,
    }
}

/// Joins the non-empty parts with `-`.
fn join_stem(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("-")
}

/// Lower-cased extension (with the dot) of the URL's last path segment,
/// ignoring query and fragment. Falls back to `.jpg`.
pub(crate) fn extension_of(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let last_segment = path.rsplit('/').next().unwrap_or(path);
    match last_segment.rfind('.') {
        Some(dot) if dot > 0 && dot + 1 < last_segment.len() => {
            let ext = &last_segment[dot + 1..];
            if ext.chars().all(|c| c.is_ascii_alphanumeric()) {
                format!(".{}", ext.to_ascii_lowercase())
            } else {
                DEFAULT_EXTENSION.to_owned()
            }
        }
        _ => DEFAULT_EXTENSION.to_owned(),
    }
}

#[cfg(test)]
#[path = "rename_test.rs"]
mod tests;
