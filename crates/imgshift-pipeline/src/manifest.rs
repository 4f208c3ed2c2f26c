//! Per-product checkpoint manifests.
//!
//! A manifest snapshots the fetched product, the renaming plan, and every
//! upload completed so far. It is rewritten after each upload so an aborted
//! run can resume without repeating network calls, and it is sufficient on
//! its own to regenerate the import file.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use imgshift_core::{legacy_id, OptionSchema, Product};
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::gallery::{build_rows, GalleryRow, UploadedEntry};
use crate::rename::RenamedEntry;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductManifest {
    pub product: Product,
    pub option_schema: OptionSchema,
    pub renamed: Vec<RenamedEntry>,
    #[serde(default)]
    pub uploads: Vec<UploadedEntry>,
    pub generated_at: DateTime<Utc>,
}

impl ProductManifest {
    #[must_use]
    pub fn new(product: Product, renamed: Vec<RenamedEntry>) -> Self {
        let option_schema = product.option_schema();
        Self {
            product,
            option_schema,
            renamed,
            uploads: Vec::new(),
            generated_at: Utc::now(),
        }
    }

    /// `{dir}/{legacy product id}.json`
    #[must_use]
    pub fn path_in(dir: &Path, product_id: &str) -> PathBuf {
        dir.join(format!("{}.json", legacy_id(product_id)))
    }

    /// The recorded upload for `entry`, matched on filename and source image.
    #[must_use]
    pub fn upload_for(&self, entry: &RenamedEntry) -> Option<&UploadedEntry> {
        self.uploads.iter().find(|u| {
            u.renamed.new_filename == entry.new_filename && u.renamed.image.id == entry.image.id
        })
    }

    /// Records an upload, replacing any earlier record for the same filename.
    pub fn record_upload(&mut self, upload: UploadedEntry) {
        self.uploads
            .retain(|u| u.renamed.new_filename != upload.renamed.new_filename);
        self.uploads.push(upload);
        self.generated_at = Utc::now();
    }

    /// Carries over uploads from an earlier manifest whose filename and
    /// source image still match the current plan.
    pub fn adopt_uploads(&mut self, previous: &ProductManifest) {
        let reusable: Vec<UploadedEntry> = self
            .renamed
            .iter()
            .filter_map(|entry| previous.upload_for(entry).cloned())
            .collect();
        for upload in reusable {
            self.record_upload(upload);
        }
    }

    /// Planned copies with no recorded upload, in renaming order.
    pub fn pending(&self) -> impl Iterator<Item = &RenamedEntry> {
        self.renamed
            .iter()
            .filter(|entry| self.upload_for(entry).is_none())
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.pending().next().is_none()
    }

    /// Uploads in renaming order. Copies not uploaded yet are skipped.
    #[must_use]
    pub fn ordered_uploads(&self) -> Vec<UploadedEntry> {
        self.renamed
            .iter()
            .filter_map(|entry| self.upload_for(entry).cloned())
            .collect()
    }

    #[must_use]
    pub fn rows(&self) -> Vec<GalleryRow> {
        build_rows(&self.product, &self.ordered_uploads(), &self.option_schema)
    }
}

/// Writes `manifest` to `{dir}/{legacy id}.json` via a temp file + rename.
///
/// # Errors
///
/// Returns [`PipelineError::Io`] on filesystem failures and
/// [`PipelineError::Json`] if serialization fails.
pub fn save_manifest(dir: &Path, manifest: &ProductManifest) -> Result<PathBuf, PipelineError> {
    std::fs::create_dir_all(dir).map_err(|source| PipelineError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let path = ProductManifest::path_in(dir, &manifest.product.id);
    let body = serde_json::to_vec_pretty(manifest).map_err(|source| PipelineError::Json {
        path: path.clone(),
        source,
    })?;

    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, body).map_err(|source| PipelineError::Io {
        path: tmp.clone(),
        source,
    })?;
    std::fs::rename(&tmp, &path).map_err(|source| PipelineError::Io {
        path: path.clone(),
        source,
    })?;

    Ok(path)
}

/// # Errors
///
/// Returns [`PipelineError::Io`] if the file cannot be read and
/// [`PipelineError::Json`] if it is not a valid manifest.
pub fn load_manifest(path: &Path) -> Result<ProductManifest, PipelineError> {
    let body = std::fs::read(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&body).map_err(|source| PipelineError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads every `*.json` manifest in `dir`, sorted by file name. A missing
/// directory yields an empty list.
///
/// # Errors
///
/// Propagates the first read or parse failure.
pub fn load_manifests(dir: &Path) -> Result<Vec<ProductManifest>, PipelineError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(PipelineError::Io {
                path: dir.to_path_buf(),
                source,
            })
        }
    };

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| PipelineError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        }
    }
    paths.sort();

    paths.iter().map(|p| load_manifest(p)).collect()
}

#[cfg(test)]
mod tests {
    use imgshift_core::{ProductImage, SelectedOption, Variant};

    use super::*;
    use crate::associate::build_associations;
    use crate::rename::{rename, CarryForwardPolicy, NamingState};

    fn sample_manifest() -> ProductManifest {
        let product = Product {
            id: "gid://shopify/Product/55".to_owned(),
            handle: "mug".to_owned(),
            title: "Mug".to_owned(),
            images: vec![
                ProductImage {
                    id: "img-a".to_owned(),
                    source_url: "https://cdn.example.com/a.png".to_owned(),
                    alt_text: Some("Red mug".to_owned()),
                },
                ProductImage {
                    id: "img-b".to_owned(),
                    source_url: "https://cdn.example.com/b.png".to_owned(),
                    alt_text: None,
                },
            ],
            variants: vec![Variant {
                id: "gid://shopify/ProductVariant/9".to_owned(),
                selected_options: vec![SelectedOption::new("Color", "Red")],
                linked_image_id: Some("img-a".to_owned()),
            }],
        };
        let entries = build_associations(&product.images, &product.variants);
        let (renamed, _) = rename(
            &entries,
            &product.title,
            CarryForwardPolicy::Carry,
            NamingState::new(),
        );
        ProductManifest::new(product, renamed)
    }

    fn upload(entry: &RenamedEntry) -> UploadedEntry {
        UploadedEntry {
            renamed: entry.clone(),
            file_url: format!("https://files.example.com/{}", entry.new_filename),
        }
    }

    #[test]
    fn pending_shrinks_as_uploads_are_recorded() {
        let mut manifest = sample_manifest();
        assert_eq!(manifest.pending().count(), 2);
        assert!(!manifest.is_complete());

        let first = manifest.renamed[0].clone();
        manifest.record_upload(upload(&first));
        manifest.record_upload(upload(&first));
        assert_eq!(manifest.uploads.len(), 1);
        assert_eq!(manifest.pending().count(), 1);

        let second = manifest.renamed[1].clone();
        manifest.record_upload(upload(&second));
        assert!(manifest.is_complete());
        assert_eq!(manifest.rows().len(), 2);
    }

    #[test]
    fn adopt_uploads_only_reuses_matching_copies() {
        let mut previous = sample_manifest();
        let first = previous.renamed[0].clone();
        previous.record_upload(upload(&first));
        let mut stale = upload(&previous.renamed[1].clone());
        stale.renamed.image.id = "img-other".to_owned();
        previous.uploads.push(stale);

        let mut current = sample_manifest();
        current.adopt_uploads(&previous);
        assert_eq!(current.uploads.len(), 1);
        assert_eq!(current.pending().count(), 1);
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut manifest = sample_manifest();
        let first = manifest.renamed[0].clone();
        manifest.record_upload(upload(&first));

        let path = save_manifest(dir.path(), &manifest).unwrap();
        assert_eq!(path, dir.path().join("55.json"));
        assert!(!dir.path().join("55.json.tmp").exists());

        let loaded = load_manifest(&path).unwrap();
        assert_eq!(loaded, manifest);
    }

    #[test]
    fn load_manifests_skips_other_files_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = sample_manifest();
        a.product.id = "gid://shopify/Product/2".to_owned();
        let mut b = sample_manifest();
        b.product.id = "gid://shopify/Product/1".to_owned();
        save_manifest(dir.path(), &a).unwrap();
        save_manifest(dir.path(), &b).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();

        let loaded = load_manifests(dir.path()).unwrap();
        let ids: Vec<&str> = loaded.iter().map(|m| m.product.id.as_str()).collect();
        assert_eq!(ids, ["gid://shopify/Product/1", "gid://shopify/Product/2"]);
    }

    #[test]
    fn load_manifests_on_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_manifests(&dir.path().join("absent")).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn corrupt_manifest_reports_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = load_manifest(&path).unwrap_err();
        assert!(matches!(err, PipelineError::Json { .. }), "got: {err:?}");
    }
}
