//! Offline commands over stored manifests: `csv` and `verify`.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::Context as _;
use imgshift_core::{legacy_id, AppConfig};
use imgshift_pipeline::import_file::{option_width, read_product_ids, write_import_file};
use imgshift_pipeline::{load_manifests, GalleryRow, ProductManifest};

use crate::migrate::manifest_dir;

/// Rebuilds the import file from every complete manifest.
///
/// # Errors
///
/// Returns an error if manifests cannot be read or the file cannot be written.
pub(crate) fn run_csv(config: &AppConfig, output: &Path) -> anyhow::Result<()> {
    let manifests = load_manifests(&manifest_dir(config))?;
    if manifests.is_empty() {
        println!(
            "no manifests under {}; run `migrate` first",
            manifest_dir(config).display()
        );
        return Ok(());
    }

    let rows = complete_rows(&manifests);
    let width = option_width(&rows);
    write_import_file(output, &rows, width)?;
    println!(
        "wrote {} rows from {} manifests to {}",
        rows.len(),
        manifests.len(),
        output.display()
    );
    Ok(())
}

fn complete_rows(manifests: &[ProductManifest]) -> Vec<GalleryRow> {
    let mut rows = Vec::new();
    for manifest in manifests {
        if manifest.is_complete() {
            rows.extend(manifest.rows());
        } else {
            tracing::warn!(
                product_id = %manifest.product.id,
                pending = manifest.pending().count(),
                "skipping incomplete manifest; rerun migrate for this product"
            );
        }
    }
    rows
}

/// Product ids present on one side only.
#[derive(Debug, Default, PartialEq, Eq)]
struct IdDiff {
    missing_from_csv: Vec<String>,
    unknown_in_csv: Vec<String>,
}

fn diff_ids(manifest_ids: &BTreeSet<String>, csv_ids: &BTreeSet<String>) -> IdDiff {
    IdDiff {
        missing_from_csv: manifest_ids.difference(csv_ids).cloned().collect(),
        unknown_in_csv: csv_ids.difference(manifest_ids).cloned().collect(),
    }
}

/// # Errors
///
/// Returns an error if the import file or the manifests cannot be read.
pub(crate) fn run_verify(config: &AppConfig, csv: &Path) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(csv)
        .with_context(|| format!("reading import file {}", csv.display()))?;
    let csv_ids = read_product_ids(&text);
    let manifest_ids: BTreeSet<String> = load_manifests(&manifest_dir(config))?
        .iter()
        .filter(|m| m.is_complete())
        .map(|m| legacy_id(&m.product.id).to_owned())
        .collect();

    let diff = diff_ids(&manifest_ids, &csv_ids);
    println!(
        "{} products in {}, {} migrated products in manifests",
        csv_ids.len(),
        csv.display(),
        manifest_ids.len()
    );
    if diff == IdDiff::default() {
        println!("import file and manifests agree");
        return Ok(());
    }
    for id in &diff.missing_from_csv {
        println!("  missing from import file: {id}");
    }
    for id in &diff.unknown_in_csv {
        println!("  no complete manifest for: {id}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use imgshift_core::{Product, ProductImage};
    use imgshift_pipeline::{
        build_associations, rename, save_manifest, CarryForwardPolicy, NamingState,
        UploadedEntry,
    };

    use super::*;

    fn manifest(id: &str, uploaded: bool) -> ProductManifest {
        let product = Product {
            id: format!("gid://shopify/Product/{id}"),
            handle: format!("p-{id}"),
            title: format!("P {id}"),
            images: vec![ProductImage {
                id: format!("img-{id}"),
                source_url: format!("https://cdn.example.com/{id}.jpg"),
                alt_text: None,
            }],
            variants: vec![],
        };
        let entries = build_associations(&product.images, &product.variants);
        let (renamed, _) = rename(&entries, &product.title, CarryForwardPolicy::Carry, NamingState::new());
        let mut manifest = ProductManifest::new(product, renamed);
        if uploaded {
            let entry = manifest.renamed[0].clone();
            manifest.record_upload(UploadedEntry {
                file_url: format!("https://cdn.shopify.com/files/{}", entry.new_filename),
                renamed: entry,
            });
        }
        manifest
    }

    fn ids(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| (*v).to_owned()).collect()
    }

    #[test]
    fn incomplete_manifests_contribute_no_rows() {
        let rows = complete_rows(&[manifest("1", true), manifest("2", false)]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].product_id, "gid://shopify/Product/1");
    }

    #[test]
    fn diff_reports_both_directions() {
        let diff = diff_ids(&ids(&["1", "2", "3"]), &ids(&["2", "3", "9"]));
        assert_eq!(diff.missing_from_csv, ["1"]);
        assert_eq!(diff.unknown_in_csv, ["9"]);
    }

    #[test]
    fn csv_then_verify_round_trip_on_disk() {
        let work = tempfile::tempdir().unwrap();
        let mut config = crate::test_support::config(work.path());
        config.output_path = work.path().join("out.csv");
        let dir = manifest_dir(&config);
        save_manifest(&dir, &manifest("1", true)).unwrap();
        save_manifest(&dir, &manifest("2", true)).unwrap();

        run_csv(&config, &config.output_path).unwrap();
        let text = std::fs::read_to_string(&config.output_path).unwrap();
        assert_eq!(read_product_ids(&text), ids(&["1", "2"]));
        run_verify(&config, &config.output_path).unwrap();
    }
}
