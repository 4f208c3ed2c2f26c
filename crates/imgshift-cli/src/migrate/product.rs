//! One product, start to finish: fetch, plan, checkpoint, transfer.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use imgshift_core::{legacy_id, AppConfig};
use imgshift_pipeline::{
    build_associations, load_manifest, rename, save_manifest, GalleryRow, NamingState,
    ProductManifest, RenamedEntry, UploadedEntry,
};
use imgshift_shopify::ShopifyAdminClient;

use super::{manifest_dir, MigrateOptions};

#[derive(Debug)]
pub(crate) enum ProductOutcome {
    /// Every copy uploaded; rows are ready for the import file.
    Migrated(Vec<GalleryRow>),
    /// Dry run: the plan was printed and nothing was transferred.
    Planned,
}

fn download_dir(config: &AppConfig, product_id: &str) -> PathBuf {
    config
        .work_dir
        .join("downloads")
        .join(legacy_id(product_id))
}

/// Migrates a single product.
///
/// `state` carries filenames claimed by earlier products in the run (and any
/// the caller reserved) and is advanced past this product's names once
/// planning succeeds. A failure
/// during transfer leaves the checkpoint manifest on disk so a rerun only
/// transfers the remaining copies.
pub(crate) async fn migrate_product(
    client: &ShopifyAdminClient,
    config: &AppConfig,
    product_id: &str,
    options: &MigrateOptions,
    state: &mut NamingState,
) -> anyhow::Result<ProductOutcome> {
    let product = client.fetch_product(product_id).await?;
    let entries = build_associations(&product.images, &product.variants);
    let (renamed, next_state) = rename(
        &entries,
        &product.title,
        options.carry_forward,
        std::mem::take(state),
    );
    *state = next_state;

    tracing::info!(
        product_id = %product.id,
        handle = %product.handle,
        images = product.images.len(),
        variants = product.variants.len(),
        copies = renamed.len(),
        "planned product"
    );

    if options.dry_run {
        print_plan(&product.handle, &renamed);
        return Ok(ProductOutcome::Planned);
    }

    let manifests = manifest_dir(config);
    let mut manifest = ProductManifest::new(product, renamed);
    let previous_path = ProductManifest::path_in(&manifests, &manifest.product.id);
    if previous_path.exists() {
        match load_manifest(&previous_path) {
            Ok(previous) => {
                manifest.adopt_uploads(&previous);
                tracing::info!(
                    product_id = %manifest.product.id,
                    reused = manifest.uploads.len(),
                    "resuming from checkpoint manifest"
                );
            }
            Err(e) => tracing::warn!(
                path = %previous_path.display(),
                error = %e,
                "ignoring unreadable checkpoint manifest"
            ),
        }
    }
    save_manifest(&manifests, &manifest)?;

    // Uploads stream from memory; local copies exist only to be kept.
    let downloads = config
        .keep_downloads
        .then(|| download_dir(config, &manifest.product.id));
    if let Some(dir) = &downloads {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating download directory {}", dir.display()))?;
    }

    transfer_pending(client, config, &mut manifest, &manifests, downloads.as_deref()).await?;

    let rows = manifest.rows();
    tracing::info!(product_id = %manifest.product.id, rows = rows.len(), "product migrated");
    Ok(ProductOutcome::Migrated(rows))
}

/// Downloads and uploads every copy the manifest has no upload for,
/// checkpointing after each one. Each copy is also written to `downloads`
/// when given.
async fn transfer_pending(
    client: &ShopifyAdminClient,
    config: &AppConfig,
    manifest: &mut ProductManifest,
    manifests: &Path,
    downloads: Option<&Path>,
) -> anyhow::Result<()> {
    let pending: Vec<RenamedEntry> = manifest.pending().cloned().collect();
    let delay = Duration::from_millis(config.inter_request_delay_ms);
    // Copies of one source image are adjacent in renaming order.
    let mut last_download: Option<(String, Vec<u8>)> = None;

    for (idx, entry) in pending.iter().enumerate() {
        if idx > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let bytes = match &last_download {
            Some((image_id, bytes)) if *image_id == entry.image.id => bytes.clone(),
            _ => {
                let bytes = client
                    .download_image(&entry.image.source_url)
                    .await
                    .with_context(|| format!("downloading image {}", entry.image.id))?;
                last_download = Some((entry.image.id.clone(), bytes.clone()));
                bytes
            }
        };

        if let Some(dir) = downloads {
            let local = dir.join(&entry.new_filename);
            std::fs::write(&local, &bytes)
                .with_context(|| format!("writing {}", local.display()))?;
        }

        let file_url = client
            .upload_file(&entry.new_filename, bytes, entry.image.alt_text.as_deref())
            .await
            .with_context(|| format!("uploading {}", entry.new_filename))?;
        tracing::info!(
            product_id = %manifest.product.id,
            image_id = %entry.image.id,
            filename = %entry.new_filename,
            "uploaded copy"
        );

        manifest.record_upload(UploadedEntry {
            renamed: entry.clone(),
            file_url,
        });
        save_manifest(manifests, manifest)?;
    }
    Ok(())
}

fn print_plan(handle: &str, renamed: &[RenamedEntry]) {
    println!("dry-run: {handle} -> {} copies", renamed.len());
    for entry in renamed {
        println!(
            "  #{:<3} {:<48} {:?} {}",
            entry.gallery_position,
            entry.new_filename,
            entry.attribution,
            entry.variant_id.as_deref().map_or("-", legacy_id)
        );
    }
}

#[cfg(test)]
#[path = "product_test.rs"]
mod tests;
