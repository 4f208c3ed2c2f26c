//! Batch controller for `migrate` and `batch`.
//!
//! Products are processed one at a time. Per-product failures are logged and
//! skipped so one bad product does not abort the run; the import file is
//! written from every product that completed.

mod product;

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Context as _;
use imgshift_core::{legacy_id, AppConfig};
use imgshift_pipeline::import_file::{option_width, write_import_file};
use imgshift_pipeline::{load_manifests, CarryForwardPolicy, GalleryRow, NamingState};
use imgshift_shopify::{ShopifyAdminClient, ShopifyError};

use product::{migrate_product, ProductOutcome};

#[derive(Debug, Clone)]
pub(crate) struct MigrateOptions {
    pub output: PathBuf,
    pub carry_forward: CarryForwardPolicy,
    pub dry_run: bool,
}

/// `{work_dir}/manifests`, shared by migration and `csv`/`verify`.
pub(crate) fn manifest_dir(config: &AppConfig) -> PathBuf {
    config.work_dir.join("manifests")
}

/// Counters reported at the end of a run.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct RunSummary {
    pub migrated: usize,
    pub planned: usize,
    pub not_found: usize,
    pub failed: usize,
    pub rows: usize,
}

impl RunSummary {
    fn line(&self) -> String {
        format!(
            "migrated {} products ({} rows), planned {}, not found {}, failed {}",
            self.migrated, self.rows, self.planned, self.not_found, self.failed
        )
    }
}

/// # Errors
///
/// Returns an error if the client cannot be built or the import file cannot
/// be written. Per-product failures are logged, not propagated.
pub(crate) async fn run_migrate(
    config: &AppConfig,
    product_ids: &[String],
    options: &MigrateOptions,
) -> anyhow::Result<()> {
    let client = ShopifyAdminClient::new(config)?;
    let summary = migrate_all(&client, config, product_ids, options).await?;
    println!("{}", summary.line());
    Ok(())
}

/// # Errors
///
/// Returns an error if the search itself fails, plus everything
/// [`run_migrate`] can return.
pub(crate) async fn run_batch(
    config: &AppConfig,
    query: &str,
    options: &MigrateOptions,
) -> anyhow::Result<()> {
    let client = ShopifyAdminClient::new(config)?;
    let product_ids = client.search_product_ids(query).await?;
    if product_ids.is_empty() {
        println!("no products match query \"{query}\"; nothing to migrate");
        return Ok(());
    }
    tracing::info!(query, products = product_ids.len(), "batch resolved");

    let summary = migrate_all(&client, config, &product_ids, options).await?;
    println!("{}", summary.line());
    Ok(())
}

async fn migrate_all(
    client: &ShopifyAdminClient,
    config: &AppConfig,
    product_ids: &[String],
    options: &MigrateOptions,
) -> anyhow::Result<RunSummary> {
    let mut summary = RunSummary::default();
    let mut rows: Vec<GalleryRow> = Vec::new();
    let mut state = NamingState::new();
    let recorded = recorded_filenames(config)?;

    for (idx, product_id) in product_ids.iter().enumerate() {
        if idx > 0 {
            state = state.next_product();
        }
        state = state.reserve(filenames_of_others(&recorded, product_id));
        match migrate_product(client, config, product_id, options, &mut state).await {
            Ok(ProductOutcome::Migrated(product_rows)) => {
                summary.migrated += 1;
                summary.rows += product_rows.len();
                rows.extend(product_rows);
            }
            Ok(ProductOutcome::Planned) => summary.planned += 1,
            Err(e) if is_not_found(&e) => {
                tracing::warn!(product_id = %product_id, error = %e, "product not found; skipping");
                summary.not_found += 1;
            }
            Err(e) => {
                tracing::error!(product_id = %product_id, error = %format!("{e:#}"), "product migration failed");
                summary.failed += 1;
            }
        }
    }

    if summary.failed > 0 {
        tracing::warn!(
            failed = summary.failed,
            total = product_ids.len(),
            "some products failed; rerun them to resume from their manifests"
        );
    }

    if !options.dry_run && summary.migrated > 0 {
        let width = option_width(&rows);
        write_import_file(&options.output, &rows, width)?;
        println!(
            "wrote {} rows ({} option columns) to {}",
            rows.len(),
            width,
            options.output.display()
        );
    }

    Ok(summary)
}

/// Planned filenames per manifest on disk, keyed by legacy product id.
fn recorded_filenames(config: &AppConfig) -> anyhow::Result<BTreeMap<String, Vec<String>>> {
    let dir = manifest_dir(config);
    let manifests = load_manifests(&dir)
        .with_context(|| format!("reading checkpoint manifests in {}", dir.display()))?;
    Ok(manifests
        .into_iter()
        .map(|m| {
            let names = m.renamed.into_iter().map(|r| r.new_filename).collect();
            (legacy_id(&m.product.id).to_owned(), names)
        })
        .collect())
}

/// Filenames recorded by every product except `product_id`. A product's own
/// manifest never blocks its own names, so a rerun reproduces them.
fn filenames_of_others<'a>(
    recorded: &'a BTreeMap<String, Vec<String>>,
    product_id: &'a str,
) -> impl Iterator<Item = String> + 'a {
    let own = legacy_id(product_id.trim());
    recorded
        .iter()
        .filter(move |(id, _)| id.as_str() != own)
        .flat_map(|(_, names)| names.iter().cloned())
}

fn is_not_found(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<ShopifyError>(),
        Some(ShopifyError::NotFound { .. })
    )
}

#[cfg(test)]
mod tests {
    use anyhow::Context as _;

    use super::*;

    #[test]
    fn not_found_is_detected_through_context() {
        let err = Err::<(), _>(ShopifyError::NotFound {
            id: "gid://shopify/Product/1".to_owned(),
        })
        .context("fetching product")
        .unwrap_err();
        assert!(is_not_found(&err));
    }

    #[test]
    fn other_errors_are_not_not_found() {
        let err = anyhow::Error::new(ShopifyError::Auth { status: 401 });
        assert!(!is_not_found(&err));
    }

    #[test]
    fn own_manifest_does_not_reserve_its_names() {
        let recorded = BTreeMap::from([
            ("1".to_owned(), vec!["tile-red-01.jpg".to_owned()]),
            ("2".to_owned(), vec!["tile-red-01-1.jpg".to_owned()]),
        ]);
        let others: Vec<String> =
            filenames_of_others(&recorded, "gid://shopify/Product/2").collect();
        assert_eq!(others, ["tile-red-01.jpg"]);
        assert_eq!(filenames_of_others(&recorded, " 1 ").count(), 1);
    }

    #[test]
    fn summary_line_reports_all_counters() {
        let summary = RunSummary {
            migrated: 2,
            planned: 0,
            not_found: 1,
            failed: 1,
            rows: 9,
        };
        assert_eq!(
            summary.line(),
            "migrated 2 products (9 rows), planned 0, not found 1, failed 1"
        );
    }
}
