//! Image migration pipeline: association of catalog images to variants,
//! deterministic renaming, gallery row assembly, and the bulk-import file.
//!
//! Everything in this crate is pure and synchronous. Network collaborators
//! live in `imgshift-shopify`; orchestration lives in the CLI.

pub mod associate;
pub mod error;
pub mod gallery;
pub mod import_file;
pub mod manifest;
pub mod rename;
pub mod slug;

pub use associate::{build_associations, AssociationEntry, CarryForward};
pub use error::PipelineError;
pub use gallery::{build_rows, GalleryRow, ImageCommand, UploadedEntry};
pub use manifest::{load_manifest, load_manifests, save_manifest, ProductManifest};
pub use rename::{rename, Attribution, CarryForwardPolicy, NamingState, RenamedEntry};
pub use slug::normalize;
