#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! SQLite-backed persistence layer: download records, completion history,
//! and key/value settings.

pub mod error;
pub mod model;
pub mod store;

pub use error::{DataError, Result as DataResult};
pub use model::{CompletedDownload, DownloadRecord, NewDownload, ProgressUpdate};
pub use store::DownloadStore;
