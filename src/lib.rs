//! A small Rust client for the public reporting API of Puerto Rico's BioPortal.
//!
//! The client knows a fixed catalog of report endpoints. Downloading a dataset
//! issues one blocking GET, Brotli-decodes the body when it is compressed,
//! parses it as JSON and flattens it into a [`Table`] whose columns are the
//! nested key paths joined with `_`.
//!
//! ## Quick start
//! - Optionally point the client elsewhere with `BIOPORTAL_URL`, and set
//!   `BIOPORTAL_CONNECT_TIMEOUT` / `BIOPORTAL_TIMEOUT` (seconds).
//! - Call [`Client::download`] with a name from [`Client::list_datasets`].
//!
//! ```no_run
//! use anyhow::Result;
//! use bioportal::Client;
//!
//! fn main() -> Result<()> {
//!     let mut client = Client::from_env()?;
//!     client.print_datasets();
//!
//!     match client.download("Casos por fecha de coleccion")? {
//!         Ok(payload) => {
//!             if let Some(table) = payload.as_table() {
//!                 println!("{table}");
//!             }
//!         }
//!         Err(e) => eprintln!("download failed: {e}"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Unknown dataset names are a usage error and come back as the outer `Err`;
//! network and protocol failures are the inner one.

#![forbid(unsafe_code)]

mod catalog;
mod client;
mod config;
mod decode;
mod error;
mod table;
mod util;

pub use catalog::{Catalog, CatalogEntry, DEFAULT_BASE_URL};
pub use client::{Client, ClientConfig, DownloadResult, Payload};
pub use error::{CatalogError, FetchError};
pub use table::{SCALAR_COLUMN, SEPARATOR, Table};
