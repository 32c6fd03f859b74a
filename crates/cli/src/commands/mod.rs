//! Subcommand implementations.

#![allow(clippy::print_stdout)]

use std::path::Path;
use std::sync::Arc;

use katcakes_core::UserId;
use katcakes_storefront::cart::CartStore;
use katcakes_storefront::catalog::StaticCatalog;
use katcakes_storefront::config::StorefrontConfig;
use katcakes_storefront::error::{AppError, Result};
use katcakes_storefront::storage::{DurableStorage, FileStorage, keys};

pub mod cart;
pub mod catalog;
pub mod order;

/// Everything a command needs: catalog and storage.
pub struct Context {
    pub catalog: StaticCatalog,
    pub storage: Arc<FileStorage>,
    /// Print JSON instead of text.
    pub json: bool,
}

impl Context {
    /// Open the storage document and load the catalog.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if the storage document is unreadable, or
    /// `AppError::BadRequest` if `catalog_path` is not a valid catalog file.
    pub fn open(config: &StorefrontConfig, catalog_path: Option<&Path>, json: bool) -> Result<Self> {
        let catalog = match catalog_path {
            Some(path) => catalog::load(path)?,
            None => StaticCatalog::bakery(),
        };
        let storage = Arc::new(FileStorage::open(&config.storage_path)?);
        tracing::debug!(
            storage = %storage.path().display(),
            products = catalog.all().len(),
            "context ready"
        );

        Ok(Self {
            catalog,
            storage,
            json,
        })
    }

    /// Load the persisted cart.
    pub fn cart(&self) -> CartStore {
        CartStore::load(self.storage.clone())
    }

    /// Customer id stored on this storage document, if any.
    ///
    /// The CLI has no connection to the account service, so this is the raw
    /// stored id and not a restored session: the customer may have been
    /// deleted since it was written.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if the session key cannot be read.
    pub fn session_user(&self) -> Result<Option<UserId>> {
        Ok(self.storage.get(keys::SESSION_USER_ID)?.map(UserId::new))
    }
}

/// Print a value as pretty JSON.
pub(crate) fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| AppError::Internal(format!("failed to encode output: {e}")))?;
    println!("{json}");
    Ok(())
}
