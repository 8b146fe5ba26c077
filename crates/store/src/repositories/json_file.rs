use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use kardex_core::{
    Catalog, CatalogConfig, CatalogError, NewProduct, Product, ProductId, ProductPatch,
};

use super::ProductRepository;

/// Catalog store backed by a single JSON file holding the full product array.
/// The file is the storage of record: every operation reloads it, and every
/// mutation rewrites it wholesale. The only state kept across calls is the
/// advisory next-id counter, held behind a mutex that also serializes the
/// load-mutate-save cycle of concurrent in-process callers.
#[derive(Debug)]
pub struct JsonFileProductRepository {
    path: PathBuf,
    atomic_writes: bool,
    next_id: Mutex<u64>,
}

impl JsonFileProductRepository {
    /// Opens the catalog at `path` with atomic writes enabled. The initial
    /// load and max-id scan complete before the handle is returned, so the
    /// counter always reflects the file at open time.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, CatalogError> {
        Self::with_options(path, true).await
    }

    /// `atomic_writes = false` selects plain in-place overwrites, the legacy
    /// behavior, at the cost of truncating the file if a write fails midway.
    pub async fn with_options(
        path: impl Into<PathBuf>,
        atomic_writes: bool,
    ) -> Result<Self, CatalogError> {
        let mut repo = Self { path: path.into(), atomic_writes, next_id: Mutex::new(1) };
        let catalog = repo.load_catalog().await?;
        if let Some(max_id) = catalog.max_id() {
            *repo.next_id.get_mut() = max_id.0 + 1;
        }
        info!(
            path = %repo.path.display(),
            products = catalog.len(),
            "catalog opened"
        );
        Ok(repo)
    }

    pub async fn from_config(config: &CatalogConfig) -> Result<Self, CatalogError> {
        Self::with_options(&config.store.data_path, config.store.atomic_writes).await
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads and parses the data file. An absent file is an empty catalog;
    /// anything else unreadable or unparsable is a hard error.
    async fn load_catalog(&self) -> Result<Catalog, CatalogError> {
        match fs::read(&self.path).await {
            Ok(bytes) => {
                let products: Vec<Product> = serde_json::from_slice(&bytes).map_err(|source| {
                    error!(path = %self.path.display(), %source, "catalog file is malformed");
                    CatalogError::format(&self.path, source)
                })?;
                Ok(Catalog::new(products))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Catalog::default()),
            Err(source) => {
                error!(path = %self.path.display(), %source, "catalog file is unreadable");
                Err(CatalogError::io(&self.path, source))
            }
        }
    }

    /// Serializes the whole collection and replaces the file contents. With
    /// atomic writes the bytes land in a sibling `.tmp` file first and are
    /// renamed over the target, so the previous contents survive a failed
    /// write.
    async fn save_catalog(&self, catalog: &Catalog) -> Result<(), CatalogError> {
        let bytes = render_products(catalog.products(), &self.path)?;

        if self.atomic_writes {
            let staging = staging_path(&self.path);
            self.write_file(&staging, &bytes).await?;
            fs::rename(&staging, &self.path).await.map_err(|source| {
                error!(path = %self.path.display(), %source, "catalog rename failed");
                CatalogError::io(&self.path, source)
            })
        } else {
            self.write_file(&self.path, &bytes).await
        }
    }

    async fn write_file(&self, target: &Path, bytes: &[u8]) -> Result<(), CatalogError> {
        fs::write(target, bytes).await.map_err(|source| {
            error!(path = %target.display(), %source, "catalog write failed");
            CatalogError::io(target, source)
        })
    }
}

#[async_trait::async_trait]
impl ProductRepository for JsonFileProductRepository {
    async fn create(&self, draft: NewProduct) -> Result<Product, CatalogError> {
        let mut next_id = self.next_id.lock().await;
        let mut catalog = self.load_catalog().await?;

        let product = match catalog.insert(ProductId(*next_id), draft) {
            Ok(product) => product,
            Err(err) => {
                warn!(%err, "create rejected");
                return Err(err);
            }
        };

        self.save_catalog(&catalog).await?;
        // The counter only advances once the record is on disk, so a failed
        // save never burns an id.
        *next_id += 1;
        info!(id = %product.id, code = %product.code, "product created");
        Ok(product)
    }

    async fn products(&self) -> Result<Vec<Product>, CatalogError> {
        Ok(self.load_catalog().await?.into_products())
    }

    async fn product_by_id(&self, id: ProductId) -> Result<Product, CatalogError> {
        let catalog = self.load_catalog().await?;
        catalog.find(id).cloned().ok_or_else(|| {
            warn!(%id, "product lookup missed");
            CatalogError::NotFound { id }
        })
    }

    async fn update(&self, id: ProductId, patch: ProductPatch) -> Result<Product, CatalogError> {
        let _counter = self.next_id.lock().await;
        let mut catalog = self.load_catalog().await?;

        let product = match catalog.apply_patch(id, patch) {
            Ok(product) => product,
            Err(err) => {
                warn!(%id, "update rejected: no such product");
                return Err(err);
            }
        };

        self.save_catalog(&catalog).await?;
        info!(%id, "product updated");
        Ok(product)
    }

    async fn delete(&self, id: ProductId) -> Result<(), CatalogError> {
        let _counter = self.next_id.lock().await;
        let mut catalog = self.load_catalog().await?;

        let removed = match catalog.remove(id) {
            Ok(removed) => removed,
            Err(err) => {
                warn!(%id, "delete rejected: no such product");
                return Err(err);
            }
        };

        self.save_catalog(&catalog).await?;
        info!(%id, code = %removed.code, "product deleted");
        Ok(())
    }
}

/// Pretty-printed with a tab indent, matching the layout of catalogs written
/// by the legacy store.
fn render_products(products: &[Product], path: &Path) -> Result<Vec<u8>, CatalogError> {
    let mut bytes = Vec::with_capacity(4096);
    let formatter = PrettyFormatter::with_indent(b"\t");
    let mut serializer = Serializer::with_formatter(&mut bytes, formatter);
    products
        .serialize(&mut serializer)
        .map_err(|source| CatalogError::format(path, source))?;
    Ok(bytes)
}

fn staging_path(path: &Path) -> PathBuf {
    let mut staging = path.as_os_str().to_owned();
    staging.push(".tmp");
    PathBuf::from(staging)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{render_products, staging_path};

    #[test]
    fn staging_file_sits_next_to_the_target() {
        assert_eq!(
            staging_path(Path::new("data/products.json")),
            Path::new("data/products.json.tmp")
        );
    }

    #[test]
    fn empty_catalog_renders_as_an_empty_array() {
        let bytes = render_products(&[], Path::new("products.json")).expect("render");
        assert_eq!(bytes, b"[]");
    }
}
