use async_trait::async_trait;

use kardex_core::{CatalogError, NewProduct, Product, ProductId, ProductPatch};

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileProductRepository;
pub use memory::InMemoryProductRepository;

/// The catalog store operation surface. Every mutation is a full
/// load-mutate-save cycle against the backing storage; a failed mutation
/// leaves the stored collection exactly as it was.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Validates the draft, assigns the next free id, forces `status` to
    /// `true`, and appends the record to the catalog.
    async fn create(&self, draft: NewProduct) -> Result<Product, CatalogError>;

    /// The full catalog in insertion order.
    async fn products(&self) -> Result<Vec<Product>, CatalogError>;

    /// The record with exactly this id. A miss is `CatalogError::NotFound`,
    /// never a panic or a sentinel value.
    async fn product_by_id(&self, id: ProductId) -> Result<Product, CatalogError>;

    /// Overwrites the fields supplied in the patch; `id` is immutable.
    async fn update(&self, id: ProductId, patch: ProductPatch) -> Result<Product, CatalogError>;

    /// Removes exactly the record with this id.
    async fn delete(&self, id: ProductId) -> Result<(), CatalogError>;
}
