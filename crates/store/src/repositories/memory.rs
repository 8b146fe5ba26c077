use tokio::sync::RwLock;

use kardex_core::{Catalog, CatalogError, NewProduct, Product, ProductId, ProductPatch};

use super::ProductRepository;

struct CatalogState {
    catalog: Catalog,
    next_id: u64,
}

/// Catalog store with the same allocation and validation semantics as the
/// file-backed repository, minus the file. Intended for tests and embedders
/// that do not need persistence.
pub struct InMemoryProductRepository {
    state: RwLock<CatalogState>,
}

impl InMemoryProductRepository {
    pub fn new(products: Vec<Product>) -> Self {
        let catalog = Catalog::new(products);
        let next_id = catalog.max_id().map_or(1, |id| id.0 + 1);
        Self { state: RwLock::new(CatalogState { catalog, next_id }) }
    }
}

impl Default for InMemoryProductRepository {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait::async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, draft: NewProduct) -> Result<Product, CatalogError> {
        let mut state = self.state.write().await;
        let id = ProductId(state.next_id);
        let product = state.catalog.insert(id, draft)?;
        state.next_id += 1;
        Ok(product)
    }

    async fn products(&self) -> Result<Vec<Product>, CatalogError> {
        Ok(self.state.read().await.catalog.products().to_vec())
    }

    async fn product_by_id(&self, id: ProductId) -> Result<Product, CatalogError> {
        let state = self.state.read().await;
        state.catalog.find(id).cloned().ok_or(CatalogError::NotFound { id })
    }

    async fn update(&self, id: ProductId, patch: ProductPatch) -> Result<Product, CatalogError> {
        let mut state = self.state.write().await;
        state.catalog.apply_patch(id, patch)
    }

    async fn delete(&self, id: ProductId) -> Result<(), CatalogError> {
        let mut state = self.state.write().await;
        state.catalog.remove(id).map(drop)
    }
}

#[cfg(test)]
mod tests {
    use kardex_core::{CatalogError, NewProduct, ProductCode, ProductId, ProductPatch};

    use crate::repositories::{InMemoryProductRepository, ProductRepository};

    fn draft(title: &str, code: ProductCode) -> NewProduct {
        NewProduct {
            title: title.to_string(),
            description: "desc".to_string(),
            code,
            price: 50.0,
            status: true,
            stock: 5,
            category: "Misc".to_string(),
            thumbnails: None,
        }
    }

    #[tokio::test]
    async fn create_and_fetch_round_trip() {
        let repo = InMemoryProductRepository::default();

        let created = repo.create(draft("first", "A1".into())).await.expect("create");
        let found = repo.product_by_id(created.id).await.expect("fetch");

        assert_eq!(found, created);
        assert_eq!(created.id, ProductId(1));
    }

    #[tokio::test]
    async fn counter_resumes_from_seeded_records() {
        let seeded = {
            let repo = InMemoryProductRepository::default();
            let mut products = Vec::new();
            for (title, code) in [("a", 10), ("b", 20), ("c", 30)] {
                products.push(repo.create(draft(title, code.into())).await.expect("seed"));
            }
            products
        };

        let repo = InMemoryProductRepository::new(seeded);
        let created = repo.create(draft("d", 40.into())).await.expect("create");

        assert_eq!(created.id, ProductId(4));
    }

    #[tokio::test]
    async fn duplicate_code_is_rejected() {
        let repo = InMemoryProductRepository::default();
        repo.create(draft("first", "A1".into())).await.expect("create");

        let err = repo.create(draft("second", "A1".into())).await.expect_err("duplicate");

        assert!(matches!(err, CatalogError::DuplicateCode { .. }));
        assert_eq!(repo.products().await.expect("list").len(), 1);
    }

    #[tokio::test]
    async fn update_changes_only_patched_fields() {
        let repo = InMemoryProductRepository::default();
        let created = repo.create(draft("first", "A1".into())).await.expect("create");

        let updated = repo
            .update(
                created.id,
                ProductPatch { stock: Some(99), ..ProductPatch::default() },
            )
            .await
            .expect("update");

        assert_eq!(updated.stock, 99);
        assert_eq!(updated.title, created.title);
        assert_eq!(updated.id, created.id);
    }

    #[tokio::test]
    async fn delete_miss_is_not_found() {
        let repo = InMemoryProductRepository::default();

        let err = repo.delete(ProductId(9)).await.expect_err("miss");

        assert!(matches!(err, CatalogError::NotFound { id: ProductId(9) }));
    }
}
