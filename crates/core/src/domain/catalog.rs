use crate::domain::product::{NewProduct, Product, ProductCode, ProductId, ProductPatch};
use crate::errors::CatalogError;

/// The full ordered collection of products, as persisted. Insertion order is
/// preserved; the collection is never re-sorted.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn into_products(self) -> Vec<Product> {
        self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Highest id currently in use, the basis for counter initialization.
    pub fn max_id(&self) -> Option<ProductId> {
        self.products.iter().map(|product| product.id).max()
    }

    pub fn find(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|product| product.id == id)
    }

    pub fn contains_code(&self, code: &ProductCode) -> bool {
        self.products.iter().any(|product| &product.code == code)
    }

    /// Validates the draft, rejects duplicate codes, and appends the finished
    /// record under `id`. The collection is untouched on failure.
    pub fn insert(&mut self, id: ProductId, draft: NewProduct) -> Result<Product, CatalogError> {
        let missing = draft.missing_fields();
        if !missing.is_empty() {
            return Err(CatalogError::Validation {
                fields: missing.iter().map(ToString::to_string).collect(),
            });
        }
        if self.contains_code(&draft.code) {
            return Err(CatalogError::DuplicateCode { code: draft.code });
        }

        let product = draft.into_product(id);
        self.products.push(product.clone());
        Ok(product)
    }

    /// Overwrites the patched fields on the record with the given id; the id
    /// itself is immutable. Duplicate codes are not re-checked here, matching
    /// the create-time-only uniqueness rule.
    pub fn apply_patch(
        &mut self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Product, CatalogError> {
        let product = self
            .products
            .iter_mut()
            .find(|product| product.id == id)
            .ok_or(CatalogError::NotFound { id })?;

        patch.apply_to(product);
        Ok(product.clone())
    }

    /// Removes exactly the record with the given id, preserving the order of
    /// the rest.
    pub fn remove(&mut self, id: ProductId) -> Result<Product, CatalogError> {
        let position = self
            .products
            .iter()
            .position(|product| product.id == id)
            .ok_or(CatalogError::NotFound { id })?;

        Ok(self.products.remove(position))
    }
}
