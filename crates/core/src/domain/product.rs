use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Vendor code. Legacy catalog files carry both numeric and string codes, so
/// both representations round-trip; equality is exact, never cross-variant.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductCode {
    Number(i64),
    Text(String),
}

impl ProductCode {
    /// A blank code fails required-field validation: the empty string, or the
    /// number zero under the inherited truthiness policy.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Number(value) => *value == 0,
            Self::Text(value) => value.is_empty(),
        }
    }
}

impl fmt::Display for ProductCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => value.fmt(f),
            Self::Text(value) => value.fmt(f),
        }
    }
}

impl From<i64> for ProductCode {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for ProductCode {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ProductCode {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// One catalog entry as persisted in the data file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub description: String,
    pub code: ProductCode,
    pub price: f64,
    pub status: bool,
    pub stock: i64,
    pub category: String,
    #[serde(default)]
    pub thumbnails: Vec<String>,
}

/// Create input. The store assigns the id and forces `status` to `true`
/// regardless of the value supplied here.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewProduct {
    pub title: String,
    pub description: String,
    pub code: ProductCode,
    pub price: f64,
    pub status: bool,
    pub stock: i64,
    pub category: String,
    pub thumbnails: Option<Vec<String>>,
}

impl NewProduct {
    /// Required fields that are missing under the truthiness policy: empty
    /// strings, a blank code, and zero `price`/`stock` all count as absent.
    /// `status` is structurally present and carries no check.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.title.is_empty() {
            missing.push("title");
        }
        if self.description.is_empty() {
            missing.push("description");
        }
        if self.code.is_blank() {
            missing.push("code");
        }
        if self.price == 0.0 {
            missing.push("price");
        }
        if self.stock == 0 {
            missing.push("stock");
        }
        if self.category.is_empty() {
            missing.push("category");
        }
        missing
    }

    /// Finalizes the draft into a stored record under the given id.
    pub(crate) fn into_product(self, id: ProductId) -> Product {
        Product {
            id,
            title: self.title,
            description: self.description,
            code: self.code,
            price: self.price,
            // The supplied status is deliberately ignored: new products are
            // always listed as available, matching the legacy store.
            status: true,
            stock: self.stock,
            category: self.category,
            thumbnails: self.thumbnails.unwrap_or_default(),
        }
    }
}

/// Update input: `None` fields are left untouched, `id` can never change.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProductPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub code: Option<ProductCode>,
    pub price: Option<f64>,
    pub status: Option<bool>,
    pub stock: Option<i64>,
    pub category: Option<String>,
    pub thumbnails: Option<Vec<String>>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.code.is_none()
            && self.price.is_none()
            && self.status.is_none()
            && self.stock.is_none()
            && self.category.is_none()
            && self.thumbnails.is_none()
    }

    pub(crate) fn apply_to(self, product: &mut Product) {
        if let Some(title) = self.title {
            product.title = title;
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(code) = self.code {
            product.code = code;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(status) = self.status {
            product.status = status;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(category) = self.category {
            product.category = category;
        }
        if let Some(thumbnails) = self.thumbnails {
            product.thumbnails = thumbnails;
        }
    }
}
