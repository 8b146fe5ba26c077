pub mod config;
pub mod domain;
pub mod errors;

pub use config::{CatalogConfig, ConfigError, ConfigOverrides, LoadOptions, LoggingConfig, StoreConfig};
pub use domain::catalog::Catalog;
pub use domain::product::{NewProduct, Product, ProductCode, ProductId, ProductPatch};
pub use errors::CatalogError;
