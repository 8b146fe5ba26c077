pub mod repositories;

pub use repositories::{InMemoryProductRepository, JsonFileProductRepository, ProductRepository};
