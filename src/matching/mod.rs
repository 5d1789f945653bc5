pub mod cache;
pub mod name;
pub mod resolver;
pub mod sequence;

pub use cache::{Variant, VariantCache};
pub use resolver::NameResolver;
