//! CMake argument generation.

pub mod cmake;
pub mod translate;

pub use cmake::CacheEntry;
pub use translate::{DerivedValues, Translation, Translator};
