//! JSON-lines file implementations.

mod content;

pub use content::JsonLinesContentStore;
