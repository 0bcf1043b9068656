//! PDF loading, page inversion and serialization

pub mod document;
pub mod invert;
pub mod resources;

// Re-export commonly used items
pub use document::{load_document, load_document_file, save_document, save_document_file};
pub use invert::{invert_document, invert_page, InvertOptions, InvertSummary, PageInversion};
pub use resources::DictSlot;
