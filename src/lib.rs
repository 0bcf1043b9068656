//! PDF Invert Library
//!
//! Inverts the visible colors of PDF documents without rasterizing them.
//! This library provides functionality to:
//! - Load PDF bytes into a lopdf object graph
//! - Graft a Difference-blend paint onto every page so white becomes black and vice versa
//! - Serialize the result back to PDF
//! - Process a single file or every PDF in a directory, writing `<name>_inverted.pdf`
//!
//! # Example
//!
//! ```no_run
//! use pdf_invert::batch::invert_file;
//! use pdf_invert::pdf::InvertOptions;
//! use std::path::Path;
//!
//! let output = invert_file(Path::new("report.pdf"), &InvertOptions::default())
//!     .expect("Failed to invert PDF");
//! assert_eq!(output, Path::new("report_inverted.pdf"));
//! ```

pub mod batch;
pub mod error;
pub mod layout;
pub mod pdf;

// Re-export commonly used items
pub use error::{Error, ErrorKind, Result};
