//! PDF page reading module.

mod backend;
mod layout;
mod options;

pub use backend::{LopdfBackend, PageSource};
pub use options::{ErrorMode, ParseOptions};
