//! Prelude module for form_widgets crate.
//!
//! Re-exports the derive_more `Display` derive used by the document and
//! option types.

pub use derive_more::Display;
