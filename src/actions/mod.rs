//! File actions module.
//!
//! This module provides functionality for:
//! - Asking the user before anything is removed ([`confirm`])
//! - Removing duplicates permanently or via the trash crate ([`delete`])
//!
//! ```no_run
//! use dupesweep::actions::delete::{permanent_delete, DeleteConfig};
//! use std::path::PathBuf;
//!
//! let path = PathBuf::from("/path/to/duplicate.txt");
//! let result = permanent_delete(&path);
//! ```

pub mod confirm;
pub mod delete;

// Re-export commonly used types
pub use confirm::{confirm, DELETE_PROMPT};
pub use delete::{
    delete_duplicates, delete_to_trash, delete_verified, permanent_delete,
    validate_preserves_copy, BatchDeleteResult, DeleteConfig, DeleteError, DeleteMode,
    DeleteOutcome, DeleteProgressCallback, DeleteResult, NoopDeleteCallback,
};
