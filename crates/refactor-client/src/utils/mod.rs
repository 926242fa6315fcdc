//! Utility functions for positions, URIs, on-disk edits and logging.
//!
//! These helpers back the headless host and the refactoring flows; none of
//! them talk to the language server.

pub mod file;
pub mod logging;
pub mod position;
pub mod uri;

// Re-export commonly used functions for convenience
pub use file::{apply_text_edits, apply_workspace_edit};
pub use position::{offset_to_position, position_to_offset};
pub use uri::{file_name, has_common_parent, parent_dir};
