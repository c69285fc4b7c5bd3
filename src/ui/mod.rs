//! User interface module.
//!
//! - `formatter` - Status, error and plan output

pub mod formatter;

pub use formatter::{
    display_error, display_manual_push_instruction, display_release_plan, display_status,
    display_success, format_release_plan,
};
