pub mod execute;
pub mod format;

pub use execute::{execute_command, Transaction};
pub use format::format_schema;
