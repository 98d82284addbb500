mod commands;
mod handlers;

pub use commands::{Cli, Commands};
pub use handlers::{
    handle_add, handle_backup, handle_edit, handle_export, handle_get, handle_import,
    handle_list, handle_restore, handle_search,
};
