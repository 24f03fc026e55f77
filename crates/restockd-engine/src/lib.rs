pub mod commands;
pub mod format;
pub mod message;
pub mod reconcile;

pub use commands::{dispatch, Command, CommandParseError};
pub use format::{
    debug_failure, debug_report, help_message, priority_theme, product_list, product_list_detailed,
    restock_alert, status_overview, PriorityTheme,
};
pub use message::{Embed, EmbedField, Message};
pub use reconcile::{apply_check, run_cycle, CheckOutcome, ProductOutcome, StockFetcher, Transition};
