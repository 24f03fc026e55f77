pub mod console;
pub mod monitor;
pub mod sink;
