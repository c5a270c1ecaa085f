pub mod collector;
pub mod config;
pub mod logging;
pub mod repl;
