pub(crate) mod bootstrap;
mod config;
mod console;
pub(crate) mod loop_runner;
