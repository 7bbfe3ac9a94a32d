mod bootstrap;
mod config;
mod console;
mod gameplay;
mod loop_runner;
mod planning;

pub(crate) use bootstrap::build_app;
pub(crate) use loop_runner::run;
