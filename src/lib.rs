pub mod backend;
pub mod categories;
pub mod cli;
pub mod cli_handlers;
pub mod db;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod notifications;
pub mod projects;
pub mod reorder;
pub mod reviews;
pub mod session;
pub mod settings;
pub mod skills;
pub mod store;
pub mod tasks;
pub mod time_utils;
pub mod views;
pub mod workspace;

#[cfg(test)]
pub mod test_utils;
