pub mod backend;
pub mod cli;
pub mod config;
pub mod error;
pub mod forms;
pub mod models;
pub mod pages;
pub mod router;
pub mod services;
pub mod state;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
