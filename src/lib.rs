pub mod app;
pub mod applications;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod state;

#[cfg(test)]
mod testing;
