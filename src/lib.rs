//! Quorum Console library exports for testing

pub mod api;
pub mod core;
pub mod pages;
pub mod tui;

#[cfg(test)]
pub mod test_support;
