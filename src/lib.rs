pub mod app_state;
pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod logging;

#[cfg(test)]
pub(crate) mod test_support;
