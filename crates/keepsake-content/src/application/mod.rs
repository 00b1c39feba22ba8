//! Card loading.

pub mod loader;
