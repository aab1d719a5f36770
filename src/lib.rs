pub mod business;
pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod magento;
pub mod sheets;
