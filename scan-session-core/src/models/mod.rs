pub mod barcode;
pub mod config;
pub mod error;
pub mod permission;
pub mod state;
