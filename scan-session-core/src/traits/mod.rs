pub mod scan_backend;
pub mod scan_delegate;
