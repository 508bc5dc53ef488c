pub mod capability;
pub mod permission;
pub mod scan_session;
pub mod surface;
