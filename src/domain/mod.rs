// Static ticker catalog
pub mod catalog;

// Price bars, feature rows and raw provider payloads
pub mod market;

// Feature registry and model request/response shapes
pub mod ml;

// Port interfaces
pub mod ports;

// Domain-specific error types
pub mod errors;
