//! Document: the canonical `CvData`, its field addressing, editing sessions,
//! and structured editor operations.

pub mod address;
pub mod editor;
pub mod handlers;
pub mod session;
pub mod store;
