//! Core domain types for methods, requests and responses.

pub mod method;
pub mod request;
pub mod response;
