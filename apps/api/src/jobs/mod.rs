//! Job postings: creation and lifecycle by their owning company, public
//! browsing and detail reads.

pub mod handlers;
pub mod service;
pub mod validation;
