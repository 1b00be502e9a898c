//! Job applications: applicants apply with a resume, job owners review and
//! move them through statuses.

pub mod handlers;
pub mod service;
pub mod validation;
