//! Identity and credentials: signup, email verification, login and the
//! bearer-token gate in front of every protected route.

pub mod extractor;
pub mod handlers;
pub mod password;
pub mod service;
pub mod token;
pub mod validation;

pub use extractor::{ApplicantUser, AuthUser, CompanyUser};
pub use token::TokenService;
