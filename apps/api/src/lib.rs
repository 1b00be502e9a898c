pub mod applications;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod extract;
pub mod jobs;
pub mod models;
pub mod notifications;
pub mod pagination;
pub mod response;
pub mod routes;
pub mod scheduler;
pub mod shutdown;
pub mod state;
pub mod storage;
