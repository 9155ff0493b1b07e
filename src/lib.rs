pub mod auth;
pub mod configuration;
pub mod directory;
pub mod domain;
pub mod error;
pub mod logger;
pub mod middleware;
pub mod routes;
pub mod service;
pub mod startup;
pub mod telemetry;
pub mod validators;
