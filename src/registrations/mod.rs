// src/registrations/mod.rs

pub mod age;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod validators;


pub use routes::registrations_routes;
