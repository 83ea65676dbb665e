// Workout tracking API: authenticated CRUD over workout records

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod repositories;
pub mod services;
