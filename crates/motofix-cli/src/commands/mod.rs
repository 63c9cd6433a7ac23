//! Command handlers

pub mod auth;
pub mod config;
pub mod geocode;
pub mod requests;
