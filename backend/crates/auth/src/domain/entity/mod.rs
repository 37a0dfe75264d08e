//! Entity Module

pub mod app;
pub mod user;
