//! Value Object Module

pub mod app_id;
pub mod app_secret;
pub mod email;
pub mod user_id;
