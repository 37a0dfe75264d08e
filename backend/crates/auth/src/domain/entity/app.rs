//! Application Entity
//!
//! A client application that users log into. Provisioned out of band.

use crate::domain::value_object::{app_id::AppId, app_secret::AppSecret};

#[derive(Debug, Clone)]
pub struct App {
    pub app_id: AppId,
    pub name: String,
    /// Signing key for this application's session tokens
    pub secret: AppSecret,
}

impl App {
    pub fn new(app_id: AppId, name: impl Into<String>, secret: AppSecret) -> Self {
        Self {
            app_id,
            name: name.into(),
            secret,
        }
    }
}
