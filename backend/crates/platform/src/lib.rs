//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Base64 decoding for configured secrets
//! - Password hashing (Argon2id) with constant-time verification

pub mod crypto;
pub mod password;
