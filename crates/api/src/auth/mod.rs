//! Authentication primitives: JWT claims, token validation, config.

pub mod jwt;
