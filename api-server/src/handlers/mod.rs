//! HTTP handlers

pub mod health;
pub mod status;
pub mod check;
pub mod model;
