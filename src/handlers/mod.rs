// src/handlers/mod.rs

pub mod progress;
pub mod session;
pub mod study;
