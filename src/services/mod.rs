// src/services/mod.rs

pub mod llm;
pub mod study;
