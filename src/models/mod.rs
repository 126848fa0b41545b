// src/models/mod.rs

pub mod quiz_result;
pub mod submission;
