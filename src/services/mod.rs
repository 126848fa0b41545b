// src/services/mod.rs

pub mod notification;
pub mod result_writer;
