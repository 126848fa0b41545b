// src/db/mod.rs

pub mod pool;
pub mod schema;
