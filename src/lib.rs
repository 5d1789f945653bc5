// src/lib.rs
pub mod api;
pub mod export;
pub mod finance;
pub mod matching;
pub mod utils;
