//! Core translation engine module

pub mod chunker;
pub mod client;
pub mod config;
pub mod errors;
pub mod gateway;
pub mod models;
pub mod orchestrator;
pub mod pipeline;
pub mod reassembler;
pub mod text;
