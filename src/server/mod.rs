//! HTTP server

pub mod api;
