//! Elegant Closet Admin library.
//!
//! This crate provides the admin API as a library, allowing it to be tested
//! and reused.
//!
//! # Security
//!
//! This crate has write access to every collection and holds the image
//! host API keys. Every `/api` route requires the admin bearer token.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
