//! Elegant Closet Core - Shared types, document store and catalog pipeline.
//!
//! This crate provides everything the Elegant Closet binaries share:
//! - `storefront` - Public-facing clothing store
//! - `admin` - Back-office for catalog and content management
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! Records are JSON documents grouped into named collections (`products`,
//! `categories`, `faqs`, ...). The [`store`] module defines the
//! [`DocumentStore`](store::DocumentStore) trait together with an in-memory
//! implementation; the `PostgreSQL` implementation is behind the `postgres`
//! feature so the pure parts of the crate stay free of database dependencies.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for document IDs, emails, currencies and statuses
//! - [`models`] - Document shapes for every collection
//! - [`store`] - Declarative queries, composite index rules and store backends
//! - [`catalog`] - Filter, facet, currency, discount and pagination pipeline
//! - [`validation`] - Field-level validation shared by admin writes and forms

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod models;
pub mod store;
pub mod types;
pub mod validation;

pub use types::*;
