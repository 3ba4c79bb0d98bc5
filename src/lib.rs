//! # SLE Dashboard Library
//!
//! Backend for a network-operations dashboard. Aggregates device inventory
//! and Service Level Experience (SLE) metrics from an upstream cloud
//! network-management API and exposes them as a small JSON API plus a CSV
//! export for the browser frontend.

pub mod catalog;
pub mod config;
pub mod error;
pub mod handlers;
pub mod inventory;
pub mod models;
pub mod server;
pub mod sle;
pub mod telemetry;
pub mod upstream;
