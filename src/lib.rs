//! Gatehouse - Fixed-Window Request Rate Limiting
//!
//! This crate implements admission-control middleware for HTTP services.
//! Incoming requests are throttled per application, per client IP, and
//! globally using fixed-window counters backed by a volatile, low-latency
//! key/value store.

pub mod config;
pub mod error;
pub mod identity;
pub mod limit;
pub mod storage;
