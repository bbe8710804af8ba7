//! Folio: pagination and layout engine for structured documents.
//!
//! The layout core (`layout`, `anchors`, `toc`) is synchronous and pure; the
//! HTTP surface in `routes` runs it on the blocking pool.

pub mod anchors;
pub mod config;
pub mod errors;
pub mod layout;
pub mod models;
pub mod routes;
pub mod state;
pub mod toc;
