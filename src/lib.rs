//! projsel library
//!
//! Paginated project search and selection. The CLI in `main.rs` is a thin
//! layer over [`controller::PaginatedSearchController`].

pub mod cli;
pub mod config;
pub mod controller;
pub mod logging;
pub mod search;
pub mod session;
