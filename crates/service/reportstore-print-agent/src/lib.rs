//! Reportstore print agent
//!
//! A small local service for silent-print flows: a report viewer renders a
//! PDF, posts it to `/print`, and the agent hands the bytes to the local
//! printer driver. One synchronous print per request; no queueing, no
//! retries, no job tracking. Success and failure are reflected directly in
//! the HTTP response.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod print;
pub mod server;

pub use config::AgentConfig;
pub use print::{LpPrinter, PrintError, PrintService};
pub use server::{create_router, AppState};
