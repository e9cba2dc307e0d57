//! Routing directory core
//!
//! This library provides:
//! - The `RoutingTable` contract, split into client and service halves
//! - Client and service directories with their "not found" error taxonomy
//! - An in-memory, lock-guarded reference implementation

pub mod client;
pub mod error;
pub mod memory;
pub mod service;
pub mod table;

pub use client::ClientDirectory;
pub use error::{ErrorKind, Mapping, Result, RoutingError, ServerRole};
pub use memory::MemoryRoutingTable;
pub use service::ServiceDirectory;
pub use table::{ClientTable, RoutingTable, ServiceTable};
