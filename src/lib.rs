//! Todo lifecycle orchestration.
//!
//! This crate coordinates a todo store, a best-effort list cache, and an
//! event channel that decouples requesting a completion from applying it.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: Todo records, validation, and the completion event
//! - **Ports**: Abstract trait interfaces for storage, cache, and messaging
//! - **Adapters**: `PostgreSQL`, Redis, `RabbitMQ`, and in-memory
//!   implementations of the ports
//!
//! # Modules
//!
//! - [`todo`]: Domain, ports, adapters, and the [`todo::services::TodoOrchestrator`]
//! - [`worker`]: Completion event consumer with acknowledgement policy
//! - [`config`]: Layered configuration
//! - [`telemetry`]: Logging and metrics setup

pub mod config;
pub mod telemetry;
pub mod todo;
pub mod worker;
