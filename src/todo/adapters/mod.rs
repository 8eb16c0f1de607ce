//! Adapter implementations for the todo lifecycle ports.

pub mod amqp;
pub mod memory;
pub mod postgres;
pub mod redis;
