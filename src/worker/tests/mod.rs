//! Unit tests for the completion worker.
