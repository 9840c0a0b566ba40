//! In-process backend for demo mode and tests.

pub mod fixtures;
mod in_memory;

pub use in_memory::{InMemoryBackend, DEMO_EMAIL, DEMO_PASSWORD};
