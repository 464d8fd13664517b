//! Event store implementations
//!
//! Production deployments plug their own [`EventStore`](crate::engine::EventStore)
//! backend into the engine; the in-memory store here is the reference
//! implementation used by the reporting binary and the test suite.

mod memory;

pub use memory::{InMemoryEventStore, PartitionKey};
