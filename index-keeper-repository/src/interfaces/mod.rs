//! Interface definitions for the engine client.
//!
//! The reconciliation engine only ever talks to the cluster through
//! `EngineClient`, so tests can swap in an in-memory cluster.

mod engine_client;

pub use engine_client::EngineClient;
