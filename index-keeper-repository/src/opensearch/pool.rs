//! Connection pool spreading requests over several cluster nodes.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use opensearch::http::transport::{Connection, ConnectionPool};
use url::Url;

use crate::errors::EngineError;

/// Hands out the configured nodes in turn.
///
/// Clones share the cursor, so the transport and its copies keep rotating
/// through the same sequence.
#[derive(Debug, Clone)]
pub struct RoundRobinConnectionPool {
    connections: Vec<Connection>,
    cursor: Arc<AtomicUsize>,
}

impl RoundRobinConnectionPool {
    pub fn new(urls: impl IntoIterator<Item = Url>) -> Result<Self, EngineError> {
        let connections: Vec<Connection> = urls.into_iter().map(Connection::new).collect();
        if connections.is_empty() {
            return Err(EngineError::connection("no cluster URL configured"));
        }
        Ok(Self {
            connections,
            cursor: Arc::new(AtomicUsize::new(0)),
        })
    }

    fn next_position(&self) -> usize {
        self.cursor.fetch_add(1, Ordering::Relaxed) % self.connections.len()
    }
}

impl ConnectionPool for RoundRobinConnectionPool {
    fn next(&self) -> Connection {
        self.connections[self.next_position()].clone()
    }
}
