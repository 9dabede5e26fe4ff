//! Client registry
//!
//! Name-to-connection mapping shared by all connection handlers. Entries
//! are inserted on successful registration and removed wholesale on
//! disconnect or halt, never mutated in place.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::client::ClientRecord;
use crate::error::RegistryError;

/// Registry of currently-connected clients, keyed by registered name.
pub struct ClientRegistry {
    clients: HashMap<String, ClientRecord>,
}

/// Shared handle to the registry, one per hub.
pub type SharedRegistry = Arc<Mutex<ClientRegistry>>;

impl ClientRegistry {
    pub fn new() -> Self {
        Self {
            clients: HashMap::new(),
        }
    }

    /// Insert a freshly-registered client. Fails without touching the
    /// existing entry when the name is already taken.
    pub fn insert(&mut self, record: ClientRecord) -> Result<(), RegistryError> {
        if self.clients.contains_key(record.name()) {
            return Err(RegistryError::NameTaken(record.name().to_string()));
        }
        self.clients.insert(record.name().to_string(), record);
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Option<ClientRecord> {
        self.clients.remove(name)
    }

    /// Look up a routing target. Returns a cloned record so the registry
    /// lock need not be held while writing to the target's connection.
    pub fn get(&self, name: &str) -> Option<ClientRecord> {
        self.clients.get(name).cloned()
    }

    /// Snapshot of all current records, for the shutdown broadcast.
    pub fn records(&self) -> Vec<ClientRecord> {
        self.clients.values().cloned().collect()
    }

    /// Remove and return every record, for final connection teardown.
    pub fn drain(&mut self) -> Vec<ClientRecord> {
        self.clients.drain().map(|(_, record)| record).collect()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::new()
    }
}
