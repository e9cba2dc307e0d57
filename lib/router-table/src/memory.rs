//! In-memory routing table for single-node deployments without persistence

use crate::{ClientDirectory, ClientTable, Result, ServerRole, ServiceDirectory, ServiceTable};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// MemoryRoutingTable implements every routing table operation in memory.
///
/// Each directory sits behind its own lock. Every operation, including
/// create-if-absent followed by a mutation, runs inside a single critical
/// section, so concurrent first writes to an unseen id land in one record.
#[derive(Debug, Default)]
pub struct MemoryRoutingTable {
    clients: RwLock<ClientDirectory>,
    services: RwLock<ServiceDirectory>,
}

// Directory mutations cannot panic part-way, so a poisoned lock still guards
// consistent data.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryRoutingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of known clients
    pub fn client_count(&self) -> usize {
        read(&self.clients).len()
    }

    /// Number of known services
    pub fn service_count(&self) -> usize {
        read(&self.services).len()
    }
}

impl ClientTable for MemoryRoutingTable {
    fn get_client_message_server(&self, client_id: &str) -> Result<String> {
        read(&self.clients).message_server(client_id)
    }

    fn set_client_message_server(&self, client_id: &str, server_id: &str) -> Result<()> {
        write(&self.clients).set_message_server(client_id, server_id);
        Ok(())
    }

    fn get_client_service_server(&self, client_id: &str, service_id: &str) -> Result<String> {
        read(&self.clients).service_server(client_id, service_id)
    }

    fn set_client_service_server(
        &self,
        client_id: &str,
        service_id: &str,
        server_id: &str,
    ) -> Result<()> {
        write(&self.clients).set_service_server(client_id, service_id, server_id);
        Ok(())
    }
}

impl ServiceTable for MemoryRoutingTable {
    fn get_service_server(&self, service_id: &str) -> Result<String> {
        read(&self.services).server(service_id, ServerRole::CatchAll)
    }

    fn set_service_server(&self, service_id: &str, server_id: &str) -> Result<()> {
        write(&self.services).set_server(service_id, ServerRole::CatchAll, server_id);
        Ok(())
    }

    fn get_service_registrar(&self, service_id: &str) -> Result<String> {
        read(&self.services).server(service_id, ServerRole::Registrar)
    }

    fn set_service_registrar(&self, service_id: &str, server_id: &str) -> Result<()> {
        write(&self.services).set_server(service_id, ServerRole::Registrar, server_id);
        Ok(())
    }

    fn get_service_random_server(&self, service_id: &str) -> Result<String> {
        read(&self.services).random_server(service_id, &mut rand::thread_rng())
    }

    fn get_service_pool(&self, service_id: &str) -> Result<Vec<String>> {
        read(&self.services).pool(service_id)
    }

    fn add_server_to_service_pool(&self, service_id: &str, server_id: &str) -> Result<()> {
        write(&self.services).add_to_pool(service_id, server_id);
        Ok(())
    }

    fn remove_server_from_service_pool(&self, service_id: &str, server_id: &str) -> Result<()> {
        write(&self.services).remove_from_pool(service_id, server_id);
        Ok(())
    }
}
