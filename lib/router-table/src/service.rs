//! Service directory: catch-all server, registrar and server pool per service

use crate::{Result, RoutingError, ServerRole};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;
use tracing::debug;

/// Insertion-ordered set of server ids
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct ServerPool {
    servers: Vec<String>,
}

impl ServerPool {
    fn position(&self, server_id: &str) -> Option<usize> {
        self.servers.iter().position(|s| s == server_id)
    }

    pub fn contains(&self, server_id: &str) -> bool {
        self.position(server_id).is_some()
    }

    /// Append the server unless it is already a member. Returns whether the
    /// pool changed.
    pub fn add(&mut self, server_id: &str) -> bool {
        if self.contains(server_id) {
            return false;
        }
        self.servers.push(server_id.to_string());
        true
    }

    /// Remove the server if it is a member. Returns whether the pool changed.
    pub fn remove(&mut self, server_id: &str) -> bool {
        match self.position(server_id) {
            Some(pos) => {
                self.servers.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Pick a member uniformly at random
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        self.servers.choose(rng).map(String::as_str)
    }

    pub fn servers(&self) -> &[String] {
        &self.servers
    }
}

/// Routing information tracked per service
#[derive(Clone, Debug, Default)]
pub(crate) struct ServiceRecord {
    /// Empty means unset
    server: String,
    /// Empty means unset
    registrar: String,
    pool: ServerPool,
}

impl ServiceRecord {
    fn field(&self, role: ServerRole) -> &str {
        match role {
            ServerRole::CatchAll => &self.server,
            ServerRole::Registrar => &self.registrar,
        }
    }

    fn field_mut(&mut self, role: ServerRole) -> &mut String {
        match role {
            ServerRole::CatchAll => &mut self.server,
            ServerRole::Registrar => &mut self.registrar,
        }
    }

    pub fn server(&self, role: ServerRole) -> Option<&str> {
        Some(self.field(role)).filter(|s| !s.is_empty())
    }
}

/// Map of service id to record. Not synchronized; see `MemoryRoutingTable`.
#[derive(Debug, Default)]
pub struct ServiceDirectory {
    services: HashMap<String, ServiceRecord>,
}

impl ServiceDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, service_id: &str) -> Result<&ServiceRecord> {
        self.services
            .get(service_id)
            .ok_or_else(|| RoutingError::UnknownService(service_id.to_string()))
    }

    fn record_mut(&mut self, service_id: &str) -> &mut ServiceRecord {
        if !self.services.contains_key(service_id) {
            debug!("Creating service record: {}", service_id);
        }
        self.services.entry(service_id.to_string()).or_default()
    }

    /// Read the catch-all server or the registrar
    pub fn server(&self, service_id: &str, role: ServerRole) -> Result<String> {
        self.record(service_id)?
            .server(role)
            .map(str::to_string)
            .ok_or_else(|| RoutingError::ServerNotFound {
                service_id: service_id.to_string(),
                role,
            })
    }

    /// Overwrite the catch-all server or the registrar. An empty id unsets it.
    pub fn set_server(&mut self, service_id: &str, role: ServerRole, server_id: &str) {
        *self.record_mut(service_id).field_mut(role) = server_id.to_string();
    }

    pub fn random_server<R: Rng + ?Sized>(&self, service_id: &str, rng: &mut R) -> Result<String> {
        self.record(service_id)?
            .pool
            .choose(rng)
            .map(str::to_string)
            .ok_or_else(|| RoutingError::ServerPoolEmpty(service_id.to_string()))
    }

    pub fn pool(&self, service_id: &str) -> Result<Vec<String>> {
        Ok(self.record(service_id)?.pool.servers().to_vec())
    }

    pub fn add_to_pool(&mut self, service_id: &str, server_id: &str) {
        if self.record_mut(service_id).pool.add(server_id) {
            debug!("Added {} to pool of service {}", server_id, service_id);
        }
    }

    pub fn remove_from_pool(&mut self, service_id: &str, server_id: &str) {
        if self.record_mut(service_id).pool.remove(server_id) {
            debug!("Removed {} from pool of service {}", server_id, service_id);
        }
    }

    pub fn contains(&self, service_id: &str) -> bool {
        self.services.contains_key(service_id)
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use std::collections::HashSet;

    #[test]
    fn test_pool_set_semantics() {
        let mut pool = ServerPool::default();
        assert!(pool.add("pool.1"));
        assert!(pool.add("pool.2"));
        assert!(!pool.add("pool.1"));
        assert_eq!(pool.servers(), ["pool.1", "pool.2"]);

        assert!(!pool.remove("pool.3"));
        assert_eq!(pool.servers().len(), 2);

        assert!(pool.remove("pool.1"));
        assert_eq!(pool.servers(), ["pool.2"]);
        assert!(!pool.remove("pool.1"));
    }

    #[test]
    fn test_pool_keeps_insertion_order() {
        let mut pool = ServerPool::default();
        for id in ["c", "a", "b"] {
            pool.add(id);
        }
        pool.add("a");
        pool.remove("c");
        pool.add("c");
        assert_eq!(pool.servers(), ["a", "b", "c"]);
    }

    #[test]
    fn test_choose_covers_pool() {
        let mut pool = ServerPool::default();
        assert!(pool.choose(&mut rand::thread_rng()).is_none());

        for id in ["pool.1", "pool.2", "pool.3"] {
            pool.add(id);
        }
        let mut rng = rand::thread_rng();
        let seen: HashSet<&str> = (0..1000).filter_map(|_| pool.choose(&mut rng)).collect();
        assert_eq!(seen, HashSet::from(["pool.1", "pool.2", "pool.3"]));
    }

    #[test]
    fn test_unknown_service() {
        let directory = ServiceDirectory::new();
        let mut rng = rand::thread_rng();
        for err in [
            directory.server("service.1", ServerRole::CatchAll).unwrap_err(),
            directory.server("service.1", ServerRole::Registrar).unwrap_err(),
            directory.random_server("service.1", &mut rng).unwrap_err(),
            directory.pool("service.1").unwrap_err(),
        ] {
            assert_eq!(err.kind(), ErrorKind::UnknownService);
        }
        assert!(directory.is_empty());
    }

    #[test]
    fn test_catch_all_and_registrar_are_separate() {
        let mut directory = ServiceDirectory::new();
        directory.set_server("service.4", ServerRole::CatchAll, "server.2");
        directory.set_server("service.4", ServerRole::Registrar, "registrar.2");
        directory.set_server("service.2", ServerRole::CatchAll, "server.1");

        assert_eq!(
            directory.server("service.4", ServerRole::CatchAll).unwrap(),
            "server.2"
        );
        assert_eq!(
            directory.server("service.4", ServerRole::Registrar).unwrap(),
            "registrar.2"
        );
        let err = directory
            .server("service.2", ServerRole::Registrar)
            .unwrap_err();
        assert_eq!(
            err,
            RoutingError::ServerNotFound {
                service_id: "service.2".to_string(),
                role: ServerRole::Registrar,
            }
        );
    }

    #[test]
    fn test_empty_server_reads_as_unset() {
        let mut directory = ServiceDirectory::new();
        directory.set_server("service.3", ServerRole::CatchAll, "");
        let err = directory
            .server("service.3", ServerRole::CatchAll)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ServerNotFound);
    }

    #[test]
    fn test_remove_creates_record() {
        let mut directory = ServiceDirectory::new();
        directory.remove_from_pool("service.9", "pool.1");
        assert!(directory.contains("service.9"));

        let err = directory
            .random_server("service.9", &mut rand::thread_rng())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ServerPoolEmpty);
        assert!(directory.pool("service.9").unwrap().is_empty());
    }
}
