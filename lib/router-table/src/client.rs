//! Client directory: per-client message server and service overrides

use crate::{Mapping, Result, RoutingError};
use std::collections::HashMap;
use tracing::debug;

/// Routing information tracked per client
#[derive(Clone, Debug, Default)]
pub(crate) struct ClientRecord {
    /// Empty means unset
    message_server: String,
    service_overrides: HashMap<String, String>,
}

impl ClientRecord {
    pub fn message_server(&self) -> Option<&str> {
        if self.message_server.is_empty() {
            None
        } else {
            Some(&self.message_server)
        }
    }

    pub fn service_server(&self, service_id: &str) -> Option<&str> {
        self.service_overrides.get(service_id).map(String::as_str)
    }
}

/// Map of client id to record. Not synchronized; see `MemoryRoutingTable`.
#[derive(Debug, Default)]
pub struct ClientDirectory {
    clients: HashMap<String, ClientRecord>,
}

impl ClientDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, client_id: &str) -> Result<&ClientRecord> {
        self.clients
            .get(client_id)
            .ok_or_else(|| RoutingError::UnknownClient(client_id.to_string()))
    }

    fn record_mut(&mut self, client_id: &str) -> &mut ClientRecord {
        if !self.clients.contains_key(client_id) {
            debug!("Creating client record: {}", client_id);
        }
        self.clients.entry(client_id.to_string()).or_default()
    }

    pub fn message_server(&self, client_id: &str) -> Result<String> {
        self.record(client_id)?
            .message_server()
            .map(str::to_string)
            .ok_or_else(|| RoutingError::MappingNotFound {
                client_id: client_id.to_string(),
                mapping: Mapping::MessageServer,
            })
    }

    pub fn set_message_server(&mut self, client_id: &str, server_id: &str) {
        self.record_mut(client_id).message_server = server_id.to_string();
    }

    pub fn service_server(&self, client_id: &str, service_id: &str) -> Result<String> {
        self.record(client_id)?
            .service_server(service_id)
            .map(str::to_string)
            .ok_or_else(|| RoutingError::MappingNotFound {
                client_id: client_id.to_string(),
                mapping: Mapping::Service(service_id.to_string()),
            })
    }

    pub fn set_service_server(&mut self, client_id: &str, service_id: &str, server_id: &str) {
        self.record_mut(client_id)
            .service_overrides
            .insert(service_id.to_string(), server_id.to_string());
    }

    pub fn contains(&self, client_id: &str) -> bool {
        self.clients.contains_key(client_id)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_reads_do_not_create_records() {
        let directory = ClientDirectory::new();
        let err = directory.message_server("client.1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownClient);
        let err = directory.service_server("client.1", "service.1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownClient);
        assert!(!directory.contains("client.1"));
        assert!(directory.is_empty());
    }

    #[test]
    fn test_message_server_round_trip() {
        let mut directory = ClientDirectory::new();
        directory.set_message_server("client.2", "server.1");
        assert_eq!(directory.message_server("client.2").unwrap(), "server.1");

        directory.set_message_server("client.2", "server.2");
        assert_eq!(directory.message_server("client.2").unwrap(), "server.2");
    }

    #[test]
    fn test_empty_message_server_reads_as_unset() {
        let mut directory = ClientDirectory::new();
        directory.set_message_server("client.2", "server.1");
        directory.set_message_server("client.2", "");

        let err = directory.message_server("client.2").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MappingNotFound);
        assert!(directory.contains("client.2"));
    }

    #[test]
    fn test_override_creates_record_without_message_server() {
        let mut directory = ClientDirectory::new();
        directory.set_service_server("client.3", "service.1", "server.1");

        let err = directory.message_server("client.3").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MappingNotFound);
        assert_eq!(
            directory.service_server("client.3", "service.1").unwrap(),
            "server.1"
        );
    }

    #[test]
    fn test_overrides_are_independent() {
        let mut directory = ClientDirectory::new();
        directory.set_message_server("client.4", "server.1");
        directory.set_service_server("client.4", "service.1", "server.2");
        directory.set_service_server("client.4", "service.2", "server.3");
        directory.set_service_server("client.4", "service.1", "server.4");

        assert_eq!(directory.message_server("client.4").unwrap(), "server.1");
        assert_eq!(
            directory.service_server("client.4", "service.1").unwrap(),
            "server.4"
        );
        assert_eq!(
            directory.service_server("client.4", "service.2").unwrap(),
            "server.3"
        );
        let err = directory.service_server("client.4", "service.3").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MappingNotFound);
        assert_eq!(directory.len(), 1);
    }
}
