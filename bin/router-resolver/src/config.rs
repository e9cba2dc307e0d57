//! Directory seed file: the initial contents of an in-memory routing table

use anyhow::{Context, Result};
use router_table::RoutingTable;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

/// Routing entries for one client
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ClientSeed {
    pub message_server: Option<String>,
    /// service id -> server id
    pub services: BTreeMap<String, String>,
}

/// Routing entries for one service
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceSeed {
    /// Catch-all server
    pub server: Option<String>,
    pub registrar: Option<String>,
    pub pool: Vec<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DirectorySeed {
    pub clients: BTreeMap<String, ClientSeed>,
    pub services: BTreeMap<String, ServiceSeed>,
}

impl DirectorySeed {
    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("Failed to parse directory seed")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read directory seed {}", path.display()))?;
        let seed = Self::from_yaml(&text)
            .with_context(|| format!("Invalid directory seed {}", path.display()))?;
        info!(
            "Loaded directory seed from {} ({} clients, {} services)",
            path.display(),
            seed.clients.len(),
            seed.services.len()
        );
        Ok(seed)
    }

    /// Write every entry into the table through its public operations.
    pub fn apply(&self, table: &dyn RoutingTable) -> Result<()> {
        for (client_id, client) in &self.clients {
            if let Some(server_id) = &client.message_server {
                table.set_client_message_server(client_id, server_id)?;
            }
            for (service_id, server_id) in &client.services {
                table.set_client_service_server(client_id, service_id, server_id)?;
            }
            debug!("Seeded client {}", client_id);
        }

        for (service_id, service) in &self.services {
            if let Some(server_id) = &service.server {
                table.set_service_server(service_id, server_id)?;
            }
            if let Some(registrar) = &service.registrar {
                table.set_service_registrar(service_id, registrar)?;
            }
            for server_id in &service.pool {
                table.add_server_to_service_pool(service_id, server_id)?;
            }
            debug!("Seeded service {} ({} pooled)", service_id, service.pool.len());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use router_table::{ClientTable, ErrorKind, MemoryRoutingTable, ServiceTable};

    const SEED: &str = r#"
clients:
  client.2:
    message_server: server.1
    services:
      service.1: server.9
  client.3:
    services:
      service.1: server.1
services:
  service.1:
    server: server.2
    registrar: registrar.1
    pool: [pool.1, pool.2, pool.1]
  service.3:
    server: ""
"#;

    #[test]
    fn test_parse_seed() {
        let seed = DirectorySeed::from_yaml(SEED).unwrap();
        assert_eq!(seed.clients.len(), 2);
        assert_eq!(
            seed.clients["client.2"].message_server.as_deref(),
            Some("server.1")
        );
        assert!(seed.clients["client.3"].message_server.is_none());
        assert_eq!(seed.services["service.1"].pool.len(), 3);
        assert_eq!(seed.services["service.3"].server.as_deref(), Some(""));
    }

    #[test]
    fn test_empty_seed() {
        let seed = DirectorySeed::from_yaml("{}").unwrap();
        assert_eq!(seed, DirectorySeed::default());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = DirectorySeed::from_yaml("clients:\n  c:\n    messageServer: s\n");
        assert!(err.is_err());
    }

    #[test]
    fn test_apply_seed() {
        let table = MemoryRoutingTable::new();
        DirectorySeed::from_yaml(SEED).unwrap().apply(&table).unwrap();

        assert_eq!(table.get_client_message_server("client.2").unwrap(), "server.1");
        assert_eq!(
            table.get_client_service_server("client.2", "service.1").unwrap(),
            "server.9"
        );
        assert_eq!(
            table.get_client_message_server("client.3").unwrap_err().kind(),
            ErrorKind::MappingNotFound
        );
        assert_eq!(table.get_service_registrar("service.1").unwrap(), "registrar.1");
        assert_eq!(
            table.get_service_pool("service.1").unwrap(),
            vec!["pool.1".to_string(), "pool.2".to_string()]
        );
        assert_eq!(
            table.get_service_server("service.3").unwrap_err().kind(),
            ErrorKind::ServerNotFound
        );
    }
}
