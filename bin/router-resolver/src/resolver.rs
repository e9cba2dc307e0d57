//! Caller-side route resolution on top of a routing table
//!
//! The table keeps client and service lookups independent. This module
//! chains them: client override, then the service's catch-all server, then a
//! random member of the service's pool.

use router_table::{ErrorKind, Result, RoutingTable};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Which lookup produced a route
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteSource {
    MessageServer,
    ClientOverride,
    ServiceCatchAll,
    ServicePool,
}

impl fmt::Display for RouteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RouteSource::MessageServer => "message server",
            RouteSource::ClientOverride => "client override",
            RouteSource::ServiceCatchAll => "service catch-all",
            RouteSource::ServicePool => "service pool",
        };
        f.write_str(name)
    }
}

/// A resolved destination
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Route {
    pub server: String,
    pub source: RouteSource,
}

/// Resolver for deciding which server handles a client's traffic
pub struct Resolver {
    table: Arc<dyn RoutingTable>,
}

impl Resolver {
    /// Create a new resolver over a routing table
    pub fn new(table: Arc<dyn RoutingTable>) -> Self {
        Self { table }
    }

    /// The message server handling communication with the client
    pub fn resolve_message_server(&self, client_id: &str) -> Result<Route> {
        let server = self.table.get_client_message_server(client_id)?;
        debug!("Client {} resolved to message server {}", client_id, server);
        Ok(Route {
            server,
            source: RouteSource::MessageServer,
        })
    }

    /// The server handling the client's messages for the service
    pub fn resolve_service(&self, client_id: &str, service_id: &str) -> Result<Route> {
        let err = match self.table.get_client_service_server(client_id, service_id) {
            Ok(server) => {
                return Ok(self.found(client_id, service_id, server, RouteSource::ClientOverride));
            }
            Err(err) if err.is_not_found() => err,
            Err(err) => return Err(err),
        };
        debug!("No client override for {}/{}: {}", client_id, service_id, err);

        match self.table.get_service_server(service_id) {
            Ok(server) => {
                return Ok(self.found(client_id, service_id, server, RouteSource::ServiceCatchAll));
            }
            // Nothing further is known about the service.
            Err(err) if err.kind() == ErrorKind::UnknownService => return Err(err),
            Err(err) if err.is_not_found() => {
                debug!("No catch-all server for {}: {}", service_id, err);
            }
            Err(err) => return Err(err),
        }

        let server = self.table.get_service_random_server(service_id)?;
        Ok(self.found(client_id, service_id, server, RouteSource::ServicePool))
    }

    /// Resolve the service route when a service is given, otherwise the
    /// client's message server.
    pub fn resolve(&self, client_id: &str, service_id: Option<&str>) -> Result<Route> {
        match service_id {
            Some(service_id) => self.resolve_service(client_id, service_id),
            None => self.resolve_message_server(client_id),
        }
    }

    fn found(
        &self,
        client_id: &str,
        service_id: &str,
        server: String,
        source: RouteSource,
    ) -> Route {
        debug!("{}/{} resolved to {} via {}", client_id, service_id, server, source);
        Route { server, source }
    }
}
