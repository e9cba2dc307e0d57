//! Routing table contracts
//!
//! Backends implement [`ClientTable`] and [`ServiceTable`]; anything that
//! implements both is a [`RoutingTable`]. The two halves are keyed
//! independently and never consult each other.

use crate::Result;

/// Per-client routing: which message server handles a client, and which
/// server handles the client's traffic for a given service.
pub trait ClientTable: Send + Sync {
    /// Which message server handles communication for the client.
    fn get_client_message_server(&self, client_id: &str) -> Result<String>;

    /// Set the message server for the client. An empty id unsets it.
    fn set_client_message_server(&self, client_id: &str, server_id: &str) -> Result<()>;

    /// Which server messages from the client for the service are routed to.
    fn get_client_service_server(&self, client_id: &str, service_id: &str) -> Result<String>;

    /// Set the server handling the client's messages for the service.
    fn set_client_service_server(
        &self,
        client_id: &str,
        service_id: &str,
        server_id: &str,
    ) -> Result<()>;
}

/// Per-service routing: catch-all server, registrar, and a pool of
/// interchangeable servers.
pub trait ServiceTable: Send + Sync {
    /// The catch-all server for the service.
    fn get_service_server(&self, service_id: &str) -> Result<String>;

    fn set_service_server(&self, service_id: &str, server_id: &str) -> Result<()>;

    /// The registrar for the service.
    fn get_service_registrar(&self, service_id: &str) -> Result<String>;

    fn set_service_registrar(&self, service_id: &str, server_id: &str) -> Result<()>;

    /// A server drawn uniformly at random from the service's pool.
    fn get_service_random_server(&self, service_id: &str) -> Result<String>;

    /// The service's pool in insertion order.
    fn get_service_pool(&self, service_id: &str) -> Result<Vec<String>>;

    /// Add a server to the pool. Adding a member again is a no-op.
    fn add_server_to_service_pool(&self, service_id: &str, server_id: &str) -> Result<()>;

    /// Remove a server from the pool. Removing a non-member is a no-op.
    fn remove_server_from_service_pool(&self, service_id: &str, server_id: &str) -> Result<()>;
}

/// The full directory: both client and service routing behind one handle.
pub trait RoutingTable: ClientTable + ServiceTable {}

impl<T: ClientTable + ServiceTable + ?Sized> RoutingTable for T {}
