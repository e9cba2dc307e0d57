use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RoutingError>;

/// Which client-side mapping a lookup asked for
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mapping {
    MessageServer,
    Service(String),
}

impl fmt::Display for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mapping::MessageServer => write!(f, "message server"),
            Mapping::Service(service_id) => write!(f, "server for service {}", service_id),
        }
    }
}

/// Which single-valued server field of a service a lookup asked for
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServerRole {
    CatchAll,
    Registrar,
}

impl fmt::Display for ServerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerRole::CatchAll => write!(f, "catch-all server"),
            ServerRole::Registrar => write!(f, "registrar"),
        }
    }
}

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum RoutingError {
    #[error("Unknown client: {0}")]
    UnknownClient(String),

    #[error("Unknown service: {0}")]
    UnknownService(String),

    #[error("No {mapping} mapped for client {client_id}")]
    MappingNotFound { client_id: String, mapping: Mapping },

    #[error("No {role} defined for service {service_id}")]
    ServerNotFound { service_id: String, role: ServerRole },

    #[error("Server pool is empty for service {0}")]
    ServerPoolEmpty(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error category without the identifiers, for comparing outcomes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnknownClient,
    UnknownService,
    MappingNotFound,
    ServerNotFound,
    ServerPoolEmpty,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::UnknownClient => "unknown client",
            ErrorKind::UnknownService => "unknown service",
            ErrorKind::MappingNotFound => "mapping not found",
            ErrorKind::ServerNotFound => "server not found",
            ErrorKind::ServerPoolEmpty => "server pool empty",
            ErrorKind::Internal => "internal",
        };
        f.write_str(name)
    }
}

impl RoutingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RoutingError::UnknownClient(_) => ErrorKind::UnknownClient,
            RoutingError::UnknownService(_) => ErrorKind::UnknownService,
            RoutingError::MappingNotFound { .. } => ErrorKind::MappingNotFound,
            RoutingError::ServerNotFound { .. } => ErrorKind::ServerNotFound,
            RoutingError::ServerPoolEmpty(_) => ErrorKind::ServerPoolEmpty,
            RoutingError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// True for every "nothing is mapped here" outcome, i.e. all kinds except
    /// backend failures.
    pub fn is_not_found(&self) -> bool {
        !matches!(self, RoutingError::Internal(_))
    }
}
