//! Conformance checks for `RoutingTable` implementations
//!
//! Each check seeds a fresh table through the public write operations and
//! then compares reads against a table of expected outcomes. A mismatch
//! panics with the failing case, so the checks can be called straight from
//! a `#[test]` function of any backend crate:
//!
//! ```ignore
//! #[test]
//! fn memory_table_conforms() {
//!     router_conformance::run_all(MemoryRoutingTable::new);
//! }
//! ```

use router_table::{ErrorKind, Result, RoutingTable};
use std::collections::HashSet;
use std::fmt::Debug;

/// Expected outcome of a single lookup
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Expected {
    Server(&'static str),
    Error(ErrorKind),
}

/// One lookup and its expected outcome
#[derive(Debug)]
pub struct Case<A> {
    pub note: &'static str,
    pub args: A,
    pub expected: Expected,
}

fn case<A>(note: &'static str, args: A, expected: Expected) -> Case<A> {
    Case { note, args, expected }
}

use Expected::{Error, Server};

/// Run every case through `lookup` and panic on the first mismatch.
pub fn eval_cases<A: Debug>(
    operation: &str,
    cases: &[Case<A>],
    lookup: impl Fn(&A) -> Result<String>,
) {
    for case in cases {
        let actual = lookup(&case.args);
        let matches = match (&actual, case.expected) {
            (Ok(server), Server(expected)) => server == expected,
            (Err(err), Error(kind)) => err.kind() == kind,
            _ => false,
        };
        assert!(
            matches,
            "{} {:?} ({}): expected {:?}, got {:?}",
            operation, case.args, case.note, case.expected, actual
        );
    }
}

fn write(result: Result<()>, operation: &str) {
    if let Err(err) = result {
        panic!("{} failed during seeding: {}", operation, err);
    }
}

pub fn check_get_client_message_server(table: &dyn RoutingTable) {
    write(table.set_client_message_server("client.2", "server.1"), "set_client_message_server");
    write(
        table.set_client_service_server("client.3", "service.1", "server.1"),
        "set_client_service_server",
    );
    write(table.set_client_message_server("client.4", "server.1"), "set_client_message_server");
    write(table.set_client_message_server("client.4", ""), "set_client_message_server");

    let cases = [
        case("never written", "client.1", Error(ErrorKind::UnknownClient)),
        case("message server set", "client.2", Server("server.1")),
        case("only a service override", "client.3", Error(ErrorKind::MappingNotFound)),
        case("overwritten with empty", "client.4", Error(ErrorKind::MappingNotFound)),
    ];

    eval_cases("get_client_message_server", &cases, |client| {
        table.get_client_message_server(client)
    });
}

pub fn check_get_client_service_server(table: &dyn RoutingTable) {
    write(table.set_client_message_server("client.2", "server.1"), "set_client_message_server");
    write(
        table.set_client_service_server("client.3", "service.2", "server.1"),
        "set_client_service_server",
    );
    write(table.set_client_message_server("client.3", "server.2"), "set_client_message_server");
    write(
        table.set_client_service_server("client.4", "service.1", "server.3"),
        "set_client_service_server",
    );
    write(
        table.set_client_service_server("client.4", "service.1", "server.4"),
        "set_client_service_server",
    );

    let cases = [
        case("never written", ("client.1", "service.1"), Error(ErrorKind::UnknownClient)),
        case("no overrides", ("client.2", "service.1"), Error(ErrorKind::MappingNotFound)),
        case("other service mapped", ("client.3", "service.1"), Error(ErrorKind::MappingNotFound)),
        case("service mapped", ("client.3", "service.2"), Server("server.1")),
        case("override overwritten", ("client.4", "service.1"), Server("server.4")),
    ];

    eval_cases("get_client_service_server", &cases, |(client, service)| {
        table.get_client_service_server(client, service)
    });

    // Overrides never leak into the message server.
    eval_cases(
        "get_client_message_server",
        &[case("override only", "client.4", Error(ErrorKind::MappingNotFound))],
        |client| table.get_client_message_server(client),
    );
}

pub fn check_get_service_server(table: &dyn RoutingTable) {
    write(table.set_service_server("service.2", "server.1"), "set_service_server");
    write(table.set_service_server("service.3", ""), "set_service_server");
    write(table.set_service_registrar("service.4", "registrar.1"), "set_service_registrar");
    write(table.add_server_to_service_pool("service.5", "pool.1"), "add_server_to_service_pool");

    let cases = [
        case("never written", "service.1", Error(ErrorKind::UnknownService)),
        case("catch-all set", "service.2", Server("server.1")),
        case("catch-all set to empty", "service.3", Error(ErrorKind::ServerNotFound)),
        case("only a registrar", "service.4", Error(ErrorKind::ServerNotFound)),
        case("only a pool", "service.5", Error(ErrorKind::ServerNotFound)),
    ];

    eval_cases("get_service_server", &cases, |service| {
        table.get_service_server(service)
    });
}

pub fn check_get_service_registrar(table: &dyn RoutingTable) {
    write(table.set_service_server("service.2", "server.1"), "set_service_server");
    write(table.set_service_registrar("service.3", "registrar.1"), "set_service_registrar");
    write(table.set_service_server("service.4", "server.2"), "set_service_server");
    write(table.set_service_registrar("service.4", "registrar.2"), "set_service_registrar");
    write(table.set_service_registrar("service.5", ""), "set_service_registrar");

    let cases = [
        case("never written", "service.1", Error(ErrorKind::UnknownService)),
        case("only a catch-all", "service.2", Error(ErrorKind::ServerNotFound)),
        case("registrar set", "service.3", Server("registrar.1")),
        case("registrar and catch-all", "service.4", Server("registrar.2")),
        case("registrar set to empty", "service.5", Error(ErrorKind::ServerNotFound)),
    ];

    eval_cases("get_service_registrar", &cases, |service| {
        table.get_service_registrar(service)
    });
}

pub fn check_get_service_random_server(table: &dyn RoutingTable) {
    write(table.set_service_server("service.2", "server.1"), "set_service_server");
    write(table.set_service_registrar("service.3", "registrar.1"), "set_service_registrar");
    write(table.set_service_server("service.4", "server.2"), "set_service_server");
    write(table.set_service_registrar("service.4", "registrar.2"), "set_service_registrar");

    write(table.set_service_server("service.5", "server.2"), "set_service_server");
    write(table.set_service_registrar("service.5", "registrar.2"), "set_service_registrar");
    write(table.add_server_to_service_pool("service.5", "pool.1"), "add_server_to_service_pool");

    write(table.add_server_to_service_pool("service.6", "pool.1"), "add_server_to_service_pool");

    for id in ["pool.1", "pool.2", "pool.3"] {
        write(table.add_server_to_service_pool("service.7", id), "add_server_to_service_pool");
    }
    for id in ["pool.1", "pool.2", "pool.3"] {
        write(
            table.remove_server_from_service_pool("service.7", id),
            "remove_server_from_service_pool",
        );
    }

    write(table.add_server_to_service_pool("service.8", "pool.1"), "add_server_to_service_pool");
    write(table.add_server_to_service_pool("service.8", "pool.2"), "add_server_to_service_pool");
    write(
        table.remove_server_from_service_pool("service.8", "pool.1"),
        "remove_server_from_service_pool",
    );

    write(
        table.remove_server_from_service_pool("service.9", "pool.1"),
        "remove_server_from_service_pool",
    );
    write(table.add_server_to_service_pool("service.9", "pool.1"), "add_server_to_service_pool");
    write(table.add_server_to_service_pool("service.9", "pool.1"), "add_server_to_service_pool");
    write(
        table.remove_server_from_service_pool("service.9", "pool.1"),
        "remove_server_from_service_pool",
    );

    let cases = [
        case("never written", "service.1", Error(ErrorKind::UnknownService)),
        case("catch-all, no pool", "service.2", Error(ErrorKind::ServerPoolEmpty)),
        case("registrar, no pool", "service.3", Error(ErrorKind::ServerPoolEmpty)),
        case("catch-all and registrar, no pool", "service.4", Error(ErrorKind::ServerPoolEmpty)),
        case("everything set, one pooled", "service.5", Server("pool.1")),
        case("only one pooled", "service.6", Server("pool.1")),
        case("pool emptied", "service.7", Error(ErrorKind::ServerPoolEmpty)),
        case("one left after removal", "service.8", Server("pool.2")),
        case("duplicate add then remove", "service.9", Error(ErrorKind::ServerPoolEmpty)),
    ];

    eval_cases("get_service_random_server", &cases, |service| {
        table.get_service_random_server(service)
    });
}

pub fn check_service_pool_membership(table: &dyn RoutingTable) {
    for id in ["pool.3", "pool.1", "pool.2", "pool.1"] {
        write(table.add_server_to_service_pool("service.1", id), "add_server_to_service_pool");
    }
    write(
        table.remove_server_from_service_pool("service.1", "pool.9"),
        "remove_server_from_service_pool",
    );
    assert_eq!(
        table.get_service_pool("service.1").ok(),
        Some(vec!["pool.3".to_string(), "pool.1".to_string(), "pool.2".to_string()]),
        "pool must keep insertion order and ignore duplicates and absent removals"
    );

    write(
        table.remove_server_from_service_pool("service.1", "pool.1"),
        "remove_server_from_service_pool",
    );
    write(table.add_server_to_service_pool("service.1", "pool.1"), "add_server_to_service_pool");
    assert_eq!(
        table.get_service_pool("service.1").ok(),
        Some(vec!["pool.3".to_string(), "pool.2".to_string(), "pool.1".to_string()]),
        "re-added server must go to the end of the pool"
    );

    write(
        table.remove_server_from_service_pool("service.2", "pool.1"),
        "remove_server_from_service_pool",
    );
    assert_eq!(
        table.get_service_pool("service.2").ok(),
        Some(Vec::new()),
        "removal from an unseen service must create an empty record"
    );
    assert_eq!(
        table.get_service_pool("service.3").map_err(|e| e.kind()),
        Err(ErrorKind::UnknownService)
    );
}

/// Draws from a pool only return members, and every member shows up.
pub fn check_random_server_distribution(table: &dyn RoutingTable) {
    const DRAWS: usize = 1000;
    let members = ["pool.1", "pool.2", "pool.3", "pool.4", "pool.5"];
    for id in members {
        write(table.add_server_to_service_pool("service.1", id), "add_server_to_service_pool");
    }

    let mut seen = HashSet::new();
    for _ in 0..DRAWS {
        match table.get_service_random_server("service.1") {
            Ok(server) => {
                assert!(
                    members.contains(&server.as_str()),
                    "get_service_random_server returned non-member {}",
                    server
                );
                seen.insert(server);
            }
            Err(err) => panic!("get_service_random_server failed: {}", err),
        }
    }
    assert_eq!(
        seen.len(),
        members.len(),
        "{} draws did not cover the pool: saw {:?}",
        DRAWS,
        seen
    );
}

/// Concurrent adds of distinct ids to an unseen service all land in one pool.
pub fn check_concurrent_pool_registration(table: &dyn RoutingTable) {
    const WORKERS: usize = 16;
    const PER_WORKER: usize = 8;

    std::thread::scope(|scope| {
        for worker in 0..WORKERS {
            scope.spawn(move || {
                for n in 0..PER_WORKER {
                    let server = format!("pool.{}.{}", worker, n);
                    write(
                        table.add_server_to_service_pool("service.new", &server),
                        "add_server_to_service_pool",
                    );
                }
            });
        }
    });

    let pool = match table.get_service_pool("service.new") {
        Ok(pool) => pool,
        Err(err) => panic!("get_service_pool failed after concurrent adds: {}", err),
    };
    let distinct: HashSet<&String> = pool.iter().collect();
    assert_eq!(pool.len(), WORKERS * PER_WORKER, "pool lost or duplicated entries");
    assert_eq!(distinct.len(), pool.len(), "pool contains duplicates");
}

/// Run every check, each against a fresh table from `factory`.
pub fn run_all<T, F>(mut factory: F)
where
    T: RoutingTable,
    F: FnMut() -> T,
{
    check_get_client_message_server(&factory());
    check_get_client_service_server(&factory());
    check_get_service_server(&factory());
    check_get_service_registrar(&factory());
    check_get_service_random_server(&factory());
    check_service_pool_membership(&factory());
    check_random_server_distribution(&factory());
    check_concurrent_pool_registration(&factory());
}

#[cfg(test)]
mod tests {
    use super::*;
    use router_table::{ClientTable, MemoryRoutingTable};

    #[test]
    fn test_memory_get_client_message_server() {
        check_get_client_message_server(&MemoryRoutingTable::new());
    }

    #[test]
    fn test_memory_get_client_service_server() {
        check_get_client_service_server(&MemoryRoutingTable::new());
    }

    #[test]
    fn test_memory_get_service_server() {
        check_get_service_server(&MemoryRoutingTable::new());
    }

    #[test]
    fn test_memory_get_service_registrar() {
        check_get_service_registrar(&MemoryRoutingTable::new());
    }

    #[test]
    fn test_memory_get_service_random_server() {
        check_get_service_random_server(&MemoryRoutingTable::new());
    }

    #[test]
    fn test_memory_run_all() {
        run_all(MemoryRoutingTable::new);
    }

    #[test]
    #[should_panic(expected = "get_client_message_server")]
    fn test_mismatch_panics() {
        let table = MemoryRoutingTable::new();
        eval_cases(
            "get_client_message_server",
            &[case("wrong on purpose", "client.1", Server("server.1"))],
            |client| table.get_client_message_server(client),
        );
    }
}
