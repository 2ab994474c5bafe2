//! Marker traits and dispatch wrappers for commands and queries

use mediator::Request;
use std::fmt::Display;
use std::future::Future;
use std::time::Instant;
use tracing::Instrument;

/// A request that appends to the ledger
pub trait Command {
    /// Name used for the dispatch span
    const NAME: &'static str;
}

/// A request that only reads
pub trait Query {
    const NAME: &'static str;
}

/// Run a command handler inside a `command` span
///
/// Failures are logged at WARN; the caller decides whether they are
/// structured outcomes or faults.
pub async fn send_command<C, T, E, F, Fut>(command: C, handler: F) -> Result<T, E>
where
    C: Command + Request<Result<T, E>>,
    F: FnOnce(C) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let span = tracing::info_span!("command", name = C::NAME);
    let started = Instant::now();
    let result = handler(command).instrument(span.clone()).await;
    let elapsed_ms = started.elapsed().as_millis() as u64;

    span.in_scope(|| match &result {
        Ok(_) => tracing::info!(elapsed_ms, "Command completed"),
        Err(e) => tracing::warn!(elapsed_ms, error = %e, "Command failed"),
    });
    result
}

/// Run a query handler inside a `query` span
pub async fn send_query<Q, T, E, F, Fut>(query: Q, handler: F) -> Result<T, E>
where
    Q: Query + Request<Result<T, E>>,
    F: FnOnce(Q) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let span = tracing::debug_span!("query", name = Q::NAME);
    let started = Instant::now();
    let result = handler(query).instrument(span.clone()).await;
    let elapsed_ms = started.elapsed().as_millis() as u64;

    span.in_scope(|| match &result {
        Ok(_) => tracing::debug!(elapsed_ms, "Query completed"),
        Err(e) => tracing::error!(elapsed_ms, error = %e, "Query failed"),
    });
    result
}
