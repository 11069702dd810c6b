//! Bounded concurrent fan-out over batches of remote calls.
//!
//! Every fetch batch in the pipeline (repository pages, per-repo branch
//! lists, per-key issues, per-branch details) goes through [`ordered_map`]:
//! a bounded-concurrency map whose output order equals its input order
//! regardless of completion order. The positional zips downstream
//! (branch↔issue, branch↔detail) depend on that contract.
//!
//! The concurrency bound itself is the pure [`worker_count`] policy.

use std::future::Future;

use futures::{stream, StreamExt, TryStreamExt};

use crate::errors::QueryError;

/// Sentinel meaning "no concurrency ceiling": one worker per unit of work.
pub const NO_WORKER_LIMIT: usize = usize::MAX;

/// Computes the number of workers for a batch.
///
/// `ceil(num_items / per_page)` units of work are needed (pass `per_page = 1`
/// for unpaginated batches), capped by the configured ceiling. A ceiling of
/// [`NO_WORKER_LIMIT`] therefore yields exactly one worker per unit of work,
/// and zero items always yield zero workers.
///
/// # Panics
///
/// Panics if `per_page` is zero.
pub fn worker_count(ceiling: usize, num_items: usize, per_page: usize) -> usize {
    ceiling.min(num_items.div_ceil(per_page))
}

/// Runs `f` over `items` with at most `workers` calls in flight, returning
/// the results **in input order**.
///
/// The whole batch is awaited before returning; the first error aborts the
/// batch and propagates unmodified. An empty batch completes immediately
/// (never constructing a zero-capacity buffer), and a zero `workers` request
/// for a non-empty batch is clamped to one.
pub async fn ordered_map<T, U, F, Fut>(
    items: Vec<T>,
    workers: usize,
    f: F,
) -> Result<Vec<U>, QueryError>
where
    F: FnMut(T) -> Fut,
    Fut: Future<Output = Result<U, QueryError>>,
{
    if items.is_empty() {
        return Ok(Vec::new());
    }
    stream::iter(items)
        .map(f)
        .buffered(workers.max(1))
        .try_collect()
        .await
}
