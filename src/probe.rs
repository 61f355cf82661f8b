//! Best-effort TCP reachability check.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::models::HostEntry;

/// Returns true if `host:port` accepts a TCP connection within `timeout`.
///
/// Resolution failures, refusals and timeouts all report `false`.
pub async fn probe(host: &str, port: u16, timeout: Duration) -> bool {
    match tokio::time::timeout(timeout, TcpStream::connect((host, port))).await {
        Ok(Ok(_stream)) => true,
        Ok(Err(e)) => {
            tracing::debug!("Probe {}:{} failed: {}", host, port, e);
            false
        }
        Err(_) => {
            tracing::debug!("Probe {}:{} timed out after {:?}", host, port, timeout);
            false
        }
    }
}

/// Probe every entry with at most `workers` checks in flight and keep the
/// reachable ones, in their original order.
pub async fn filter_reachable<F, Fut>(
    entries: Vec<HostEntry>,
    workers: usize,
    probe_fn: F,
) -> Vec<HostEntry>
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = bool> + Send + 'static,
{
    let permits = Arc::new(Semaphore::new(workers.max(1)));
    let probe_fn = Arc::new(probe_fn);
    let mut set = JoinSet::new();

    for (idx, entry) in entries.iter().enumerate() {
        let permits = permits.clone();
        let probe_fn = probe_fn.clone();
        let host = entry.hostname.clone();
        set.spawn(async move {
            let _permit = permits.acquire_owned().await.ok();
            (idx, (*probe_fn)(host).await)
        });
    }

    let mut reachable = vec![false; entries.len()];
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((idx, ok)) => reachable[idx] = ok,
            Err(e) => tracing::error!("Probe task failed: {}", e),
        }
    }

    entries
        .into_iter()
        .zip(reachable)
        .filter_map(|(entry, ok)| {
            if !ok {
                tracing::warn!("{} unreachable", entry.hostname);
            }
            ok.then_some(entry)
        })
        .collect()
}
