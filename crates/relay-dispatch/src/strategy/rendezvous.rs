//! Rendezvous (highest-random-weight) hashing combinator
//!
//! Each child is attached to a bucket id. For a request hash `h`, the
//! request goes to the compiled bucket maximizing `score(bucket_id, h)`,
//! ties broken by the lower bucket id. Removing a bucket reshuffles only
//! the requests that mapped to it.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use blake3::Hasher;
use relay_core::Address;
use tracing::trace;

use super::{Strategy, StrategyRef};
use crate::pool::ConnectionPool;
use crate::sender::{Callback, Sender, SenderRef};

/// Request hashing function
pub type HashFn<Req> = Arc<dyn Fn(&Req) -> u64 + Send + Sync>;

/// Scoring function combining a bucket id with a request hash
pub type BucketScoreFn = Arc<dyn Fn(u64, u64) -> u64 + Send + Sync>;

/// Mix a bucket id with a request hash using blake3
fn default_bucket_score(bucket_id: u64, request_hash: u64) -> u64 {
    let mut hasher = Hasher::new();
    hasher.update(&bucket_id.to_le_bytes());
    hasher.update(&request_hash.to_le_bytes());
    let hash = hasher.finalize();
    let bytes = hash.as_bytes();
    u64::from_le_bytes([
        bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
    ])
}

/// Rendezvous hashing over `(bucket_id, child)` pairs
pub struct RendezvousHashing<Req, Res> {
    hash_fn: HashFn<Req>,
    bucket_score_fn: BucketScoreFn,
    buckets: Vec<(u64, StrategyRef<Req, Res>)>,
}

impl<Req, Res> RendezvousHashing<Req, Res> {
    /// Create from a request hash function and `(bucket_id, child)` pairs
    pub fn new(
        hash_fn: impl Fn(&Req) -> u64 + Send + Sync + 'static,
        buckets: Vec<(u64, StrategyRef<Req, Res>)>,
    ) -> Self {
        let mut buckets = buckets;
        // Ascending bucket order makes the strict-max scan break score ties
        // toward the lower bucket id.
        buckets.sort_by_key(|(bucket_id, _)| *bucket_id);
        Self {
            hash_fn: Arc::new(hash_fn),
            bucket_score_fn: Arc::new(default_bucket_score),
            buckets,
        }
    }

    /// Replace the default blake3 bucket scoring function
    pub fn with_bucket_score_fn(
        mut self,
        bucket_score_fn: impl Fn(u64, u64) -> u64 + Send + Sync + 'static,
    ) -> Self {
        self.bucket_score_fn = Arc::new(bucket_score_fn);
        self
    }
}

impl<Req: 'static, Res: 'static> Strategy<Req, Res> for RendezvousHashing<Req, Res> {
    fn addresses(&self) -> HashSet<Address> {
        self.buckets
            .iter()
            .flat_map(|(_, child)| child.addresses())
            .collect()
    }

    fn compile(&self, pool: &dyn ConnectionPool<Req, Res>) -> Option<SenderRef<Req, Res>> {
        let buckets: Vec<_> = self
            .buckets
            .iter()
            .filter_map(|(bucket_id, child)| {
                child.compile(pool).map(|sender| (*bucket_id, sender))
            })
            .collect();

        if buckets.is_empty() {
            return None;
        }

        Some(Arc::new(RendezvousSender {
            hash_fn: self.hash_fn.clone(),
            bucket_score_fn: self.bucket_score_fn.clone(),
            buckets,
        }))
    }

    fn name(&self) -> &'static str {
        "RendezvousHashing"
    }
}

struct RendezvousSender<Req, Res> {
    hash_fn: HashFn<Req>,
    bucket_score_fn: BucketScoreFn,
    /// Compiled buckets in ascending bucket-id order
    buckets: Vec<(u64, SenderRef<Req, Res>)>,
}

impl<Req, Res> RendezvousSender<Req, Res> {
    fn select(&self, request_hash: u64) -> &(u64, SenderRef<Req, Res>) {
        let mut best = &self.buckets[0];
        let mut best_score = (self.bucket_score_fn)(best.0, request_hash);

        for bucket in &self.buckets[1..] {
            let score = (self.bucket_score_fn)(bucket.0, request_hash);
            if score > best_score {
                best = bucket;
                best_score = score;
            }
        }
        best
    }
}

impl<Req, Res> Sender<Req, Res> for RendezvousSender<Req, Res> {
    fn send_request(&self, request: Req, timeout: Duration, cb: Callback<Res>) {
        let request_hash = (self.hash_fn)(&request);
        let (bucket_id, sender) = self.select(request_hash);
        trace!(
            request_hash = request_hash,
            bucket_id = bucket_id,
            "Rendezvous selection"
        );
        sender.send_request(request, timeout, cb);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::pool::ConnectionRegistry;
    use crate::strategy::single;

    struct CountingSender {
        hits: Arc<AtomicUsize>,
    }

    impl Sender<u32, u32> for CountingSender {
        fn send_request(&self, _request: u32, _timeout: Duration, cb: Callback<u32>) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            cb(Ok(None));
        }
    }

    fn test_addr(port: u16) -> Address {
        Address::from(([127, 0, 0, 1], port))
    }

    fn register_counting(
        registry: &ConnectionRegistry<u32, u32>,
        port: u16,
    ) -> Arc<AtomicUsize> {
        let hits = Arc::new(AtomicUsize::new(0));
        registry.register(
            test_addr(port),
            Arc::new(CountingSender { hits: hits.clone() }),
        );
        hits
    }

    fn bucket(bucket_id: u64, port: u16) -> (u64, StrategyRef<u32, u32>) {
        (bucket_id, Arc::new(single(test_addr(port))))
    }

    #[test]
    fn test_same_hash_same_bucket() {
        let registry = ConnectionRegistry::new();
        let counts: Vec<_> = [9001, 9002, 9003]
            .iter()
            .map(|&port| register_counting(&registry, port))
            .collect();

        let strategy = RendezvousHashing::new(
            |request: &u32| *request as u64,
            vec![bucket(0, 9001), bucket(1, 9002), bucket(2, 9003)],
        );
        let sender = strategy.compile(&registry).unwrap();

        for _ in 0..10 {
            sender.send_request(42, Duration::ZERO, crate::callback::ignore());
        }

        let hit: Vec<_> = counts
            .iter()
            .map(|c| c.load(Ordering::Relaxed))
            .filter(|&c| c > 0)
            .collect();
        assert_eq!(hit, vec![10], "all requests should land on one bucket");
    }

    #[test]
    fn test_distribution_over_buckets() {
        let registry = ConnectionRegistry::new();
        let counts: Vec<_> = [9001, 9002, 9003]
            .iter()
            .map(|&port| register_counting(&registry, port))
            .collect();

        let strategy = RendezvousHashing::new(
            |request: &u32| *request as u64,
            vec![bucket(0, 9001), bucket(1, 9002), bucket(2, 9003)],
        );
        let sender = strategy.compile(&registry).unwrap();

        for request in 0..300 {
            sender.send_request(request, Duration::ZERO, crate::callback::ignore());
        }

        // Every bucket should receive a reasonable share
        for count in &counts {
            let count = count.load(Ordering::Relaxed);
            assert!(count > 30 && count < 200, "count={} outside range", count);
        }
    }

    #[test]
    fn test_score_ties_break_toward_lower_bucket_id() {
        let registry = ConnectionRegistry::new();
        let first = register_counting(&registry, 9001);
        let second = register_counting(&registry, 9002);

        let strategy = RendezvousHashing::new(
            |request: &u32| *request as u64,
            vec![bucket(7, 9002), bucket(3, 9001)],
        )
        .with_bucket_score_fn(|_, _| 0);
        let sender = strategy.compile(&registry).unwrap();

        for request in 0..10 {
            sender.send_request(request, Duration::ZERO, crate::callback::ignore());
        }

        assert_eq!(first.load(Ordering::Relaxed), 10);
        assert_eq!(second.load(Ordering::Relaxed), 0);
    }

    fn noop_sender() -> SenderRef<u32, u32> {
        Arc::new(CountingSender {
            hits: Arc::new(AtomicUsize::new(0)),
        })
    }

    fn rendezvous_sender(bucket_ids: &[u64]) -> RendezvousSender<u32, u32> {
        RendezvousSender {
            hash_fn: Arc::new(|request: &u32| *request as u64),
            bucket_score_fn: Arc::new(default_bucket_score),
            buckets: bucket_ids.iter().map(|&id| (id, noop_sender())).collect(),
        }
    }

    #[test]
    fn test_minimal_disruption_on_bucket_removal() {
        let full = rendezvous_sender(&[0, 1, 2]);
        let reduced = rendezvous_sender(&[0, 2]);

        // Record the winning bucket per key with all three buckets live
        let mut assignment: HashMap<u64, u64> = HashMap::new();
        for key in 0..200u64 {
            assignment.insert(key, full.select(key).0);
        }

        for key in 0..200u64 {
            let before = assignment[&key];
            let after = reduced.select(key).0;
            if before != 1 {
                assert_eq!(before, after, "key {} moved off a surviving bucket", key);
            } else {
                assert_ne!(after, 1, "key {} still maps to the removed bucket", key);
            }
        }
    }

    #[test]
    fn test_unavailable_when_no_bucket_compiles() {
        let registry: ConnectionRegistry<u32, u32> = ConnectionRegistry::new();

        let strategy =
            RendezvousHashing::new(|request: &u32| *request as u64, vec![bucket(0, 9001)]);
        assert!(strategy.compile(&registry).is_none());
    }
}
