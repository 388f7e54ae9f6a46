//! Weighted random sampling combinator
//!
//! Each child carries an integer weight; every request goes to exactly one
//! compiled child, chosen with probability proportional to its weight.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use rand::distributions::{Distribution, WeightedIndex};
use relay_core::Address;
use tracing::{debug, trace};

use super::{Strategy, StrategyRef};
use crate::error::DispatchError;
use crate::pool::ConnectionPool;
use crate::sender::{Callback, Sender, SenderRef};

/// Weighted list of sub-strategies sampled per request
pub struct RandomSampled<Req, Res> {
    children: Vec<(u32, StrategyRef<Req, Res>)>,
}

impl<Req, Res> RandomSampled<Req, Res> {
    /// Create from `(weight, child)` pairs
    pub fn new(children: Vec<(u32, StrategyRef<Req, Res>)>) -> Self {
        Self { children }
    }
}

impl<Req: 'static, Res: 'static> Strategy<Req, Res> for RandomSampled<Req, Res> {
    fn addresses(&self) -> HashSet<Address> {
        self.children
            .iter()
            .flat_map(|(_, child)| child.addresses())
            .collect()
    }

    fn compile(&self, pool: &dyn ConnectionPool<Req, Res>) -> Option<SenderRef<Req, Res>> {
        let compiled: Vec<_> = self
            .children
            .iter()
            .filter_map(|(weight, child)| child.compile(pool).map(|sender| (*weight, sender)))
            .collect();

        if compiled.is_empty() {
            return None;
        }

        // A zero total weight leaves nothing to sample from; the compiled
        // sender stays available and fails each request instead.
        let distribution = match WeightedIndex::new(compiled.iter().map(|(weight, _)| *weight)) {
            Ok(distribution) => Some(distribution),
            Err(_) => {
                debug!("All compiled children have zero weight");
                None
            }
        };

        Some(Arc::new(RandomSampledSender {
            senders: compiled.into_iter().map(|(_, sender)| sender).collect(),
            distribution,
        }))
    }

    fn name(&self) -> &'static str {
        "RandomSampled"
    }
}

struct RandomSampledSender<Req, Res> {
    senders: Vec<SenderRef<Req, Res>>,
    /// `None` when every compiled child has zero weight
    distribution: Option<WeightedIndex<u32>>,
}

impl<Req, Res> Sender<Req, Res> for RandomSampledSender<Req, Res> {
    fn send_request(&self, request: Req, timeout: Duration, cb: Callback<Res>) {
        match &self.distribution {
            Some(distribution) => {
                let index = distribution.sample(&mut rand::thread_rng());
                trace!(index = index, "Weighted random selection");
                self.senders[index].send_request(request, timeout, cb);
            }
            None => {
                trace!("No positive-weight child to sample");
                cb(Err(DispatchError::NoSenderAvailable));
            }
        }
    }
}
