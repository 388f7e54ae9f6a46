//! First-valid-result combinator
//!
//! Fans every request out to all compiled children and completes the caller
//! with the first result the validator accepts. Child errors and invalid
//! results are absorbed; only the terminal transition reaches the caller.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use relay_core::Address;
use tracing::debug;

use super::{Strategy, StrategyRef};
use crate::error::DispatchError;
use crate::pool::ConnectionPool;
use crate::sender::{Callback, Sender, SenderRef};

/// Predicate deciding whether a child response counts as valid
pub type ResultValidator<Res> = Arc<dyn Fn(&Res) -> bool + Send + Sync>;

/// Fan-out combinator completing with the first valid child result.
///
/// The default validator accepts any materialized response. When every
/// child finishes without a valid result, the caller sees the configured
/// error, or - deliberately - a *successful* empty completion (`Ok(None)`)
/// when no error is configured, so "no valid answer" stays distinguishable
/// from a failure.
pub struct FirstValidResult<Req, Res> {
    children: Vec<StrategyRef<Req, Res>>,
    validator: Option<ResultValidator<Res>>,
    no_valid_result_error: Option<DispatchError>,
    min_active_sub_strategies: usize,
}

impl<Req, Res> FirstValidResult<Req, Res> {
    /// Create from a child list
    pub fn new(children: Vec<StrategyRef<Req, Res>>) -> Self {
        Self {
            children,
            validator: None,
            no_valid_result_error: None,
            min_active_sub_strategies: 1,
        }
    }

    /// Accept only responses the validator approves
    pub fn with_result_validator(
        mut self,
        validator: impl Fn(&Res) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Fail with `error` when no child produces a valid result
    pub fn with_no_valid_result_error(mut self, error: DispatchError) -> Self {
        self.no_valid_result_error = Some(error);
        self
    }

    /// Require at least `min` children to compile, or the whole strategy is
    /// unavailable
    pub fn with_min_active_sub_strategies(mut self, min: usize) -> Self {
        self.min_active_sub_strategies = min;
        self
    }
}

impl<Req, Res> Strategy<Req, Res> for FirstValidResult<Req, Res>
where
    Req: Clone + 'static,
    Res: 'static,
{
    fn addresses(&self) -> HashSet<Address> {
        self.children
            .iter()
            .flat_map(|child| child.addresses())
            .collect()
    }

    fn compile(&self, pool: &dyn ConnectionPool<Req, Res>) -> Option<SenderRef<Req, Res>> {
        let senders: Vec<_> = self
            .children
            .iter()
            .filter_map(|child| child.compile(pool))
            .collect();

        if senders.len() < self.min_active_sub_strategies.max(1) {
            debug!(
                active = senders.len(),
                required = self.min_active_sub_strategies,
                "Too few active children"
            );
            return None;
        }

        Some(Arc::new(FirstValidResultSender {
            senders,
            validator: self.validator.clone(),
            no_valid_result_error: self.no_valid_result_error.clone(),
        }))
    }

    fn name(&self) -> &'static str {
        "FirstValidResult"
    }
}

struct FirstValidResultSender<Req, Res> {
    senders: Vec<SenderRef<Req, Res>>,
    validator: Option<ResultValidator<Res>>,
    no_valid_result_error: Option<DispatchError>,
}

/// Per-request fan-in state.
///
/// `cb` is taken exactly once on the terminal transition; arrivals after
/// that are orphaned child completions and are absorbed.
struct Aggregator<Res> {
    remaining: usize,
    cb: Option<Callback<Res>>,
}

impl<Req, Res> Sender<Req, Res> for FirstValidResultSender<Req, Res>
where
    Req: Clone,
    Res: 'static,
{
    fn send_request(&self, request: Req, timeout: Duration, cb: Callback<Res>) {
        let aggregator = Arc::new(Mutex::new(Aggregator {
            remaining: self.senders.len(),
            cb: Some(cb),
        }));

        for sender in &self.senders {
            let aggregator = Arc::clone(&aggregator);
            let validator = self.validator.clone();
            let fallback = self.no_valid_result_error.clone();

            let child_cb: Callback<Res> = Box::new(move |outcome| {
                let mut state = aggregator.lock();
                if state.cb.is_none() {
                    // Already completed; this arrival is orphaned.
                    return;
                }
                match outcome {
                    Ok(Some(result))
                        if validator.as_ref().map_or(true, |valid| valid(&result)) =>
                    {
                        if let Some(cb) = state.cb.take() {
                            drop(state);
                            cb(Ok(Some(result)));
                        }
                    }
                    _ => {
                        state.remaining -= 1;
                        if state.remaining == 0 {
                            if let Some(cb) = state.cb.take() {
                                drop(state);
                                match fallback {
                                    Some(error) => cb(Err(error)),
                                    None => cb(Ok(None)),
                                }
                            }
                        }
                    }
                }
            });

            sender.send_request(request.clone(), timeout, child_cb);
        }
    }
}
