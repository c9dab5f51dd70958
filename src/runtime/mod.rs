//! Runtime environment for the promise core
//!
//! [`Runtime`] is the explicit shared context tying the pieces together:
//! the callable registry (the global-object stand-in toward the host), the
//! job queue, and the resolution/registration/drain operations. It is
//! created at initialization, drained explicitly, and torn down with
//! [`Runtime::clear`]. There is no hidden singleton.
//!
//! Execution is single-threaded and cooperative: a handler body always
//! runs to completion before the next queued job starts, and handlers
//! never execute synchronously at registration or settlement time.

use crate::error::{Error, ErrorKind, Result};
use crate::job_queue::{Job, JobQueue, QueueStats};
use crate::promise::{
    classify, Promise, PromiseRef, PromiseState, Reaction, ReactionKind, ResolutionTarget,
};
use crate::value::{Completion, Value};
use rustc_hash::FxHashMap as HashMap;
use serde::Serialize;
use std::cell::Cell;
use std::rc::Rc;
use tracing::{debug, trace};

/// Runtime statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct RuntimeStats {
    /// Total promises created (including derived promises)
    pub promises_created: u64,
    /// Total promises settled (fulfilled or rejected)
    pub promises_settled: u64,
}

/// The promise runtime: callable registry, job queue and drain loop
pub struct Runtime {
    /// Native callables reachable from script, by global name
    globals: HashMap<String, Value>,
    /// Pending reaction jobs
    queue: JobQueue,
    /// Rejected promises that never saw a rejection handler
    unhandled_rejections: Vec<(PromiseRef, Value)>,
    /// Runtime statistics
    stats: RuntimeStats,
}

impl Runtime {
    /// Create a new runtime
    pub fn new() -> Self {
        Self {
            globals: HashMap::default(),
            queue: JobQueue::new(),
            unhandled_rejections: Vec::new(),
            stats: RuntimeStats::default(),
        }
    }

    // ---- Host embedding surface ----

    /// Register a native callable under a global identifier
    pub fn register_callable<F>(&mut self, name: &str, func: F)
    where
        F: Fn(&mut Runtime, &[Value]) -> Completion + 'static,
    {
        let value = Value::native_function(name, func);
        self.globals.insert(name.to_string(), value);
    }

    /// Get a global value
    pub fn get_global(&self, name: &str) -> Option<Value> {
        self.globals.get(name).cloned()
    }

    /// Set a global value
    pub fn set_global(&mut self, name: &str, value: Value) {
        self.globals.insert(name.to_string(), value);
    }

    /// Call a callable value with the given arguments.
    ///
    /// Returns the handler's [`Completion`]: `Ok(value)` for a normal
    /// return, `Err(thrown)` for a throw. The outer `Err` is reserved for
    /// host breakage, such as a value with no call surface.
    pub fn invoke(&mut self, callable: &Value, args: &[Value]) -> Result<Completion> {
        let func = callable.native_fn().ok_or_else(|| Error::NotCallable {
            type_of: callable.type_of().to_string(),
        })?;
        Ok(func(self, args))
    }

    /// Check if a value is a promise object
    pub fn is_promise(&self, value: &Value) -> bool {
        value.is_promise()
    }

    /// Check if a value is an error object
    pub fn is_error(&self, value: &Value) -> bool {
        value.is_error()
    }

    /// Build an error value usable as a rejection payload
    pub fn create_error(&self, kind: ErrorKind, message: &str) -> Value {
        Value::new_error(kind, message)
    }

    // ---- Promise lifecycle ----

    /// Create a new pending promise
    pub fn create_promise(&mut self) -> Value {
        self.stats.promises_created += 1;
        Value::promise(Promise::new_ref())
    }

    /// Current state of a promise value
    pub fn promise_state(&self, promise: &Value) -> Result<PromiseState> {
        let internal = self.expect_promise(promise)?;
        let state = internal.borrow().state();
        Ok(state)
    }

    /// Settlement value of a promise; `None` while pending
    pub fn promise_result(&self, promise: &Value) -> Result<Option<Value>> {
        let internal = self.expect_promise(promise)?;
        let result = internal.borrow().result();
        Ok(result)
    }

    /// Settle a promise: fulfill with `outcome` (adopting thenables), or
    /// reject with `outcome` verbatim.
    ///
    /// Returns [`Error::AlreadySettled`] (a non-fatal no-op) if the
    /// resolution procedure already ran for this promise; the first
    /// settlement stands regardless of later calls.
    pub fn resolve_or_reject(
        &mut self,
        promise: &Value,
        outcome: Value,
        is_fulfillment: bool,
    ) -> Result<()> {
        let internal = self.expect_promise(promise)?;
        if !internal.borrow_mut().lock_resolution() {
            return Err(Error::AlreadySettled);
        }
        self.resolve_inner(&internal, outcome, is_fulfillment);
        Ok(())
    }

    /// Register reactions on a promise, returning the derived promise.
    ///
    /// The derived promise is created pending and returned synchronously
    /// regardless of the source's state. Registration on an
    /// already-settled source enqueues the matching job; handlers never
    /// run before the next drain. Non-callable handler arguments degrade
    /// to pass-through.
    pub fn then(
        &mut self,
        promise: &Value,
        on_fulfilled: Option<Value>,
        on_rejected: Option<Value>,
    ) -> Result<Value> {
        let source = self.expect_promise(promise)?;
        let on_fulfilled = on_fulfilled.filter(|h| h.is_callable());
        let on_rejected = on_rejected.filter(|h| h.is_callable());
        let derived = self.add_reactions(&source, on_fulfilled, on_rejected);
        self.stats.promises_created += 1;
        Ok(Value::promise(derived))
    }

    /// `catch(promise, handler)` is exactly `then(promise, absent, handler)`
    pub fn catch(&mut self, promise: &Value, on_rejected: Option<Value>) -> Result<Value> {
        self.then(promise, None, on_rejected)
    }

    // ---- Drain loop ----

    /// Run queued jobs strictly FIFO until the queue is observed empty.
    ///
    /// Jobs enqueued by handlers during the drain are processed before
    /// this returns. A handler throw rejects its derived promise and the
    /// loop proceeds to the next job; only host invocation breakage
    /// aborts the drain.
    pub fn drain_all(&mut self) -> Result<()> {
        let mut processed: u64 = 0;
        while let Some(job) = self.queue.dequeue() {
            self.run_job(job)?;
            processed += 1;
        }
        debug!(jobs = processed, "job queue drained");
        Ok(())
    }

    /// Number of queued jobs awaiting the next drain
    pub fn pending_job_count(&self) -> usize {
        self.queue.len()
    }

    /// Check if any jobs are queued
    pub fn has_pending_jobs(&self) -> bool {
        !self.queue.is_empty()
    }

    // ---- Introspection & teardown ----

    /// Get a snapshot of the runtime statistics
    pub fn stats(&self) -> RuntimeStats {
        self.stats.clone()
    }

    /// Get a snapshot of the job queue statistics
    pub fn queue_stats(&self) -> QueueStats {
        self.queue.stats()
    }

    /// Reset runtime and queue statistics to zero
    pub fn reset_stats(&mut self) {
        self.stats = RuntimeStats::default();
        self.queue.reset_stats();
    }

    /// Take the rejected promises that never saw a rejection handler,
    /// with their rejection reasons, clearing the list.
    pub fn take_unhandled_rejections(&mut self) -> Vec<(PromiseRef, Value)> {
        std::mem::take(&mut self.unhandled_rejections)
    }

    /// Drop all pending work (shutdown). Registered globals survive;
    /// queued jobs and unhandled-rejection records do not.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.unhandled_rejections.clear();
    }

    // ---- Internals ----

    fn expect_promise(&self, value: &Value) -> Result<PromiseRef> {
        value.as_promise().ok_or_else(|| Error::NotAPromise {
            type_of: value.type_of().to_string(),
        })
    }

    /// Build both reactions for a source promise and either store them
    /// (pending) or enqueue the one matching the settled state.
    fn add_reactions(
        &mut self,
        source: &PromiseRef,
        on_fulfilled: Option<Value>,
        on_rejected: Option<Value>,
    ) -> PromiseRef {
        let derived = Promise::new_ref();
        let fulfill = Reaction {
            kind: ReactionKind::Fulfill,
            handler: on_fulfilled,
            derived: derived.clone(),
        };
        let reject = Reaction {
            kind: ReactionKind::Reject,
            handler: on_rejected,
            derived: derived.clone(),
        };

        let mut p = source.borrow_mut();
        p.mark_handled();
        match p.state() {
            PromiseState::Pending => {
                p.push_reaction(fulfill);
                p.push_reaction(reject);
            }
            PromiseState::Fulfilled => {
                let value = p.result().unwrap_or(Value::Undefined);
                drop(p);
                self.queue.enqueue(Job {
                    reaction: fulfill,
                    value,
                });
            }
            PromiseState::Rejected => {
                let reason = p.result().unwrap_or(Value::Undefined);
                drop(p);
                self.queue.enqueue(Job {
                    reaction: reject,
                    value: reason,
                });
            }
        }
        derived
    }

    /// The resolution procedure past the settle-once lock. Settles
    /// directly for plain values and rejections; adopts promise-likes and
    /// thenables. No-op if the promise has already settled (the final
    /// authority for adoption callbacks racing a direct settlement).
    fn resolve_inner(&mut self, promise: &PromiseRef, outcome: Value, is_fulfillment: bool) {
        if !promise.borrow().is_pending() {
            return;
        }

        if !is_fulfillment {
            // Rejection reasons are taken verbatim, never unwrapped
            self.settle(promise, PromiseState::Rejected, outcome);
            return;
        }

        if let Some(other) = outcome.as_promise() {
            if Rc::ptr_eq(promise, &other) {
                let error =
                    Value::new_error(ErrorKind::Type, "chaining cycle detected for promise");
                self.settle(promise, PromiseState::Rejected, error);
                return;
            }
        }

        match classify(&outcome) {
            ResolutionTarget::Plain => {
                self.settle(promise, PromiseState::Fulfilled, outcome);
            }
            ResolutionTarget::PromiseLike(source) => {
                let (resolve, reject, _called) = self.resolving_pair(promise);
                self.add_reactions(&source, Some(resolve), Some(reject));
            }
            ResolutionTarget::Thenable(then_fn) => {
                let (resolve, reject, called) = self.resolving_pair(promise);
                if let Err(thrown) = then_fn(self, &[resolve, reject]) {
                    // A throwing `then` rejects, unless the thenable
                    // already used one of the resolving callables
                    if !called.replace(true) {
                        self.resolve_inner(promise, thrown, false);
                    }
                }
            }
        }
    }

    /// Fresh resolve/reject callables for thenable adoption. The pair
    /// shares a once-called flag; whichever fires first wins, and the
    /// pending-state check in `resolve_inner` remains the final guard.
    fn resolving_pair(&mut self, promise: &PromiseRef) -> (Value, Value, Rc<Cell<bool>>) {
        let called = Rc::new(Cell::new(false));

        let resolve = {
            let promise = promise.clone();
            let called = called.clone();
            Value::native_function("resolve", move |rt: &mut Runtime, args: &[Value]| {
                if !called.replace(true) {
                    let value = args.first().cloned().unwrap_or(Value::Undefined);
                    rt.resolve_inner(&promise, value, true);
                }
                Ok(Value::Undefined)
            })
        };
        let reject = {
            let promise = promise.clone();
            let called = called.clone();
            Value::native_function("reject", move |rt: &mut Runtime, args: &[Value]| {
                if !called.replace(true) {
                    let reason = args.first().cloned().unwrap_or(Value::Undefined);
                    rt.resolve_inner(&promise, reason, false);
                }
                Ok(Value::Undefined)
            })
        };

        (resolve, reject, called)
    }

    /// Transition a pending promise and enqueue one job per matching
    /// reaction, preserving registration order.
    fn settle(&mut self, promise: &PromiseRef, state: PromiseState, value: Value) {
        let reactions = promise.borrow_mut().settle(state, value.clone());
        self.stats.promises_settled += 1;
        trace!(?state, reactions = reactions.len(), "promise settled");

        if state == PromiseState::Rejected {
            let handled = promise.borrow().is_handled()
                || reactions.iter().any(|r| r.handler.is_some());
            if !handled {
                self.unhandled_rejections.push((promise.clone(), value.clone()));
            }
        }

        for reaction in reactions {
            self.queue.enqueue(Job {
                reaction,
                value: value.clone(),
            });
        }
    }

    /// Execute one job: run the handler with the captured value, or pass
    /// the outcome through unchanged, then settle the derived promise.
    fn run_job(&mut self, job: Job) -> Result<()> {
        let Job { reaction, value } = job;
        match reaction.handler {
            Some(ref handler) => {
                trace!(kind = ?reaction.kind, "running reaction handler");
                match self.invoke(handler, std::slice::from_ref(&value))? {
                    Ok(result) => self.resolve_derived(&reaction.derived, result, true),
                    Err(thrown) => self.resolve_derived(&reaction.derived, thrown, false),
                }
            }
            None => {
                let is_fulfillment = reaction.kind == ReactionKind::Fulfill;
                self.resolve_derived(&reaction.derived, value, is_fulfillment);
            }
        }
        Ok(())
    }

    /// Settle a derived promise through the full resolution procedure,
    /// silently skipping promises that were already resolved.
    fn resolve_derived(&mut self, promise: &PromiseRef, outcome: Value, is_fulfillment: bool) {
        if promise.borrow_mut().lock_resolution() {
            self.resolve_inner(promise, outcome, is_fulfillment);
        }
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}
