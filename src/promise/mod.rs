//! Promise state machine
//!
//! A promise starts pending and settles exactly once, either fulfilled or
//! rejected. Until settlement it owns two ordered reaction lists; settling
//! hands the matching list to the job queue and clears both, after which
//! the promise is read-only for the rest of its life.

use crate::value::{NativeFn, ObjectKind, Value};
use std::cell::RefCell;
use std::rc::Rc;

/// Shared handle to promise internals; promise identity is pointer identity
pub type PromiseRef = Rc<RefCell<Promise>>;

/// Promise state
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PromiseState {
    /// Not yet settled
    Pending,
    /// Settled with a value
    Fulfilled,
    /// Settled with a reason
    Rejected,
}

/// Which settlement a reaction responds to
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ReactionKind {
    Fulfill,
    Reject,
}

/// A registered handler awaiting settlement
#[derive(Debug, Clone)]
pub struct Reaction {
    /// Which settlement this reaction responds to
    pub kind: ReactionKind,
    /// The callback to execute; absent means pass-through
    pub handler: Option<Value>,
    /// The promise settled with the handler's outcome
    pub derived: PromiseRef,
}

/// Promise internals
#[derive(Debug)]
pub struct Promise {
    state: PromiseState,
    result: Option<Value>,
    fulfill_reactions: Vec<Reaction>,
    reject_reactions: Vec<Reaction>,
    /// Set the first time the resolution procedure runs for this promise;
    /// guards against re-entrant settlement from thenable adoption paths.
    resolution_locked: bool,
    /// Whether a rejection handler was ever registered
    handled: bool,
}

impl Promise {
    /// Create a new pending promise
    pub fn new() -> Self {
        Self {
            state: PromiseState::Pending,
            result: None,
            fulfill_reactions: Vec::new(),
            reject_reactions: Vec::new(),
            resolution_locked: false,
            handled: false,
        }
    }

    /// Create a new pending promise behind a shared handle
    pub fn new_ref() -> PromiseRef {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Current state
    pub fn state(&self) -> PromiseState {
        self.state
    }

    /// Settlement value; `None` while pending
    pub fn result(&self) -> Option<Value> {
        self.result.clone()
    }

    /// Check whether the promise is still pending
    pub fn is_pending(&self) -> bool {
        self.state == PromiseState::Pending
    }

    /// Check whether the promise has settled
    pub fn is_settled(&self) -> bool {
        self.state != PromiseState::Pending
    }

    /// Whether a rejection handler was ever registered
    pub fn is_handled(&self) -> bool {
        self.handled
    }

    /// Acquire the settle-once resolution lock.
    ///
    /// Returns false if the lock was already taken, in which case the
    /// caller must not settle or adopt.
    pub(crate) fn lock_resolution(&mut self) -> bool {
        if self.resolution_locked {
            return false;
        }
        self.resolution_locked = true;
        true
    }

    pub(crate) fn mark_handled(&mut self) {
        self.handled = true;
    }

    /// Append a reaction to the list matching its kind
    pub(crate) fn push_reaction(&mut self, reaction: Reaction) {
        match reaction.kind {
            ReactionKind::Fulfill => self.fulfill_reactions.push(reaction),
            ReactionKind::Reject => self.reject_reactions.push(reaction),
        }
    }

    /// Settle the promise, returning the matching reactions in
    /// registration order. Both lists are cleared; the non-matching list
    /// is discarded unused. Returns an empty list without touching state
    /// if the promise has already settled.
    pub(crate) fn settle(&mut self, state: PromiseState, value: Value) -> Vec<Reaction> {
        debug_assert_ne!(state, PromiseState::Pending, "cannot settle to pending");
        if self.state != PromiseState::Pending {
            return Vec::new();
        }
        self.state = state;
        self.result = Some(value);

        let fulfill = std::mem::take(&mut self.fulfill_reactions);
        let reject = std::mem::take(&mut self.reject_reactions);
        match state {
            PromiseState::Fulfilled => fulfill,
            PromiseState::Rejected => reject,
            PromiseState::Pending => unreachable!(),
        }
    }
}

impl Default for Promise {
    fn default() -> Self {
        Self::new()
    }
}

/// How an outcome value participates in resolution, decided once at
/// adoption time rather than by open-ended duck typing.
pub(crate) enum ResolutionTarget {
    /// Ordinary value: settles the promise directly
    Plain,
    /// One of our own promise objects: adopt its eventual outcome
    PromiseLike(PromiseRef),
    /// Foreign object exposing a callable `then` member
    Thenable(NativeFn),
}

/// Classify an outcome value for the resolution procedure
pub(crate) fn classify(value: &Value) -> ResolutionTarget {
    let Value::Object(obj) = value else {
        return ResolutionTarget::Plain;
    };
    let obj = obj.borrow();
    if let ObjectKind::Promise(internal) = &obj.kind {
        return ResolutionTarget::PromiseLike(internal.clone());
    }
    if let Some(then) = obj.get_property("then") {
        if let Some(func) = then.native_fn() {
            return ResolutionTarget::Thenable(func);
        }
    }
    ResolutionTarget::Plain
}
