//! Microtask: an embeddable Promise state machine and job queue
//!
//! Microtask is the asynchronous-composition core a JavaScript-like
//! runtime needs to support `then`/`catch` without native threads: a
//! strict pending → settled state machine, a thenable-resolution
//! procedure, and a cooperative FIFO job queue with run-to-completion
//! semantics. It has no parser and no object model of its own; the host
//! registers native callables, settles promises, and drains the queue.
//!
//! # Quick Start
//!
//! ```
//! use microtask::{Runtime, Value};
//!
//! fn main() -> microtask::Result<()> {
//!     let mut runtime = Runtime::new();
//!     let promise = runtime.create_promise();
//!
//!     let on_fulfilled = Value::native_function("greet", |_rt, args: &[Value]| {
//!         println!("settled with {}", args[0]);
//!         Ok(Value::Undefined)
//!     });
//!     runtime.then(&promise, Some(on_fulfilled), None)?;
//!
//!     // Settlement enqueues the reaction; nothing runs until the drain.
//!     runtime.resolve_or_reject(&promise, Value::String("resolved".into()), true)?;
//!     runtime.drain_all()?;
//!     Ok(())
//! }
//! ```
//!
//! # Module Overview
//!
//! | Category | Modules |
//! |----------|---------|
//! | **Core** | [`promise`], [`job_queue`], [`runtime`], [`error`](Error) |
//! | **Host boundary** | [`value`] |

pub mod job_queue;
pub mod promise;
pub mod runtime;
pub mod value;

mod error;

pub use error::{Error, ErrorKind, Result};
pub use job_queue::{Job, JobQueue, QueueStats};
pub use promise::{Promise, PromiseRef, PromiseState, Reaction, ReactionKind};
pub use runtime::{Runtime, RuntimeStats};
pub use value::{Completion, NativeFn, Object, ObjectKind, Value};

/// Microtask version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
