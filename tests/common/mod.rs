//! Shared test helpers for integration tests

use microtask::{Runtime, Value};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Once;

static TRACING: Once = Once::new();

/// Initialize test logging once (honors RUST_LOG)
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A handler that counts its invocations
///
/// Returns the counter and a callable value that increments it and
/// returns `undefined`.
pub fn counting_handler(name: &str) -> (Rc<Cell<usize>>, Value) {
    let count = Rc::new(Cell::new(0));
    let handler = {
        let count = count.clone();
        Value::native_function(name, move |_rt: &mut Runtime, _args: &[Value]| {
            count.set(count.get() + 1);
            Ok(Value::Undefined)
        })
    };
    (count, handler)
}

/// A handler that records the values it was invoked with
#[allow(dead_code)]
pub fn recording_handler(name: &str) -> (Rc<RefCell<Vec<Value>>>, Value) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let handler = {
        let seen = seen.clone();
        Value::native_function(name, move |_rt: &mut Runtime, args: &[Value]| {
            seen.borrow_mut()
                .push(args.first().cloned().unwrap_or(Value::Undefined));
            Ok(Value::Undefined)
        })
    };
    (seen, handler)
}

/// A handler that appends a tag to a shared log when invoked
#[allow(dead_code)]
pub fn tagging_handler(log: &Rc<RefCell<Vec<&'static str>>>, tag: &'static str) -> Value {
    let log = log.clone();
    Value::native_function(tag, move |_rt: &mut Runtime, _args: &[Value]| {
        log.borrow_mut().push(tag);
        Ok(Value::Undefined)
    })
}
