// lifecycle.rs
//
// This software may be used and distributed according to the terms of the
// GNU General Public License version 2 or any later version.

//! Handlers ("traps") bound to the end of the process.
//!
//! Registering a handler for an event appends it after the handlers already
//! registered for that event; nothing ever replaces an earlier handler.

use crate::diagnostics::stack::Trace;
use log::{debug, warn};
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    /// Teardown after a non-zero exit code. Fired before `Exit`.
    Failure,
    /// Teardown, whatever the exit code.
    Exit,
}

/// How the process is about to end.
///
/// Built once, where `main` turns the command result into an exit code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExitContext {
    pub exit_code: i32,
    /// Where the failure happened. Empty on success.
    pub trace: Trace,
}

impl ExitContext {
    pub fn success() -> Self {
        Self {
            exit_code: 0,
            trace: Trace::empty(),
        }
    }

    pub fn failure(exit_code: i32, trace: Trace) -> Self {
        Self { exit_code, trace }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

pub type TrapHandler = Box<dyn FnOnce(&ExitContext)>;

struct Trap {
    name: String,
    handler: TrapHandler,
}

/// Owns the handlers registered for each `LifecycleEvent`.
#[derive(Default)]
pub struct Lifecycle {
    traps: HashMap<LifecycleEvent, Vec<Trap>>,
}

impl fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (event, traps) in &self.traps {
            let names: Vec<&str> =
                traps.iter().map(|trap| trap.name.as_str()).collect();
            map.entry(event, &names);
        }
        map.finish()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` to run when `event` fires, after every handler
    /// already registered for it.
    ///
    /// `name` only shows up in debug logs.
    pub fn append_trap(
        &mut self,
        event: LifecycleEvent,
        name: impl Into<String>,
        handler: impl FnOnce(&ExitContext) + 'static,
    ) {
        let name = name.into();
        debug!("appending {:?} trap '{}'", event, name);
        self.traps.entry(event).or_default().push(Trap {
            name,
            handler: Box::new(handler),
        });
    }

    /// Names of the handlers registered for `event`, in running order.
    pub fn handler_names(&self, event: LifecycleEvent) -> Vec<&str> {
        self.traps
            .get(&event)
            .into_iter()
            .flatten()
            .map(|trap| trap.name.as_str())
            .collect()
    }

    /// Runs the handlers of `event` in registration order, then forgets them.
    ///
    /// A handler that panics does not keep the following ones from running.
    pub fn fire(&mut self, event: LifecycleEvent, context: &ExitContext) {
        let traps = self.traps.remove(&event).unwrap_or_default();
        for Trap { name, handler } in traps {
            debug!("running {:?} trap '{}'", event, name);
            let run = AssertUnwindSafe(move || handler(context));
            let outcome = panic::catch_unwind(run);
            if outcome.is_err() {
                warn!("{:?} trap '{}' panicked", event, name);
            }
        }
    }

    /// Fires `Failure` (for a non-zero exit code) then `Exit`, and hands back
    /// the exit code untouched.
    pub fn terminate(mut self, context: &ExitContext) -> i32 {
        if !context.is_success() {
            self.fire(LifecycleEvent::Failure, context);
        }
        self.fire(LifecycleEvent::Exit, context);
        context.exit_code
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Journal = Rc<RefCell<Vec<String>>>;

    fn recorder(journal: &Journal, entry: &str) -> impl FnOnce(&ExitContext) {
        let journal = Rc::clone(journal);
        let entry = entry.to_owned();
        move |_| journal.borrow_mut().push(entry)
    }

    #[test]
    fn handlers_run_in_registration_order() {
        let journal = Journal::default();
        let mut lifecycle = Lifecycle::new();
        for name in &["h1", "h2", "h3", "h4"] {
            lifecycle.append_trap(
                LifecycleEvent::Exit,
                *name,
                recorder(&journal, name),
            );
        }
        assert_eq!(
            lifecycle.handler_names(LifecycleEvent::Exit),
            vec!["h1", "h2", "h3", "h4"]
        );
        lifecycle.fire(LifecycleEvent::Exit, &ExitContext::success());
        assert_eq!(*journal.borrow(), vec!["h1", "h2", "h3", "h4"]);
    }

    #[test]
    fn each_handler_runs_once() {
        let journal = Journal::default();
        let mut lifecycle = Lifecycle::new();
        for name in &["a", "b"] {
            let handler = recorder(&journal, name);
            lifecycle.append_trap(LifecycleEvent::Exit, *name, handler);
        }
        lifecycle.fire(LifecycleEvent::Exit, &ExitContext::success());
        lifecycle.fire(LifecycleEvent::Exit, &ExitContext::success());
        assert_eq!(*journal.borrow(), vec!["a", "b"]);
        assert!(lifecycle.handler_names(LifecycleEvent::Exit).is_empty());
    }

    #[test]
    fn events_are_independent() {
        let journal = Journal::default();
        let mut lifecycle = Lifecycle::new();
        lifecycle.append_trap(
            LifecycleEvent::Failure,
            "failure",
            recorder(&journal, "failure"),
        );
        lifecycle.append_trap(
            LifecycleEvent::Exit,
            "exit",
            recorder(&journal, "exit"),
        );
        assert_eq!(lifecycle.terminate(&ExitContext::success()), 0);
        assert_eq!(*journal.borrow(), vec!["exit"]);
    }

    #[test]
    fn failure_fires_before_exit_and_keeps_the_code() {
        let journal = Journal::default();
        let mut lifecycle = Lifecycle::new();
        lifecycle.append_trap(
            LifecycleEvent::Exit,
            "exit",
            recorder(&journal, "exit"),
        );
        lifecycle.append_trap(
            LifecycleEvent::Failure,
            "failure",
            recorder(&journal, "failure"),
        );
        let context = ExitContext::failure(128, Trace::empty());
        assert_eq!(lifecycle.terminate(&context), 128);
        assert_eq!(*journal.borrow(), vec!["failure", "exit"]);
    }

    #[test]
    fn a_panicking_handler_does_not_drop_the_next_ones() {
        let journal = Journal::default();
        let mut lifecycle = Lifecycle::new();
        lifecycle.append_trap(LifecycleEvent::Exit, "boom", |_| {
            panic!("handler failure")
        });
        lifecycle.append_trap(
            LifecycleEvent::Exit,
            "after",
            recorder(&journal, "after"),
        );
        let context = ExitContext::failure(3, Trace::empty());
        assert_eq!(lifecycle.terminate(&context), 3);
        assert_eq!(*journal.borrow(), vec!["after"]);
    }

    #[test]
    fn handlers_see_the_exit_context() {
        let seen = Rc::new(RefCell::new(None));
        let mut lifecycle = Lifecycle::new();
        let sink = Rc::clone(&seen);
        lifecycle.append_trap(LifecycleEvent::Exit, "peek", move |context| {
            *sink.borrow_mut() = Some(context.exit_code)
        });
        lifecycle.terminate(&ExitContext::failure(42, Trace::empty()));
        assert_eq!(*seen.borrow(), Some(42));
    }
}
