//! Sandbox execution context
//!
//! One per process. Compiles the program once, keeps the AST for callback
//! dispatch, and owns the tracked resource sets that termination revokes.

use std::cell::RefCell;
use std::rc::Rc;

use rhai::packages::{Package, StandardPackage};
use rhai::{Dynamic, Engine, EvalAltResult, FnPtr, Scope, AST};
use tracing::warn;

use slate_bus::MessageBus;
use slate_desktop::WindowRegistry;
use slate_proc::{Pid, ScriptError};

use crate::api::{self, Console};
use crate::report;
use crate::timers::{FrameQueue, TimerWheel};

/// Mutable sandbox state shared with the registered capability closures.
#[derive(Default)]
pub(crate) struct SharedState {
    pub(crate) timers: TimerWheel,
    pub(crate) frames: FrameQueue,
    pub(crate) message_listeners: Vec<FnPtr>,
    pub(crate) close_handler: Option<FnPtr>,
    pub(crate) init_hook: Option<FnPtr>,
    pub(crate) main_hook: Option<FnPtr>,
    pub(crate) exit_code: Option<i64>,
    /// Last host-clock time seen; timer registration computes due times
    /// against this.
    pub(crate) now_ms: u64,
}

/// How top-level execution concluded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The body finished; the program stays resident with whatever timers
    /// and listeners it registered
    Completed,
    /// The script invoked its exit capability
    Exited(i64),
}

/// Restricted execution context for one program.
pub struct Sandbox {
    pid: Pid,
    engine: Engine,
    ast: Option<AST>,
    source: String,
    state: Rc<RefCell<SharedState>>,
}

impl Sandbox {
    /// Build the restricted engine and register the capability surface.
    pub fn new(pid: Pid, bus: Rc<MessageBus>, windows: Rc<RefCell<WindowRegistry>>) -> Self {
        let mut engine = Engine::new_raw();
        engine.register_global_module(StandardPackage::new().as_shared_module());

        // Structural limits only. There is no operation budget: a
        // synchronous infinite loop hangs the calling tick.
        engine.set_max_call_levels(64);
        engine.set_max_expr_depths(64, 64);
        engine.set_max_string_size(16_384);
        engine.set_max_array_size(10_000);
        engine.set_max_map_size(1_000);

        let state = Rc::new(RefCell::new(SharedState::default()));
        api::register_api(&mut engine, pid, state.clone(), bus, windows);

        Self {
            pid,
            engine,
            ast: None,
            source: String::new(),
            state,
        }
    }

    /// Owning process id
    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// Compile and execute the program body, then its `init`/`main` hooks.
    pub fn run(&mut self, source: &str, now_ms: u64) -> Result<Outcome, ScriptError> {
        self.state.borrow_mut().now_ms = now_ms;
        self.source = source.to_string();

        let ast = self
            .engine
            .compile(source)
            .map_err(|err| report::from_parse_error(&err, source))?;

        let mut scope = Scope::new();
        scope.push_constant("console", Console);
        let result = self
            .engine
            .eval_ast_with_scope::<Dynamic>(&mut scope, &ast);
        self.ast = Some(ast);

        if let Err(err) = result {
            if let Some(code) = self.take_exit(&err) {
                return Ok(Outcome::Exited(code));
            }
            return Err(report::from_eval_error(&err, source));
        }

        // Entry hooks registered through the App handle run after the body,
        // init first.
        let hooks: Vec<FnPtr> = {
            let mut state = self.state.borrow_mut();
            let init = state.init_hook.take();
            let main = state.main_hook.take();
            init.into_iter().chain(main).collect()
        };
        for hook in hooks {
            if let Some(code) = self.invoke(&hook, None)? {
                return Ok(Outcome::Exited(code));
            }
        }
        Ok(Outcome::Completed)
    }

    /// Run every timeout and interval due at `now_ms`, earliest first.
    ///
    /// Returns `Ok(Some(code))` when a callback exits; a failing callback
    /// aborts the pass with its normalized error.
    pub fn run_due_timers(&mut self, now_ms: u64) -> Result<Option<i64>, ScriptError> {
        self.state.borrow_mut().now_ms = now_ms;
        loop {
            let due = self.state.borrow_mut().timers.pop_due(now_ms);
            let Some((_handle, callback)) = due else {
                return Ok(None);
            };
            if let Some(code) = self.invoke(&callback, None)? {
                return Ok(Some(code));
            }
        }
    }

    /// Run the animation-frame callbacks queued at the start of this pass.
    ///
    /// Frames requested while the pass runs land in the next one; frames
    /// cancelled mid-pass are skipped.
    pub fn run_frames(&mut self, now_ms: u64) -> Result<Option<i64>, ScriptError> {
        self.state.borrow_mut().now_ms = now_ms;
        let scheduled = self.state.borrow().frames.handles();
        for handle in scheduled {
            let callback = self.state.borrow_mut().frames.take(handle);
            let Some(callback) = callback else { continue };
            if let Some(code) = self.invoke(&callback, None)? {
                return Ok(Some(code));
            }
        }
        Ok(None)
    }

    /// Deliver a host payload to the script's message listeners.
    pub fn deliver_message(
        &mut self,
        payload: &serde_json::Value,
    ) -> Result<Option<i64>, ScriptError> {
        let listeners: Vec<FnPtr> = self.state.borrow().message_listeners.clone();
        for callback in listeners {
            let arg = rhai::serde::to_dynamic(payload)
                .map_err(|err| report::from_eval_error(&err, &self.source))?;
            if let Some(code) = self.invoke(&callback, Some(arg))? {
                return Ok(Some(code));
            }
        }
        Ok(None)
    }

    /// Consult the close handler.
    ///
    /// No handler means consent. A handler that itself fails is logged and
    /// also counts as consent, so a broken predicate cannot make a process
    /// unstoppable short of kill.
    pub fn query_close(&self) -> bool {
        let handler = self.state.borrow().close_handler.clone();
        let Some(callback) = handler else { return true };
        let Some(ast) = self.ast.as_ref() else {
            return true;
        };
        match callback.call::<Dynamic>(&self.engine, ast, ()) {
            Ok(verdict) => verdict.as_bool().unwrap_or(true),
            Err(err) => {
                warn!(pid = self.pid.0, error = %err, "close handler failed");
                true
            }
        }
    }

    /// Revoke every tracked handle and clear all registrations.
    ///
    /// Idempotent: cancelling an already-cancelled handle is a no-op.
    pub fn cancel_all(&mut self) {
        let mut state = self.state.borrow_mut();
        state.timers.cancel_all();
        state.frames.cancel_all();
        state.message_listeners.clear();
        state.close_handler = None;
        state.init_hook = None;
        state.main_hook = None;
    }

    /// Number of live timer, interval, and frame handles.
    pub fn tracked_handles(&self) -> usize {
        let state = self.state.borrow();
        state.timers.len() + state.frames.len()
    }

    /// Earliest host-clock time at which a timer becomes due.
    pub fn next_due(&self) -> Option<u64> {
        self.state.borrow().timers.next_due()
    }

    /// True while any timer or frame remains scheduled.
    pub fn has_pending_work(&self) -> bool {
        self.tracked_handles() > 0
    }

    fn take_exit(&self, err: &EvalAltResult) -> Option<i64> {
        // The termination token may arrive wrapped in call frames when exit
        // was invoked inside a script function.
        let mut current: &EvalAltResult = err;
        while let EvalAltResult::ErrorInFunctionCall(_, _, inner, _) = current {
            current = inner.as_ref();
        }
        if matches!(current, EvalAltResult::ErrorTerminated(..)) {
            Some(self.state.borrow_mut().exit_code.take().unwrap_or(0))
        } else {
            None
        }
    }

    /// Invoke a stored callback against the compiled program.
    fn invoke(&self, callback: &FnPtr, arg: Option<Dynamic>) -> Result<Option<i64>, ScriptError> {
        let Some(ast) = self.ast.as_ref() else {
            return Ok(None);
        };
        let result = match arg {
            Some(value) => callback.call::<Dynamic>(&self.engine, ast, (value,)),
            None => callback.call::<Dynamic>(&self.engine, ast, ()),
        };
        match result {
            Ok(_) => Ok(None),
            Err(err) => {
                if let Some(code) = self.take_exit(&err) {
                    return Ok(Some(code));
                }
                Err(report::from_eval_error(&err, &self.source))
            }
        }
    }
}
