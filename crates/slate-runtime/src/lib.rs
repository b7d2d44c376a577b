//! Process orchestration for Slate
//!
//! The runtime owns the process table, the message bus, the window
//! registry, and one sandbox per running program. It drives every
//! lifecycle transition (spawn, stop, kill, script exit) and the
//! cooperative clock that makes timers and animation frames fire.
//!
//! Everything is single-threaded; the host supplies time explicitly, so
//! behavior is deterministic under test.

mod error;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use tracing::{error, info, warn};

use slate_bus::{BusMessage, MessageBus};
use slate_desktop::WindowRegistry;
use slate_proc::{Pid, Process, ProcessStatus, ProcessTable, ScriptError};
use slate_sandbox::{Outcome, Sandbox};
use slate_vfs::{normalize_path, Vfs};

pub use error::RuntimeError;

/// Dependency-injected runtime service object.
///
/// Construct one per desktop session; tests construct isolated instances.
pub struct Runtime {
    vfs: Rc<dyn Vfs>,
    windows: Rc<RefCell<WindowRegistry>>,
    bus: Rc<MessageBus>,
    table: RefCell<ProcessTable>,
    sandboxes: RefCell<BTreeMap<Pid, Sandbox>>,
}

impl Runtime {
    /// Create a runtime reading program source through `vfs`.
    pub fn new(vfs: Rc<dyn Vfs>) -> Self {
        Self::with_windows(vfs, Rc::new(RefCell::new(WindowRegistry::new())))
    }

    /// Create a runtime sharing an existing window registry.
    pub fn with_windows(vfs: Rc<dyn Vfs>, windows: Rc<RefCell<WindowRegistry>>) -> Self {
        Self {
            vfs,
            windows,
            bus: Rc::new(MessageBus::new()),
            table: RefCell::new(ProcessTable::new()),
            sandboxes: RefCell::new(BTreeMap::new()),
        }
    }

    /// The shared window registry.
    pub fn windows(&self) -> Rc<RefCell<WindowRegistry>> {
        self.windows.clone()
    }

    /// The message bus observers subscribe to.
    pub fn bus(&self) -> Rc<MessageBus> {
        self.bus.clone()
    }

    /// Start the program at `path`.
    ///
    /// A path that already has a running process is a no-op returning the
    /// live pid. An unreadable source aborts the start with no process
    /// created. A runtime failure inside the program still returns its pid:
    /// the record stays in the table with `status = Error` for inspection.
    pub fn spawn(&self, path: &str, now_ms: u64) -> Result<Pid, RuntimeError> {
        let path = normalize_path(path).map_err(|source| RuntimeError::Source {
            path: path.to_string(),
            source,
        })?;

        if let Some(pid) = self.table.borrow().running_at(&path) {
            info!(%pid, %path, "already running, spawn is a no-op");
            return Ok(pid);
        }

        let source = self.vfs.read_to_string(&path).map_err(|source| {
            warn!(%path, error = %source, "failed to read program source");
            RuntimeError::Source {
                path: path.clone(),
                source,
            }
        })?;

        let pid = self.table.borrow_mut().alloc_pid();
        // Register before executing so listeners attached during top-level
        // code can already receive messages.
        self.table
            .borrow_mut()
            .insert(Process::new(pid, path.clone(), now_ms));
        let mut sandbox = Sandbox::new(pid, self.bus.clone(), self.windows.clone());

        if let Some(process) = self.table.borrow_mut().get_mut(pid) {
            process.status = ProcessStatus::Running;
        }
        info!(%pid, %path, "process started");

        let result = sandbox.run(&source, now_ms);
        self.sandboxes.borrow_mut().insert(pid, sandbox);
        match result {
            Ok(Outcome::Completed) => {}
            Ok(Outcome::Exited(code)) => self.terminate(pid, code),
            Err(failure) => self.fail(pid, failure),
        }
        Ok(pid)
    }

    /// Request a graceful stop.
    ///
    /// Publishes a close-request, delivers it to the program's listeners,
    /// then consults the close handler. Returns `Ok(false)` when the
    /// handler vetoes; the process keeps running and that is not an error.
    pub fn stop(&self, pid: Pid) -> Result<bool, RuntimeError> {
        if self.table.borrow().get(pid).is_none() {
            return Err(RuntimeError::ProcessNotFound(pid));
        }

        self.bus.publish(pid, &BusMessage::CloseRequest);
        let notice = serde_json::json!({ "type": "close-request" });
        match self.with_sandbox(pid, |sandbox| sandbox.deliver_message(&notice)) {
            Some(Ok(Some(code))) => {
                // The program answered the close request by exiting.
                self.terminate(pid, code);
                return Ok(true);
            }
            Some(Err(failure)) => {
                self.fail(pid, failure);
                return Ok(false);
            }
            _ => {}
        }

        // Same take-run-readmit discipline as the callback paths: the close
        // handler is script code and may re-enter through the bus.
        let taken = self.sandboxes.borrow_mut().remove(&pid);
        let consented = match taken {
            Some(mut sandbox) => {
                let verdict = sandbox.query_close();
                if self.table.borrow().get(pid).is_some() {
                    self.sandboxes.borrow_mut().insert(pid, sandbox);
                } else {
                    sandbox.cancel_all();
                }
                verdict
            }
            None => true,
        };
        if !consented {
            info!(%pid, "stop vetoed by close handler");
            return Ok(false);
        }

        self.terminate(pid, 0);
        Ok(true)
    }

    /// Terminate unconditionally, skipping close negotiation.
    pub fn kill(&self, pid: Pid) -> Result<(), RuntimeError> {
        if self.table.borrow().get(pid).is_none() {
            return Err(RuntimeError::ProcessNotFound(pid));
        }
        info!(%pid, "process killed");
        self.terminate(pid, 0);
        Ok(())
    }

    /// Advance the host clock, running every timer and interval now due.
    pub fn advance_to(&self, now_ms: u64) {
        for pid in self.live_pids() {
            match self.with_sandbox(pid, |sandbox| sandbox.run_due_timers(now_ms)) {
                Some(Ok(Some(code))) => self.terminate(pid, code),
                Some(Err(failure)) => self.fail(pid, failure),
                _ => {}
            }
        }
    }

    /// Run one animation-frame pass across all programs.
    pub fn run_frame(&self, now_ms: u64) {
        for pid in self.live_pids() {
            match self.with_sandbox(pid, |sandbox| sandbox.run_frames(now_ms)) {
                Some(Ok(Some(code))) => self.terminate(pid, code),
                Some(Err(failure)) => self.fail(pid, failure),
                _ => {}
            }
        }
    }

    /// Deliver a host payload to a program's message listeners.
    pub fn post_to(&self, pid: Pid, payload: serde_json::Value) -> Result<(), RuntimeError> {
        if self.table.borrow().get(pid).is_none() {
            return Err(RuntimeError::ProcessNotFound(pid));
        }
        match self.with_sandbox(pid, |sandbox| sandbox.deliver_message(&payload)) {
            Some(Ok(Some(code))) => self.terminate(pid, code),
            Some(Err(failure)) => self.fail(pid, failure),
            _ => {}
        }
        Ok(())
    }

    /// Snapshot of all process records, ordered by pid.
    pub fn processes(&self) -> Vec<Process> {
        self.table.borrow().list().into_iter().cloned().collect()
    }

    /// Snapshot of one process record.
    pub fn process(&self, pid: Pid) -> Option<Process> {
        self.table.borrow().get(pid).cloned()
    }

    /// Pid of the running process started from `path`, if any.
    pub fn running_at(&self, path: &str) -> Option<Pid> {
        let path = normalize_path(path).ok()?;
        self.table.borrow().running_at(&path)
    }

    /// Live timer/interval/frame handles held by a program.
    pub fn tracked_handles(&self, pid: Pid) -> usize {
        self.sandboxes
            .borrow()
            .get(&pid)
            .map(|sandbox| sandbox.tracked_handles())
            .unwrap_or(0)
    }

    /// Earliest host-clock time at which any program's timer becomes due.
    pub fn next_due(&self) -> Option<u64> {
        self.sandboxes
            .borrow()
            .values()
            .filter_map(|sandbox| sandbox.next_due())
            .min()
    }

    /// True while any program has scheduled work.
    pub fn has_pending_work(&self) -> bool {
        self.sandboxes
            .borrow()
            .values()
            .any(|sandbox| sandbox.has_pending_work())
    }

    fn live_pids(&self) -> Vec<Pid> {
        self.sandboxes.borrow().keys().copied().collect()
    }

    /// Take a sandbox out of the map, run `f` against it with no borrows
    /// held (script callbacks may re-enter the bus or the registry), and
    /// re-admit it unless the process vanished while the callback ran.
    fn with_sandbox<F>(&self, pid: Pid, f: F) -> Option<Result<Option<i64>, ScriptError>>
    where
        F: FnOnce(&mut Sandbox) -> Result<Option<i64>, ScriptError>,
    {
        let mut sandbox = self.sandboxes.borrow_mut().remove(&pid)?;
        let result = f(&mut sandbox);
        if self.table.borrow().get(pid).is_some() {
            self.sandboxes.borrow_mut().insert(pid, sandbox);
        } else {
            sandbox.cancel_all();
        }
        Some(result)
    }

    /// Shared termination path: exit notice, handle revocation, removal.
    fn terminate(&self, pid: Pid, code: i64) {
        self.bus.publish(pid, &BusMessage::Exit { code });
        if let Some(mut sandbox) = self.sandboxes.borrow_mut().remove(&pid) {
            sandbox.cancel_all();
        }
        if let Some(process) = self.table.borrow_mut().get_mut(pid) {
            process.status = ProcessStatus::Stopped;
        }
        self.table.borrow_mut().remove(pid);
        info!(%pid, code, "process terminated");
    }

    /// Error transition: the record is retained for inspection, and the
    /// failure is broadcast so console observers can render it.
    fn fail(&self, pid: Pid, failure: ScriptError) {
        error!(%pid, name = %failure.name, message = %failure.message, "process failed");
        self.bus.publish(pid, &BusMessage::Error(failure.clone()));
        if let Some(process) = self.table.borrow_mut().get_mut(pid) {
            process.status = ProcessStatus::Error;
            process.error = Some(failure);
        }
    }
}
