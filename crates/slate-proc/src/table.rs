//! Process table - pure data structure holding all process records

use std::collections::BTreeMap;

use crate::types::{Pid, Process, ProcessStatus};

/// The process table.
///
/// Pids come from a monotonic counter, so an id is never reused within a
/// session. All transitions are driven from outside; this struct only
/// holds state.
#[derive(Clone, Debug, Default)]
pub struct ProcessTable {
    processes: BTreeMap<Pid, Process>,
    next_pid: u64,
}

impl ProcessTable {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self {
            processes: BTreeMap::new(),
            next_pid: 1,
        }
    }

    /// Generate the next process ID.
    pub fn alloc_pid(&mut self) -> Pid {
        let pid = Pid(self.next_pid);
        self.next_pid += 1;
        pid
    }

    /// Register a process record.
    pub fn insert(&mut self, process: Process) {
        self.processes.insert(process.pid, process);
    }

    /// Get a process by pid.
    pub fn get(&self, pid: Pid) -> Option<&Process> {
        self.processes.get(&pid)
    }

    /// Get a mutable process by pid.
    pub fn get_mut(&mut self, pid: Pid) -> Option<&mut Process> {
        self.processes.get_mut(&pid)
    }

    /// Remove a process record, returning it.
    pub fn remove(&mut self, pid: Pid) -> Option<Process> {
        self.processes.remove(&pid)
    }

    /// Pid of the running process started from `path`, if any.
    pub fn running_at(&self, path: &str) -> Option<Pid> {
        self.processes
            .values()
            .find(|p| p.start_path == path && p.status == ProcessStatus::Running)
            .map(|p| p.pid)
    }

    /// All processes ordered by pid.
    pub fn list(&self) -> Vec<&Process> {
        self.processes.values().collect()
    }

    /// Number of tracked processes.
    pub fn count(&self) -> usize {
        self.processes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pids_are_monotonic() {
        let mut table = ProcessTable::new();
        let a = table.alloc_pid();
        let b = table.alloc_pid();
        assert!(b > a);

        table.insert(Process::new(a, "/home/a.rhai", 0));
        table.remove(a);
        // A freed pid is never handed out again.
        let c = table.alloc_pid();
        assert!(c > b);
    }

    #[test]
    fn test_running_at_matches_only_running() {
        let mut table = ProcessTable::new();
        let pid = table.alloc_pid();
        table.insert(Process::new(pid, "/home/a.rhai", 0));
        assert_eq!(table.running_at("/home/a.rhai"), None);

        table.get_mut(pid).unwrap().status = ProcessStatus::Running;
        assert_eq!(table.running_at("/home/a.rhai"), Some(pid));
        assert_eq!(table.running_at("/home/b.rhai"), None);

        table.get_mut(pid).unwrap().status = ProcessStatus::Error;
        assert_eq!(table.running_at("/home/a.rhai"), None);
    }

    #[test]
    fn test_list_ordered_by_pid() {
        let mut table = ProcessTable::new();
        for _ in 0..3 {
            let pid = table.alloc_pid();
            table.insert(Process::new(pid, "/p", 0));
        }
        let pids: Vec<u64> = table.list().iter().map(|p| p.pid.0).collect();
        assert_eq!(pids, vec![1, 2, 3]);
    }
}
