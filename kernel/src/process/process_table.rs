// SPDX-License-Identifier: MPL-2.0

//! The global table mapping PIDs to processes.
//!
//! The table is a fixed array of `PROC_MAX + 1` slots indexed by PID; slot
//! zero belongs to the kernel and is never handed out. PIDs are allocated
//! with a circular scan starting after the most recently allocated one, so
//! a just-freed PID is not immediately reused and stale-PID bugs surface
//! as missing processes rather than as the wrong process.

use super::{Pid, Process};
use crate::prelude::*;

/// The largest PID the table can hold.
pub const PROC_MAX: usize = 256;

#[derive(Clone)]
enum PidSlot {
    Empty,
    /// Handed out by `allocate_pid` but not yet holding a process.
    Reserved,
    Occupied(Arc<Process>),
}

impl PidSlot {
    fn is_empty(&self) -> bool {
        matches!(self, PidSlot::Empty)
    }
}

struct PidTable {
    slots: Vec<PidSlot>,
    last_pid: Pid,
}

impl PidTable {
    fn new() -> Self {
        Self {
            slots: vec![PidSlot::Empty; PROC_MAX + 1],
            last_pid: 0,
        }
    }

    fn allocate_pid(&mut self) -> Result<Pid> {
        for offset in 0..PROC_MAX {
            let pid = (self.last_pid as usize + offset) % PROC_MAX + 1;
            if self.slots[pid].is_empty() {
                self.slots[pid] = PidSlot::Reserved;
                self.last_pid = pid as Pid;
                return Ok(pid as Pid);
            }
        }
        return_errno_with_message!(Errno::EAGAIN, "the process table is full")
    }

    fn release_pid(&mut self, pid: Pid) {
        debug_assert!(matches!(self.slots[pid as usize], PidSlot::Reserved));
        self.slots[pid as usize] = PidSlot::Empty;
    }

    fn insert(&mut self, pid: Pid, process: Arc<Process>) {
        assert_eq!(
            process.pid(),
            pid,
            "a process may only occupy its own table slot"
        );
        debug_assert!(matches!(self.slots[pid as usize], PidSlot::Reserved));
        self.slots[pid as usize] = PidSlot::Occupied(process);
    }

    fn remove(&mut self, pid: Pid) -> Option<Arc<Process>> {
        let slot = self.slots.get_mut(pid as usize)?;
        match core::mem::replace(slot, PidSlot::Empty) {
            PidSlot::Occupied(process) => Some(process),
            other => {
                *slot = other;
                None
            }
        }
    }

    fn get(&self, pid: Pid) -> Option<Arc<Process>> {
        match self.slots.get(pid as usize)? {
            PidSlot::Occupied(process) => {
                assert_eq!(
                    process.pid(),
                    pid,
                    "a process may only occupy its own table slot"
                );
                Some(process.clone())
            }
            _ => None,
        }
    }
}

lazy_static! {
    static ref PROCESS_TABLE: SpinLock<PidTable> = SpinLock::new(PidTable::new());
}

/// Reserves a free PID.
///
/// The slot stays reserved until [`insert`] fills it or [`release_pid`]
/// gives it back, so a concurrent allocation cannot be handed the same PID.
pub fn allocate_pid() -> Result<Pid> {
    PROCESS_TABLE.lock().allocate_pid()
}

/// Returns a reserved PID that will not be used after all.
pub fn release_pid(pid: Pid) {
    PROCESS_TABLE.lock().release_pid(pid);
}

/// Fills the reserved slot `pid` with `process`.
pub fn insert(pid: Pid, process: Arc<Process>) {
    PROCESS_TABLE.lock().insert(pid, process);
}

/// Removes the process with `pid`, freeing the slot for reuse.
pub fn remove(pid: Pid) -> Option<Arc<Process>> {
    PROCESS_TABLE.lock().remove(pid)
}

/// Gets the process with `pid`.
pub fn get_process(pid: Pid) -> Option<Arc<Process>> {
    PROCESS_TABLE.lock().get(pid)
}
