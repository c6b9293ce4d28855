//! Re-entry guards for long-running operations.

use std::collections::HashSet;
use std::sync::Mutex;

use uuid::Uuid;

use crate::errors::AppError;

/// Operations that may only have one call outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Draft,
    Advance,
    Export,
    /// Remake of one slide of one project.
    Remake(Uuid, usize),
}

impl Operation {
    fn describe(&self) -> String {
        match self {
            Operation::Draft => "Draft generation".to_string(),
            Operation::Advance => "Image generation".to_string(),
            Operation::Export => "Export".to_string(),
            Operation::Remake(_, index) => format!("Remake of slide {}", index),
        }
    }
}

#[derive(Debug, Default)]
pub struct InFlight {
    running: Mutex<HashSet<Operation>>,
}

impl InFlight {
    /// Claim `op`, failing with `Busy` if it is already running.
    pub fn begin(&self, op: Operation) -> Result<InFlightGuard<'_>, AppError> {
        let mut running = self.running.lock().unwrap_or_else(|e| e.into_inner());
        if !running.insert(op) {
            tracing::warn!(operation = ?op, "Rejected re-entrant call");
            return Err(AppError::Busy(format!("{} is already in progress", op.describe())));
        }
        Ok(InFlightGuard { owner: self, op })
    }
}

/// Releases the operation when dropped, including on early return or cancellation.
pub struct InFlightGuard<'a> {
    owner: &'a InFlight,
    op: Operation,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.owner
            .running
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.op);
    }
}
