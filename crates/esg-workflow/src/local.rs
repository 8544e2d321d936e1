//! Per-connection view of content lifecycle.
//!
//! Lives inside a [`Connection`](crate::session::Connection), so replacing
//! or dropping the connection discards it.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockWriteGuard};

use esg_types::ContentId;

use crate::error::{WorkflowError, WorkflowResult};
use crate::workflow::ContentState;

#[derive(Debug, Default)]
struct Inner {
    states: HashMap<ContentId, ContentState>,
    in_flight: HashSet<ContentId>,
}

#[derive(Debug, Default)]
pub(crate) struct LocalStates {
    inner: RwLock<Inner>,
}

impl LocalStates {
    fn write(&self) -> WorkflowResult<RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|e| WorkflowError::OperationFailed(format!("lock poisoned: {e}")))
    }

    pub(crate) fn get(&self, id: &ContentId) -> ContentState {
        self.inner
            .read()
            .map(|s| s.states.get(id).copied().unwrap_or_default())
            .unwrap_or_default()
    }

    pub(crate) fn set(&self, id: ContentId, state: ContentState) -> WorkflowResult<()> {
        self.write()?.states.insert(id, state);
        Ok(())
    }

    /// Claim `id` for a registration. Refused while the id is registered
    /// or another registration of it is in flight.
    pub(crate) fn reserve(self: &Arc<Self>, id: ContentId) -> WorkflowResult<Reservation> {
        let mut inner = self.write()?;
        if inner.states.get(&id).copied().unwrap_or_default() != ContentState::Unregistered {
            return Err(WorkflowError::Validation(format!("{id} is already registered")));
        }
        if !inner.in_flight.insert(id) {
            return Err(WorkflowError::Validation(format!("{id} is already being registered")));
        }
        Ok(Reservation {
            states: Arc::clone(self),
            id,
        })
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.inner.read().map(|s| s.states.len()).unwrap_or_default()
    }
}

/// An in-flight registration. Dropping it, on failure or cancellation,
/// releases the id.
pub(crate) struct Reservation {
    states: Arc<LocalStates>,
    id: ContentId,
}

impl Reservation {
    pub(crate) fn confirm(self, state: ContentState) -> WorkflowResult<()> {
        self.states.set(self.id, state)
    }
}

impl Drop for Reservation {
    fn drop(&mut self) {
        let mut inner = self.states.inner.write().unwrap_or_else(|e| e.into_inner());
        inner.in_flight.remove(&self.id);
    }
}
