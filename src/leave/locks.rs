use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// One async mutex per employee id, so balance read-modify-write cycles for
/// the same employee never interleave.
///
/// Slots are held weakly: a slot lives exactly as long as a guard or a waiter
/// references it.
#[derive(Default)]
pub struct EmployeeLocks {
    slots: Mutex<HashMap<String, Weak<AsyncMutex<()>>>>,
}

impl EmployeeLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, employee_id: &str) -> OwnedMutexGuard<()> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            slots.retain(|_, slot| slot.strong_count() > 0);

            match slots.get(employee_id).and_then(Weak::upgrade) {
                Some(slot) => slot,
                None => {
                    let slot = Arc::new(AsyncMutex::new(()));
                    slots.insert(employee_id.to_string(), Arc::downgrade(&slot));
                    slot
                }
            }
        };

        slot.lock_owned().await
    }

    /// Number of employees with a live guard or waiter.
    pub fn active(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|slot| slot.strong_count() > 0)
            .count()
    }
}
