//! Seat reconciler: restores the derived license fields after a mutation.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use licensedesk_core::Clock;
use licensedesk_inventory::{License, StatusPolicy, reconcile_seats};

use crate::medium::PersistenceMedium;
use crate::store::{EntityStore, StoreResult, WriteReport};

/// Result of one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    pub licenses: Vec<License>,
    /// Assignment records that resolved to a license.
    pub counted: usize,
    /// Stale assignment references skipped during counting.
    pub dangling: usize,
    pub write: WriteReport,
}

pub struct SeatReconciler<M> {
    store: Arc<EntityStore<M>>,
    clock: Arc<dyn Clock>,
    policy: StatusPolicy,
}

impl<M> Clone for SeatReconciler<M> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
            policy: self.policy,
        }
    }
}

impl<M> SeatReconciler<M>
where
    M: PersistenceMedium,
{
    pub fn new(store: Arc<EntityStore<M>>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            policy: StatusPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: StatusPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> StatusPolicy {
        self.policy
    }

    /// Recompute used seats and status for every license and persist the result.
    ///
    /// Reads both collections fresh, so the outcome depends only on what is
    /// stored and on the clock.
    pub fn reconcile(&self) -> StoreResult<ReconcileReport> {
        let mut licenses = self.store.read_all_licenses()?;
        let users = self.store.read_all_users()?;

        let tally = reconcile_seats(&mut licenses, &users, self.clock.now(), self.policy);
        for stale in &tally.dangling {
            debug!(
                user_id = %stale.user_id,
                license_id = %stale.license_id,
                "skipping dangling assignment"
            );
        }

        let write = self.store.write_all_licenses(&licenses)?;
        info!(
            licenses = licenses.len(),
            counted = tally.counted,
            dangling = tally.dangling.len(),
            degraded = write.degraded.len(),
            "seat reconciliation complete"
        );

        Ok(ReconcileReport {
            licenses,
            counted: tally.counted,
            dangling: tally.dangling.len(),
            write,
        })
    }
}
