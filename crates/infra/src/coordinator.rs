//! Assignment coordinator: applies a user's desired license set.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use licensedesk_core::{DomainError, LicenseId, UserId, position_of};
use licensedesk_inventory::{Assignment, User};

use crate::error::ServiceResult;
use crate::medium::PersistenceMedium;
use crate::reconciler::{ReconcileReport, SeatReconciler};
use crate::store::EntityStore;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentOutcome {
    pub user: User,
    /// Requested ids that did not resolve to a license.
    pub dropped: Vec<LicenseId>,
    pub reconcile: ReconcileReport,
}

pub struct AssignmentCoordinator<M> {
    store: Arc<EntityStore<M>>,
    reconciler: SeatReconciler<M>,
}

impl<M> AssignmentCoordinator<M>
where
    M: PersistenceMedium,
{
    pub fn new(store: Arc<EntityStore<M>>, reconciler: SeatReconciler<M>) -> Self {
        Self { store, reconciler }
    }

    /// Replace the user's assignments with `desired` and reconcile.
    ///
    /// Unknown license ids are dropped; repeated ids collapse to one record.
    /// The user list is persisted before reconciliation runs, and
    /// reconciliation runs even when nothing changed.
    pub fn assign(&self, user_id: UserId, desired: &[LicenseId]) -> ServiceResult<AssignmentOutcome> {
        let mut users = self.store.read_all_users()?;
        let Some(index) = position_of(&users, &user_id) else {
            warn!(user_id = %user_id, "assignment requested for unknown user");
            return Err(DomainError::not_found(format!("user {user_id}")).into());
        };

        let licenses = self.store.read_all_licenses()?;
        let mut seen = HashSet::new();
        let mut snapshots = Vec::new();
        let mut dropped = Vec::new();

        for id in desired {
            if !seen.insert(id) {
                continue;
            }
            match position_of(&licenses, id) {
                Some(i) => snapshots.push(Assignment::snapshot(&licenses[i])),
                None => {
                    debug!(user_id = %user_id, license_id = %id, "dropping unknown license from assignment");
                    dropped.push(id.clone());
                }
            }
        }

        users[index].replace_assignments(snapshots);
        let user = users[index].clone();
        self.store.write_all_users(&users)?;

        let reconcile = self.reconciler.reconcile()?;
        info!(
            user_id = %user_id,
            assigned = user.assignments().len(),
            dropped = dropped.len(),
            "license assignments replaced"
        );

        Ok(AssignmentOutcome {
            user,
            dropped,
            reconcile,
        })
    }
}
