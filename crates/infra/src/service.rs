//! Inventory facade: the full operation set a UI, CLI or HTTP layer drives.
//!
//! Wires the entity store, seat reconciler, assignment coordinator, document
//! service and expiry notifier over one persistence medium and one clock.

use std::sync::Arc;

use tracing::{debug, info};

use licensedesk_core::{Clock, DocumentId, LicenseId, UserId, position_of};
use licensedesk_inventory::summary::{self, DepartmentCost, LicenseSummary, Renewal};
use licensedesk_inventory::{
    DocumentUpload, License, LicenseEdit, NewLicense, NewUser, StatusPolicy, User, UserEdit,
};

use crate::config::InventoryConfig;
use crate::coordinator::{AssignmentCoordinator, AssignmentOutcome};
use crate::documents::{DocumentService, UploadOutcome};
use crate::error::ServiceResult;
use crate::medium::PersistenceMedium;
use crate::notifications::{DispatchSummary, ExpiryNotice, ExpiryNotifier, NotificationSink};
use crate::reconciler::{ReconcileReport, SeatReconciler};
use crate::store::EntityStore;

pub const RENEWAL_HORIZON_DAYS: i64 = 60;
pub const RENEWAL_LIMIT: usize = 5;

pub struct InventoryService<M> {
    store: Arc<EntityStore<M>>,
    clock: Arc<dyn Clock>,
    reconciler: SeatReconciler<M>,
    coordinator: AssignmentCoordinator<M>,
    documents: DocumentService<M>,
    notifier: ExpiryNotifier<M>,
}

impl<M> InventoryService<M>
where
    M: PersistenceMedium,
{
    /// Facade with default limits and windows.
    pub fn new(medium: M, clock: Arc<dyn Clock>) -> Self {
        Self::from_config(medium, clock, &InventoryConfig::default())
    }

    pub fn from_config(medium: M, clock: Arc<dyn Clock>, config: &InventoryConfig) -> Self {
        let store = Arc::new(EntityStore::new(medium).with_max_payload_chars(config.max_payload_chars));
        let reconciler = SeatReconciler::new(Arc::clone(&store), Arc::clone(&clock))
            .with_policy(StatusPolicy::new(config.expiring_window_days));
        let coordinator = AssignmentCoordinator::new(Arc::clone(&store), reconciler.clone());
        let documents = DocumentService::new(Arc::clone(&store), Arc::clone(&clock))
            .with_max_document_bytes(config.max_document_bytes);
        let notifier = ExpiryNotifier::new(Arc::clone(&store)).with_window_days(config.notice_window_days);

        Self {
            store,
            clock,
            reconciler,
            coordinator,
            documents,
            notifier,
        }
    }

    pub fn store(&self) -> &EntityStore<M> {
        &self.store
    }

    // ── Reads ───────────────────────────────────────────────────────────────

    pub fn licenses(&self) -> ServiceResult<Vec<License>> {
        Ok(self.store.read_all_licenses()?)
    }

    pub fn license(&self, id: &LicenseId) -> ServiceResult<Option<License>> {
        let licenses = self.store.read_all_licenses()?;
        Ok(licenses.into_iter().find(|l| &l.id == id))
    }

    pub fn search_licenses(&self, query: &str) -> ServiceResult<Vec<License>> {
        let licenses = self.store.read_all_licenses()?;
        Ok(summary::search(&licenses, query).into_iter().cloned().collect())
    }

    pub fn users(&self) -> ServiceResult<Vec<User>> {
        Ok(self.store.read_all_users()?)
    }

    // ── License mutations ───────────────────────────────────────────────────

    pub fn add_license(&self, input: NewLicense) -> ServiceResult<License> {
        let license = License::create(LicenseId::generate(), input, self.clock.today())?;
        self.store.add_license(license.clone())?;
        info!(license_id = %license.id, name = %license.name, "license added");
        Ok(license)
    }

    /// Apply an edit and return the license as persisted.
    ///
    /// An expiry change triggers reconciliation so the status follows the new
    /// date. The returned copy carries any placeholder the write substituted.
    pub fn update_license(&self, id: &LicenseId, edit: LicenseEdit) -> ServiceResult<Option<License>> {
        let licenses = self.store.read_all_licenses()?;
        let Some(index) = position_of(&licenses, id) else {
            debug!(license_id = %id, "update of unknown license ignored");
            return Ok(None);
        };

        let mut license = licenses[index].clone();
        let previous_expiry = license.expiry_date;
        license.apply_edit(edit)?;
        let expiry_changed = license.expiry_date != previous_expiry;
        self.store.update_license(license)?;
        info!(license_id = %id, "license updated");

        if expiry_changed {
            self.reconciler.reconcile()?;
        }
        self.license(id)
    }

    /// Strip a license from every user, delete it, then reconcile.
    ///
    /// Users are released before the license record goes, so a failed write
    /// leaves a state that a retry of the same call completes.
    pub fn delete_license(&self, id: &LicenseId) -> ServiceResult<bool> {
        let mut users = self.store.read_all_users()?;
        let released = users.iter_mut().map(|u| u.release(id)).filter(|r| *r).count();
        if released > 0 {
            self.store.write_all_users(&users)?;
        }

        let removed = self.store.delete_license(id)?;
        if !removed && released == 0 {
            return Ok(false);
        }
        info!(license_id = %id, released, removed, "license deleted");
        self.reconciler.reconcile()?;
        Ok(removed)
    }

    // ── User mutations ──────────────────────────────────────────────────────

    pub fn add_user(&self, input: NewUser) -> ServiceResult<User> {
        let users = self.store.read_all_users()?;
        let id = UserId::next_after(users.iter().map(|u| &u.id))?;
        let user = User::create(id, input)?;
        self.store.add_user(user.clone())?;
        info!(user_id = %user.id, "user added");
        Ok(user)
    }

    pub fn update_user(&self, id: UserId, edit: UserEdit) -> ServiceResult<Option<User>> {
        let users = self.store.read_all_users()?;
        let Some(index) = position_of(&users, &id) else {
            debug!(user_id = %id, "update of unknown user ignored");
            return Ok(None);
        };

        let mut user = users[index].clone();
        user.apply_edit(edit)?;
        self.store.update_user(user.clone())?;
        info!(user_id = %id, "user updated");
        Ok(Some(user))
    }

    /// Delete a user, then reconcile the seats it held.
    pub fn delete_user(&self, id: UserId) -> ServiceResult<bool> {
        if !self.store.delete_user(id)? {
            return Ok(false);
        }
        info!(user_id = %id, "user deleted");
        self.reconciler.reconcile()?;
        Ok(true)
    }

    pub fn assign_licenses_to_user(
        &self,
        user_id: UserId,
        license_ids: &[LicenseId],
    ) -> ServiceResult<AssignmentOutcome> {
        self.coordinator.assign(user_id, license_ids)
    }

    pub fn reconcile(&self) -> ServiceResult<ReconcileReport> {
        Ok(self.reconciler.reconcile()?)
    }

    // ── Documents ───────────────────────────────────────────────────────────

    pub fn upload_document(
        &self,
        license_id: &LicenseId,
        upload: DocumentUpload,
    ) -> ServiceResult<Option<UploadOutcome>> {
        self.documents.upload(license_id, upload)
    }

    pub fn delete_document(&self, license_id: &LicenseId, document_id: &DocumentId) -> ServiceResult<bool> {
        self.documents.delete(license_id, document_id)
    }

    // ── Dashboard ───────────────────────────────────────────────────────────

    pub fn summary(&self) -> ServiceResult<LicenseSummary> {
        Ok(LicenseSummary::from_licenses(&self.store.read_all_licenses()?))
    }

    pub fn department_costs(&self) -> ServiceResult<Vec<DepartmentCost>> {
        Ok(summary::department_costs(&self.store.read_all_licenses()?))
    }

    pub fn upcoming_renewals(&self) -> ServiceResult<Vec<Renewal>> {
        let licenses = self.store.read_all_licenses()?;
        Ok(summary::upcoming_renewals(
            &licenses,
            self.clock.now(),
            RENEWAL_HORIZON_DAYS,
            RENEWAL_LIMIT,
        ))
    }

    // ── Notifications ───────────────────────────────────────────────────────

    pub fn expiring_notices(&self) -> ServiceResult<Vec<ExpiryNotice>> {
        Ok(self.notifier.scan(self.clock.now())?)
    }

    pub fn notify_expiring(&self, sink: &dyn NotificationSink) -> ServiceResult<DispatchSummary> {
        Ok(self.notifier.dispatch(sink, self.clock.now())?)
    }
}
