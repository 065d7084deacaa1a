//! Infrastructure layer: persistence media, the entity store, and the
//! services that keep derived license state consistent.

pub mod config;
pub mod coordinator;
pub mod documents;
pub mod error;
pub mod medium;
pub mod notifications;
pub mod reconciler;
pub mod service;
pub mod store;

mod integration_tests;

pub use config::{InventoryConfig, default_data_dir, open_medium};
pub use coordinator::{AssignmentCoordinator, AssignmentOutcome};
pub use documents::{DocumentService, UploadOutcome};
pub use error::{ServiceError, ServiceResult};
pub use medium::{FileMedium, InMemoryMedium, MediumError, PersistenceMedium};
pub use notifications::{
    DispatchSummary, ExpiryNotice, ExpiryNotifier, InMemorySink, LogSink, NotificationSink, SinkError,
};
pub use reconciler::{ReconcileReport, SeatReconciler};
pub use service::InventoryService;
pub use store::{DegradedDocument, EntityStore, StoreError, StoreResult, WriteReport};
