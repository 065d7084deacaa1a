//! Storage and facade wiring shared by all handlers.

use std::sync::{Arc, Mutex, MutexGuard};

use licensedesk_core::{Clock, SystemClock};
use licensedesk_infra::{InventoryConfig, InventoryService, MediumError, PersistenceMedium, open_medium};

pub type Inventory = InventoryService<Arc<dyn PersistenceMedium>>;

/// Handler-facing services.
///
/// Every request takes the facade lock for the whole operation, so mutations
/// apply one at a time in arrival order.
pub struct AppServices {
    inventory: Mutex<Inventory>,
}

impl AppServices {
    pub fn new(inventory: Inventory) -> Self {
        Self {
            inventory: Mutex::new(inventory),
        }
    }

    pub fn inventory(&self) -> Result<MutexGuard<'_, Inventory>, PoisonedLock> {
        self.inventory.lock().map_err(|_| PoisonedLock)
    }
}

/// The facade lock was poisoned by a panicking handler.
#[derive(Debug, Copy, Clone)]
pub struct PoisonedLock;

/// Open storage as configured and wire the facade over the system clock.
pub fn build_services(config: &InventoryConfig) -> Result<Arc<AppServices>, MediumError> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    build_services_with_clock(config, clock)
}

pub fn build_services_with_clock(
    config: &InventoryConfig,
    clock: Arc<dyn Clock>,
) -> Result<Arc<AppServices>, MediumError> {
    let medium = open_medium(config)?;
    let inventory = InventoryService::from_config(medium, clock, config);
    Ok(Arc::new(AppServices::new(inventory)))
}
