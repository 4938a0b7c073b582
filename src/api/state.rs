use crate::observe::ErrorLogStore;
use crate::service::VehicleService;

/// Shared by every handler behind an `Arc`.
#[derive(Debug, Clone)]
pub struct AppState {
    pub vehicles: VehicleService,
    pub error_logs: ErrorLogStore,
}

impl AppState {
    #[must_use]
    pub const fn new(vehicles: VehicleService, error_logs: ErrorLogStore) -> Self {
        Self { vehicles, error_logs }
    }
}
