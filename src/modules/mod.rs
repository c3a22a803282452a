pub mod catalog;
pub mod circulation;

use std::sync::Arc;

use libris_circulation::{CirculationPolicy, CirculationService};
use libris_kernel::settings::{CirculationSettings, Settings};
use libris_kernel::ModuleRegistry;
use libris_store::MemoryStore;

/// Register all application modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, store: &MemoryStore, settings: &Settings) {
    let policy = policy_from(&settings.circulation);
    let service = Arc::new(CirculationService::new(store.clone(), policy));

    registry.register(circulation::create_module(service));
    registry.register(catalog::create_module(store.clone()));
}

/// Render the settings section into the engine's policy type.
pub fn policy_from(settings: &CirculationSettings) -> CirculationPolicy {
    CirculationPolicy {
        max_open_issues: settings.max_open_issues,
        renewal_cap: settings.renewal_cap,
        loan_days: settings.loan_days,
        max_due_days: settings.max_due_days,
        daily_fine: settings.daily_fine,
        hold_days: settings.hold_days,
        replacement_fee: settings.replacement_fee,
    }
}
