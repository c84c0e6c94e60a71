use std::sync::Arc;
use vela_core::repository::PricingRunRepository;
use vela_revenue::{CalendarService, PricingRunOrchestrator};

pub struct AppState {
    pub orchestrator: PricingRunOrchestrator,
    pub calendar: CalendarService,
    pub runs: Arc<dyn PricingRunRepository>,
}
