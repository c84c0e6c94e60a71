pub mod calendar;
pub mod run;

pub use calendar::{CalendarDay, CalendarError, CalendarService};
pub use run::{EngineStores, PricingRunOrchestrator, RunError, RunOutcome};
