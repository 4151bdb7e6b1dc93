pub mod executor;
pub mod outcome;
pub mod step_planner;
pub mod vat;

pub use executor::WinbooksSyncExecutor;
