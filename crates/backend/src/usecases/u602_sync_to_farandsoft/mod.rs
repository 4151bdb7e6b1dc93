pub mod executor;
pub mod outcome;

pub use executor::FarandsoftSyncExecutor;
