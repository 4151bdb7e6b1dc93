pub mod sync_runs;
pub mod usecases;
