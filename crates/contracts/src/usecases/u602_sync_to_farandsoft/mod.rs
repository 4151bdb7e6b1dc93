pub mod callback;

pub use callback::{AppendErrorRequest, StatusCallback};
