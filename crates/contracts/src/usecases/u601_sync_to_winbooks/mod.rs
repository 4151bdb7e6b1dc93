pub mod callback;
pub mod progress;
pub mod response;
pub mod vat;

pub use callback::{AbortCallback, AbortKind, AbortReason, SuccessCallback};
pub use progress::ProgressSnapshot;
pub use response::EnqueueResponse;
pub use vat::{InvoicePayload, TaxLine, VatBreakupLine, VatComputation};
