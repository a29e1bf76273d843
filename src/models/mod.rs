pub mod record;
pub mod task;

pub use record::{CanonicalRecord, EnrichedRecord, RawRecord};
pub use task::{TaskKind, TaskMessage};
