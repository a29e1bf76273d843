mod applicants;
mod postgres;
mod watermark;

pub use applicants::{
    coerce_score, ApplicantStore, MemoryApplicantStore, PostgresApplicantStore,
};
pub use postgres::PostgresConnector;
pub use watermark::{MemoryWatermarkStore, PostgresWatermarkStore, WatermarkStore};
