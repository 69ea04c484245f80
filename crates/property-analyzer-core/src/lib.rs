pub mod error;
pub mod types;

pub mod analysis;
pub mod costs;
pub mod loan;
pub mod rates;
pub mod renting;
pub mod report;
pub mod scenario;
pub mod tax;
pub mod time_value;

pub use error::AnalyzerError;
pub use types::*;

/// Standard result type for all analyzer operations
pub type AnalyzerResult<T> = Result<T, AnalyzerError>;
