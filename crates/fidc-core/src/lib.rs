pub mod aging;
pub mod engine;
pub mod error;
pub mod fund;
pub mod rates;
pub mod solver;
pub mod subordination;
pub mod types;
pub mod waterfall;

#[cfg(feature = "rating")]
pub mod rating;

#[cfg(feature = "simulation")]
pub mod operation;

#[cfg(feature = "simulation")]
pub mod projection;

#[cfg(feature = "profiles")]
pub mod profile;

pub use error::FidcError;
pub use types::*;

/// Standard result type for all fund operations
pub type FidcResult<T> = Result<T, FidcError>;
