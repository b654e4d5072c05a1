//! # Titanic - grouped statistics over the Titanic passenger dataset
//!
//! Loads the passenger CSV and derives the tables behind the survival and
//! family-fare charts.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌──────────────────────┐
//! │  CSV (URL   │────▶│   Loader    │────▶│  Transform (pure)    │
//! │  or file)   │     │  + Parser   │     │  survival / families │
//! └─────────────┘     └─────────────┘     │  last names / ages   │
//!                                         └──────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use titanic::{load_data, survival_demographics};
//!
//! let table = load_data(None)?;
//! for row in survival_demographics(&table) {
//!     println!("{} {} {}: {:.2}", row.passenger_class, row.sex, row.age_group, row.survival_rate);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types
//! - [`config`] - Environment configuration
//! - [`models`] - Passenger records and derived rows
//! - [`parser`] - CSV parsing with auto-detection
//! - [`loader`] - Fetching from a URL or file
//! - [`transform`] - The four derived tables
//! - [`output`] - JSON / CSV / text rendering

// Core modules
pub mod config;
pub mod error;
pub mod models;

// Loading
pub mod loader;
pub mod parser;

// Transformation
pub mod transform;

// Rendering
pub mod output;

// =============================================================================
// Re-exports - Errors & Config
// =============================================================================

pub use config::{Config, DEFAULT_DATA_URL};
pub use error::{AppError, AppResult, ConfigError, DataSourceError, OutputError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    extract_last_name, AgeDivisionRecord, AgeGroup, FamilyGroupRow, PassengerClass,
    PassengerRecord, PassengerTable, Sex, SurvivalDemographicsRow,
};

// =============================================================================
// Re-exports - Loading
// =============================================================================

pub use loader::{load_data, DataSource, Loader};
pub use parser::{parse_bytes_auto, parse_str, ParseResult};

// =============================================================================
// Re-exports - Transform
// =============================================================================

pub use transform::{
    determine_age_division, family_groups, last_names, median_age_by_class,
    survival_demographics, LastNameCount, LastNameCounts,
};

// =============================================================================
// Re-exports - Output
// =============================================================================

pub use output::{OutputFormat, Report};
