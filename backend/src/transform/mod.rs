//! Transformations over a loaded [`PassengerTable`](crate::models::PassengerTable).
//!
//! Each function is pure and independent of the others:
//! - Survival: survival rate by class, sex, and age group
//! - Families: fare statistics by family size and class
//! - Last names: surname frequency
//! - Age division: older-than-class-median flag

pub mod age_division;
pub mod families;
pub mod last_names;
pub mod survival;

pub use age_division::{determine_age_division, median_age_by_class};
pub use families::family_groups;
pub use last_names::{last_names, LastNameCount, LastNameCounts};
pub use survival::survival_demographics;
