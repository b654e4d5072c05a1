//! Domain models for the passenger dataset and its derived tables.
//!
//! - [`PassengerRecord`] - one row of the raw dataset
//! - [`PassengerTable`] - the loaded dataset, in source order
//! - [`PassengerClass`], [`Sex`], [`AgeGroup`] - grouping keys
//! - [`SurvivalDemographicsRow`], [`FamilyGroupRow`], [`AgeDivisionRecord`] -
//!   derived table rows
//!
//! Unknown values are `None`. Nothing is ever defaulted to zero.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Passenger Class
// =============================================================================

/// Ticket class, ordered First < Second < Third.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum PassengerClass {
    First,
    Second,
    Third,
}

impl PassengerClass {
    /// Parse from the dataset's numeric code (`"1"`, `"2"`, `"3"`).
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "1" => Some(Self::First),
            "2" => Some(Self::Second),
            "3" => Some(Self::Third),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Self::First => 1,
            Self::Second => 2,
            Self::Third => 3,
        }
    }
}

impl From<PassengerClass> for u8 {
    fn from(class: PassengerClass) -> Self {
        class.as_u8()
    }
}

impl TryFrom<u8> for PassengerClass {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::First),
            2 => Ok(Self::Second),
            3 => Ok(Self::Third),
            other => Err(format!("invalid passenger class {}", other)),
        }
    }
}

impl fmt::Display for PassengerClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

// =============================================================================
// Sex
// =============================================================================

/// Passenger sex. Variant order matches lexicographic order of the labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Female,
    Male,
}

impl Sex {
    /// Parse case-insensitively from `"male"` / `"female"`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "female" => Some(Self::Female),
            "male" => Some(Self::Male),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Female => "female",
            Self::Male => "male",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Age Group
// =============================================================================

/// Life-stage bin derived from age.
///
/// Bins are right-closed: Child `[0, 12]`, Teen `(12, 19]`,
/// Adult `(19, 59]`, Senior `(59, ∞)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgeGroup {
    Child,
    Teen,
    Adult,
    Senior,
}

impl AgeGroup {
    /// Upper bounds (inclusive) of the first three bins.
    const CHILD_MAX: f64 = 12.0;
    const TEEN_MAX: f64 = 19.0;
    const ADULT_MAX: f64 = 59.0;

    /// Bin an age. Returns `None` for negative or non-finite ages.
    pub fn from_age(age: f64) -> Option<Self> {
        if !age.is_finite() || age < 0.0 {
            return None;
        }
        Some(if age <= Self::CHILD_MAX {
            Self::Child
        } else if age <= Self::TEEN_MAX {
            Self::Teen
        } else if age <= Self::ADULT_MAX {
            Self::Adult
        } else {
            Self::Senior
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Child => "Child",
            Self::Teen => "Teen",
            Self::Adult => "Adult",
            Self::Senior => "Senior",
        }
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Passenger Record
// =============================================================================

/// One passenger, as loaded from the data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassengerRecord {
    pub passenger_id: Option<u32>,
    pub passenger_class: PassengerClass,
    pub name: String,
    pub sex: Sex,
    /// Age in years; `None` when unknown.
    pub age: Option<f64>,
    pub siblings_spouses_aboard: Option<u32>,
    pub parents_children_aboard: Option<u32>,
    pub ticket: Option<String>,
    pub fare: Option<f64>,
    pub cabin: Option<String>,
    pub embarked: Option<String>,
    pub survived: bool,
}

impl PassengerRecord {
    /// Siblings/spouses plus parents/children plus the passenger.
    ///
    /// `None` when either family field is unknown or the sum overflows;
    /// otherwise always ≥ 1.
    pub fn family_size(&self) -> Option<u32> {
        self.siblings_spouses_aboard?
            .checked_add(self.parents_children_aboard?)?
            .checked_add(1)
    }

    pub fn age_group(&self) -> Option<AgeGroup> {
        self.age.and_then(AgeGroup::from_age)
    }

    /// Surname: text before the first comma, trimmed.
    ///
    /// Names without a comma yield the whole trimmed name.
    pub fn last_name(&self) -> &str {
        extract_last_name(&self.name)
    }
}

/// Extract the surname from a `"Surname, Given Names"` string.
pub fn extract_last_name(name: &str) -> &str {
    match name.split_once(',') {
        Some((surname, _)) => surname.trim(),
        None => name.trim(),
    }
}

// =============================================================================
// Passenger Table
// =============================================================================

/// The loaded dataset. Row order is source order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PassengerTable {
    records: Vec<PassengerRecord>,
}

impl PassengerTable {
    pub fn new(records: Vec<PassengerRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[PassengerRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PassengerRecord> {
        self.records.iter()
    }

    /// Number of records whose age is known.
    pub fn known_age_count(&self) -> usize {
        self.records.iter().filter(|r| r.age.is_some()).count()
    }
}

impl From<Vec<PassengerRecord>> for PassengerTable {
    fn from(records: Vec<PassengerRecord>) -> Self {
        Self::new(records)
    }
}

impl<'a> IntoIterator for &'a PassengerTable {
    type Item = &'a PassengerRecord;
    type IntoIter = std::slice::Iter<'a, PassengerRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

// =============================================================================
// Derived Rows
// =============================================================================

/// Survival statistics for one (class, sex, age group) partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurvivalDemographicsRow {
    pub passenger_class: PassengerClass,
    pub sex: Sex,
    pub age_group: AgeGroup,
    pub n_passengers: usize,
    pub n_survivors: usize,
    /// `n_survivors / n_passengers`, in `[0, 1]`.
    pub survival_rate: f64,
}

/// Fare statistics for one (family size, class) partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyGroupRow {
    pub family_size: u32,
    pub passenger_class: PassengerClass,
    pub n_passengers: usize,
    pub avg_fare: f64,
    pub min_fare: f64,
    pub max_fare: f64,
}

/// A passenger flagged as older or not than their class median age.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeDivisionRecord {
    #[serde(flatten)]
    pub record: PassengerRecord,
    pub older_passenger: bool,
}
