//! Flag passengers older than the median age of their class.
//!
//! Passengers with unknown age are never flagged as older.

use std::collections::HashMap;

use tracing::debug;

use crate::models::{AgeDivisionRecord, PassengerClass, PassengerTable};

/// Median of `values`; average of the two middle values for even lengths.
///
/// Returns `None` for an empty slice.
pub fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    Some(if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    })
}

/// Median known age for each class that has at least one known age.
pub fn median_age_by_class(table: &PassengerTable) -> HashMap<PassengerClass, f64> {
    let mut ages: HashMap<PassengerClass, Vec<f64>> = HashMap::new();
    for record in table {
        if let Some(age) = record.age {
            ages.entry(record.passenger_class).or_default().push(age);
        }
    }

    ages.into_iter()
        .filter_map(|(class, mut values)| median(&mut values).map(|m| (class, m)))
        .collect()
}

/// Copy every record, adding `older_passenger`.
///
/// `older_passenger` is true iff the age is known and strictly greater than
/// the class median. Output order matches input order.
pub fn determine_age_division(table: &PassengerTable) -> Vec<AgeDivisionRecord> {
    let medians = median_age_by_class(table);
    debug!(medians = ?medians, "class median ages computed");

    table
        .iter()
        .map(|record| {
            let median = medians.get(&record.passenger_class).copied();
            let older_passenger = matches!(
                (record.age, median),
                (Some(age), Some(median)) if age > median
            );
            AgeDivisionRecord {
                record: record.clone(),
                older_passenger,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sex;
    use crate::transform::test_support::{passenger, sample_table};

    #[test]
    fn test_median() {
        assert_eq!(median(&mut []), None);
        assert_eq!(median(&mut [5.0]), Some(5.0));
        assert_eq!(median(&mut [40.0, 10.0, 30.0]), Some(30.0));
        assert_eq!(median(&mut [40.0, 10.0, 30.0, 20.0]), Some(25.0));
    }

    #[test]
    fn test_flags_by_class_median() {
        let table = PassengerTable::new(vec![
            passenger(PassengerClass::First, Sex::Male, Some(20.0), true),
            passenger(PassengerClass::First, Sex::Male, Some(40.0), true),
            passenger(PassengerClass::First, Sex::Female, Some(60.0), true),
            passenger(PassengerClass::Third, Sex::Female, Some(10.0), false),
            passenger(PassengerClass::Third, Sex::Female, Some(30.0), false),
            passenger(PassengerClass::Third, Sex::Male, None, false),
        ]);

        let medians = median_age_by_class(&table);
        assert_eq!(medians[&PassengerClass::First], 40.0);
        assert_eq!(medians[&PassengerClass::Third], 20.0);
        assert!(!medians.contains_key(&PassengerClass::Second));

        let flags: Vec<bool> = determine_age_division(&table)
            .iter()
            .map(|r| r.older_passenger)
            .collect();
        // Equal to the median is not older
        assert_eq!(flags, vec![false, false, true, false, true, false]);
    }

    #[test]
    fn test_unknown_age_is_false() {
        let table = PassengerTable::new(vec![
            passenger(PassengerClass::Second, Sex::Male, None, false),
            passenger(PassengerClass::Second, Sex::Male, None, true),
        ]);
        assert!(median_age_by_class(&table).is_empty());
        assert!(determine_age_division(&table).iter().all(|r| !r.older_passenger));
    }

    #[test]
    fn test_preserves_records_and_order() {
        let table = sample_table();
        let divided = determine_age_division(&table);

        assert_eq!(divided.len(), table.len());
        for (out, input) in divided.iter().zip(table.iter()) {
            assert_eq!(&out.record, input);
            if input.age.is_none() {
                assert!(!out.older_passenger);
            }
        }
        assert_eq!(divided, determine_age_division(&table));
    }
}
