//! Fare statistics by family size and passenger class.

use std::collections::BTreeMap;

use tracing::debug;

use crate::models::{FamilyGroupRow, PassengerClass, PassengerTable};

#[derive(Debug)]
struct FareTally {
    count: usize,
    sum: f64,
    min: f64,
    max: f64,
}

impl FareTally {
    fn new(fare: f64) -> Self {
        Self {
            count: 1,
            sum: fare,
            min: fare,
            max: fare,
        }
    }

    fn add(&mut self, fare: f64) {
        self.count += 1;
        self.sum += fare;
        self.min = self.min.min(fare);
        self.max = self.max.max(fare);
    }

    /// Mean fare, kept within `[min, max]` against summation rounding.
    fn mean(&self) -> f64 {
        (self.sum / self.count as f64).clamp(self.min, self.max)
    }
}

/// Count, mean, min and max fare per (family size, class).
///
/// Rows are ordered by class, then family size. Records whose family size
/// or fare is unknown do not contribute.
pub fn family_groups(table: &PassengerTable) -> Vec<FamilyGroupRow> {
    // Keyed (class, size) so iteration order is the output order
    let mut partitions: BTreeMap<(PassengerClass, u32), FareTally> = BTreeMap::new();
    let mut excluded = 0usize;

    for record in table {
        let (Some(family_size), Some(fare)) = (record.family_size(), record.fare) else {
            excluded += 1;
            continue;
        };

        partitions
            .entry((record.passenger_class, family_size))
            .and_modify(|t| t.add(fare))
            .or_insert_with(|| FareTally::new(fare));
    }

    debug!(
        partitions = partitions.len(),
        excluded_unknown = excluded,
        "family groups computed"
    );

    partitions
        .into_iter()
        .map(|((passenger_class, family_size), tally)| FamilyGroupRow {
            family_size,
            passenger_class,
            n_passengers: tally.count,
            avg_fare: tally.mean(),
            min_fare: tally.min,
            max_fare: tally.max,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PassengerRecord, Sex};
    use crate::transform::test_support::{passenger, sample_table};

    fn with_family(class: PassengerClass, sibsp: u32, parch: u32, fare: f64) -> PassengerRecord {
        let mut r = passenger(class, Sex::Male, Some(30.0), false);
        r.siblings_spouses_aboard = Some(sibsp);
        r.parents_children_aboard = Some(parch);
        r.fare = Some(fare);
        r
    }

    #[test]
    fn test_groups_and_stats() {
        let table = PassengerTable::new(vec![
            with_family(PassengerClass::Third, 0, 0, 7.25),
            with_family(PassengerClass::Third, 0, 0, 8.05),
            with_family(PassengerClass::Third, 1, 2, 21.075),
            with_family(PassengerClass::First, 1, 0, 71.2833),
            with_family(PassengerClass::First, 0, 1, 53.1),
        ]);

        let rows = family_groups(&table);
        assert_eq!(rows.len(), 3);

        assert_eq!(rows[0].passenger_class, PassengerClass::First);
        assert_eq!(rows[0].family_size, 2);
        assert_eq!(rows[0].n_passengers, 2);
        assert_eq!(rows[0].min_fare, 53.1);
        assert_eq!(rows[0].max_fare, 71.2833);
        assert!((rows[0].avg_fare - 62.19165).abs() < 1e-9);

        assert_eq!(rows[1].passenger_class, PassengerClass::Third);
        assert_eq!(rows[1].family_size, 1);
        assert_eq!(rows[1].n_passengers, 2);
        assert!((rows[1].avg_fare - 7.65).abs() < 1e-9);

        assert_eq!(rows[2].family_size, 4);
        assert_eq!(rows[2].n_passengers, 1);
        assert_eq!(rows[2].avg_fare, 21.075);
    }

    #[test]
    fn test_sorted_by_class_then_size() {
        let table = PassengerTable::new(vec![
            with_family(PassengerClass::Second, 3, 0, 10.0),
            with_family(PassengerClass::First, 5, 0, 10.0),
            with_family(PassengerClass::Second, 0, 0, 10.0),
            with_family(PassengerClass::First, 0, 0, 10.0),
        ]);

        let keys: Vec<_> = family_groups(&table)
            .iter()
            .map(|r| (r.passenger_class.as_u8(), r.family_size))
            .collect();
        assert_eq!(keys, vec![(1, 1), (1, 6), (2, 1), (2, 4)]);
    }

    #[test]
    fn test_fare_bounds_hold() {
        let mut records = sample_table().records().to_vec();
        // Repeated identical fares must not push the mean past max
        for _ in 0..7 {
            records.push(with_family(PassengerClass::Second, 0, 0, 0.1));
        }
        let table = PassengerTable::new(records);

        for row in family_groups(&table) {
            assert!(row.family_size >= 1);
            assert!(row.min_fare <= row.avg_fare, "{row:?}");
            assert!(row.avg_fare <= row.max_fare, "{row:?}");
        }
    }

    #[test]
    fn test_unknown_family_or_fare_excluded() {
        let mut no_fare = with_family(PassengerClass::Third, 0, 0, 1.0);
        no_fare.fare = None;
        let mut no_parch = with_family(PassengerClass::Third, 0, 0, 1.0);
        no_parch.parents_children_aboard = None;

        let table = PassengerTable::new(vec![
            no_fare,
            no_parch,
            with_family(PassengerClass::Third, 0, 0, 9.5),
        ]);

        let rows = family_groups(&table);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].n_passengers, 1);
        assert_eq!(rows[0].avg_fare, 9.5);
    }

    #[test]
    fn test_idempotent() {
        let table = sample_table();
        assert_eq!(family_groups(&table), family_groups(&table));
    }
}
