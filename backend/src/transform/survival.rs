//! Survival rate by passenger class, sex, and age group.
//!
//! ```text
//! records                           rows (sorted by key)
//! ┌──────────────────────────┐      ┌──────────────────────────────────┐
//! │ 1, male, 30, survived    │      │ 1, male, Adult   n=2 s=1 r=0.50  │
//! │ 1, male, 40, died        │  →   │ 3, female, Child n=1 s=1 r=1.00  │
//! │ 3, female, 8, survived   │      └──────────────────────────────────┘
//! │ 3, female, ?, died       │  (unknown age: excluded)
//! └──────────────────────────┘
//! ```

use std::collections::BTreeMap;

use tracing::debug;

use crate::models::{AgeGroup, PassengerClass, PassengerTable, Sex, SurvivalDemographicsRow};

type PartitionKey = (PassengerClass, Sex, AgeGroup);

#[derive(Debug, Default)]
struct SurvivalTally {
    passengers: usize,
    survivors: usize,
}

/// Count passengers and survivors per (class, sex, age group).
///
/// Records with unknown age are skipped. Only non-empty partitions are
/// emitted, ordered by class, then sex, then age group.
pub fn survival_demographics(table: &PassengerTable) -> Vec<SurvivalDemographicsRow> {
    let mut partitions: BTreeMap<PartitionKey, SurvivalTally> = BTreeMap::new();
    let mut excluded = 0usize;

    for record in table {
        let Some(age_group) = record.age_group() else {
            excluded += 1;
            continue;
        };

        let tally = partitions
            .entry((record.passenger_class, record.sex, age_group))
            .or_default();
        tally.passengers += 1;
        if record.survived {
            tally.survivors += 1;
        }
    }

    debug!(
        partitions = partitions.len(),
        excluded_unknown_age = excluded,
        "survival demographics computed"
    );

    partitions
        .into_iter()
        .map(|((passenger_class, sex, age_group), tally)| SurvivalDemographicsRow {
            passenger_class,
            sex,
            age_group,
            n_passengers: tally.passengers,
            n_survivors: tally.survivors,
            survival_rate: tally.survivors as f64 / tally.passengers as f64,
        })
        .collect()
}
