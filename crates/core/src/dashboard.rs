//! Dashboard aggregation.
//!
//! Folds the full record set into headline counts for the dashboard page. The set is read
//! fresh on every call.

use crate::constants::{INPATIENT_STATUS, OUTPATIENT_STATUS, UNASSIGNED_WARD};
use crate::error::PatientResult;
use crate::patient::PatientService;
use crate::record::PatientRecord;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

/// Per-ward patient counts, in order of each ward's first appearance.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WardCounts(Vec<(String, usize)>);

impl WardCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, ward: &str) {
        match self.0.iter_mut().find(|(label, _)| label == ward) {
            Some((_, count)) => *count += 1,
            None => self.0.push((ward.to_string(), 1)),
        }
    }

    pub fn get(&self, ward: &str) -> Option<usize> {
        self.0
            .iter()
            .find(|(label, _)| label == ward)
            .map(|(_, count)| *count)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().map(|(label, count)| (label.as_str(), *count))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for WardCounts {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, count) in &self.0 {
            map.serialize_entry(label, count)?;
        }
        map.end()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct DashboardSummary {
    pub total: usize,
    pub inpatients: usize,
    pub outpatients: usize,
    pub ward_counts: WardCounts,
}

impl DashboardSummary {
    /// Computes the summary over an already-fetched record set.
    ///
    /// Statuses are compared against the exact strings `"inpatient"` and `"outpatient"`;
    /// any other value, or none, counts towards the total only.
    pub fn from_records(records: &[PatientRecord]) -> Self {
        let mut summary = Self {
            total: records.len(),
            ..Self::default()
        };

        for record in records {
            match record.status().and_then(Value::as_str) {
                Some(INPATIENT_STATUS) => summary.inpatients += 1,
                Some(OUTPATIENT_STATUS) => summary.outpatients += 1,
                _ => {}
            }
            summary.ward_counts.increment(&ward_label(record));
        }

        summary
    }
}

/// Label a record is counted under. Non-string ward values use their JSON text.
fn ward_label(record: &PatientRecord) -> String {
    match record.ward() {
        None => UNASSIGNED_WARD.to_string(),
        Some(Value::String(ward)) => ward.clone(),
        Some(other) => other.to_string(),
    }
}

#[derive(Clone)]
pub struct DashboardService {
    patients: PatientService,
}

impl DashboardService {
    pub fn new(patients: PatientService) -> Self {
        Self { patients }
    }

    /// Reads every record and summarises it.
    ///
    /// # Errors
    ///
    /// Returns [`PatientError::StorageUnavailable`](crate::PatientError::StorageUnavailable)
    /// if the record set cannot be read. The read is not retried.
    pub fn summarize(&self) -> PatientResult<DashboardSummary> {
        let records = self.patients.list_all()?;
        Ok(DashboardSummary::from_records(&records))
    }
}
