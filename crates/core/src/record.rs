//! The patient record shape.
//!
//! A record is an open, string-keyed mapping of JSON values. The only reserved key is
//! `patient_id`; every other field is stored exactly as the caller supplied it.

use crate::constants::{PATIENT_ID_FIELD, STATUS_FIELD, WARD_FIELD};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field mapping supplied by a caller on registration or update.
pub type Fields = Map<String, Value>;

/// A stored patient record with store-internal fields already removed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatientRecord(Map<String, Value>);

impl PatientRecord {
    pub fn from_fields(fields: Fields) -> Self {
        Self(fields)
    }

    /// The record's public id, if it carries one as a string.
    pub fn patient_id(&self) -> Option<&str> {
        self.0.get(PATIENT_ID_FIELD).and_then(Value::as_str)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn status(&self) -> Option<&Value> {
        self.get(STATUS_FIELD)
    }

    /// The ward value, treating an explicit `null` the same as an absent field.
    pub fn ward(&self) -> Option<&Value> {
        self.get(WARD_FIELD).filter(|v| !v.is_null())
    }

    pub fn fields(&self) -> &Fields {
        &self.0
    }

    pub fn into_fields(self) -> Fields {
        self.0
    }
}

impl From<Fields> for PatientRecord {
    fn from(fields: Fields) -> Self {
        Self(fields)
    }
}
