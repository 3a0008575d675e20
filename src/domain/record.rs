//! Result record data model
//!
//! One `ResultRecord` is one unit of clinical result data to deliver. The
//! JSON shape is lenient by design: every field defaults when absent, since
//! upstream feeds routinely omit optional data. Whether a record is usable
//! is decided at build time, not at parse time.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::emr::EmrKind;

/// Coding system of an observation identifier
///
/// Unknown or absent systems map to the generic local code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CodingSystem {
    Loinc,
    SnomedCt,
    Icd10Am,
    #[default]
    #[serde(other)]
    Local,
}

impl CodingSystem {
    /// Wire code emitted in coded observation fields
    pub fn hl7_code(&self) -> &'static str {
        match self {
            CodingSystem::Loinc => "LN",
            CodingSystem::SnomedCt => "SCT",
            CodingSystem::Icd10Am => "ICD10AM",
            CodingSystem::Local => "L",
        }
    }
}

/// Patient demographics and the record's target EMR
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientInfo {
    pub id: Option<String>,
    pub family_name: Option<String>,
    pub given_name: Option<String>,
    pub dob: Option<NaiveDateTime>,
    pub sex: Option<String>,
    pub address: Option<String>,
    pub target_emr: EmrKind,
}

/// The observation being reported
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ObservationInfo {
    pub identifier: Option<String>,
    pub identifier_text: Option<String>,
    pub coding_system: CodingSystem,
    pub value: Option<String>,
    pub units: Option<String>,
    pub reference_range: Option<String>,
    pub abnormal_flags: Option<String>,
    pub observation_time: Option<NaiveDateTime>,
}

/// Visit context
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VisitInfo {
    pub attending_doctor: Option<String>,
}

/// Clinical trial linkage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClinicalTrialInfo {
    pub study_id: Option<String>,
    pub study_phase_id: Option<String>,
    pub study_phase_text: Option<String>,
}

/// One unit of clinical result data to deliver to an EMR
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResultRecord {
    pub patient: PatientInfo,
    pub observation: ObservationInfo,
    pub visit: VisitInfo,
    pub clinical_trial: ClinicalTrialInfo,
    pub free_text: Option<String>,
    /// Counted in summaries but never written to disk
    pub is_silent: bool,
}

impl ResultRecord {
    /// Identity used for logging and failure reporting
    pub fn identity(&self) -> RecordIdentity {
        RecordIdentity {
            patient_id: self.patient.id.clone().unwrap_or_default(),
            observation_identifier: self.observation.identifier.clone().unwrap_or_default(),
        }
    }

    /// The EMR software this record targets
    pub fn target_emr(&self) -> &EmrKind {
        &self.patient.target_emr
    }
}

/// `(patientId, observationIdentifier)` pair identifying a record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordIdentity {
    pub patient_id: String,
    pub observation_identifier: String,
}

impl fmt::Display for RecordIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.patient_id, self.observation_identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r#"{
            "patient": {
                "id": "8173",
                "familyName": "Citizen",
                "givenName": "Jane",
                "dob": "1962-03-14T00:00:00",
                "sex": "F",
                "address": "10 Example St",
                "targetEmr": "BestPractice"
            },
            "observation": {
                "identifier": "14647-2",
                "identifierText": "Cholesterol",
                "codingSystem": "loinc",
                "value": "6.2",
                "units": "mmol/L",
                "referenceRange": "3.9-5.5",
                "abnormalFlags": "H",
                "observationTime": "2024-05-01T09:30:00"
            },
            "visit": { "attendingDoctor": "Dr John Smith" },
            "clinicalTrial": {
                "studyId": "ST-77",
                "studyPhaseId": "P2",
                "studyPhaseText": "Phase Two"
            },
            "freeText": "Reviewed.",
            "isSilent": false
        }"#
    }

    #[test]
    fn test_deserialize_full_record() {
        let record: ResultRecord = serde_json::from_str(sample_json()).unwrap();
        assert_eq!(record.patient.id.as_deref(), Some("8173"));
        assert_eq!(record.patient.target_emr, EmrKind::BestPractice);
        assert_eq!(record.observation.coding_system, CodingSystem::Loinc);
        assert_eq!(record.observation.units.as_deref(), Some("mmol/L"));
        assert_eq!(record.visit.attending_doctor.as_deref(), Some("Dr John Smith"));
        assert_eq!(record.clinical_trial.study_id.as_deref(), Some("ST-77"));
        assert!(!record.is_silent);
    }

    #[test]
    fn test_deserialize_empty_object() {
        let record: ResultRecord = serde_json::from_str("{}").unwrap();
        assert_eq!(record.patient.id, None);
        assert_eq!(record.observation.coding_system, CodingSystem::Local);
        assert_eq!(*record.target_emr(), EmrKind::Other(String::new()));
        assert!(!record.is_silent);
    }

    #[test]
    fn test_deserialize_partial_sections() {
        let record: ResultRecord = serde_json::from_str(
            r#"{"patient": {"id": "9"}, "isSilent": true}"#,
        )
        .unwrap();
        assert_eq!(record.patient.id.as_deref(), Some("9"));
        assert_eq!(record.patient.family_name, None);
        assert!(record.is_silent);
    }

    #[test]
    fn test_unknown_coding_system_falls_back_to_local() {
        let record: ResultRecord = serde_json::from_str(
            r#"{"observation": {"codingSystem": "readCodes"}}"#,
        )
        .unwrap();
        assert_eq!(record.observation.coding_system, CodingSystem::Local);
    }

    #[test]
    fn test_coding_system_codes() {
        assert_eq!(CodingSystem::Loinc.hl7_code(), "LN");
        assert_eq!(CodingSystem::SnomedCt.hl7_code(), "SCT");
        assert_eq!(CodingSystem::Icd10Am.hl7_code(), "ICD10AM");
        assert_eq!(CodingSystem::Local.hl7_code(), "L");
    }

    #[test]
    fn test_identity_display() {
        let record: ResultRecord = serde_json::from_str(sample_json()).unwrap();
        assert_eq!(record.identity().to_string(), "8173/14647-2");
    }

    #[test]
    fn test_identity_of_empty_record() {
        let record = ResultRecord::default();
        let identity = record.identity();
        assert_eq!(identity.patient_id, "");
        assert_eq!(identity.observation_identifier, "");
    }
}
