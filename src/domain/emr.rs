//! Target EMR software kinds
//!
//! Records name the EMR software their message is destined for. Two kinds
//! get dedicated handling (directory lookup, encoding); everything else is
//! carried as [`EmrKind::Other`] so unsupported targets are still grouped
//! and reported rather than dropped at parse time.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Best Practice kind name as it appears on the wire
pub const BEST_PRACTICE: &str = "BestPractice";

/// Medical Director kind name as it appears on the wire
pub const MEDICAL_DIRECTOR: &str = "MedicalDirector";

/// EMR software a record targets
///
/// Kind names are matched exactly; anything unrecognized (including an
/// absent target) becomes `Other` and fails directory resolution with an
/// unsupported-EMR error instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EmrKind {
    BestPractice,
    MedicalDirector,
    Other(String),
}

impl EmrKind {
    /// Parses a kind from its wire name
    pub fn from_name(name: impl Into<String>) -> Self {
        let name = name.into();
        match name.as_str() {
            BEST_PRACTICE => EmrKind::BestPractice,
            MEDICAL_DIRECTOR => EmrKind::MedicalDirector,
            _ => EmrKind::Other(name),
        }
    }

    /// The kind's wire name
    pub fn name(&self) -> &str {
        match self {
            EmrKind::BestPractice => BEST_PRACTICE,
            EmrKind::MedicalDirector => MEDICAL_DIRECTOR,
            EmrKind::Other(name) => name,
        }
    }
}

impl Default for EmrKind {
    fn default() -> Self {
        EmrKind::Other(String::new())
    }
}

impl fmt::Display for EmrKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Serialize for EmrKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for EmrKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(EmrKind::from_name(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_from_name_known_kinds() {
        assert_eq!(EmrKind::from_name("BestPractice"), EmrKind::BestPractice);
        assert_eq!(
            EmrKind::from_name("MedicalDirector"),
            EmrKind::MedicalDirector
        );
    }

    #[test]
    fn test_from_name_unknown_kind() {
        assert_eq!(
            EmrKind::from_name("Genie"),
            EmrKind::Other("Genie".to_string())
        );
    }

    #[test]
    fn test_from_name_is_case_sensitive() {
        assert_eq!(
            EmrKind::from_name("bestpractice"),
            EmrKind::Other("bestpractice".to_string())
        );
    }

    #[test]
    fn test_display_matches_wire_name() {
        assert_eq!(EmrKind::BestPractice.to_string(), "BestPractice");
        assert_eq!(EmrKind::MedicalDirector.to_string(), "MedicalDirector");
        assert_eq!(EmrKind::Other("Genie".to_string()).to_string(), "Genie");
    }

    #[test]
    fn test_default_is_unnamed_other() {
        assert_eq!(EmrKind::default(), EmrKind::Other(String::new()));
    }

    #[test]
    fn test_serde_round_trip() {
        let kind = EmrKind::MedicalDirector;
        let json = serde_json::to_string(&kind).unwrap();
        assert_eq!(json, "\"MedicalDirector\"");
        let back: EmrKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, kind);
    }

    #[test]
    fn test_deserialize_unknown_name() {
        let kind: EmrKind = serde_json::from_str("\"Zedmed\"").unwrap();
        assert_eq!(kind, EmrKind::Other("Zedmed".to_string()));
    }

    #[test]
    fn test_usable_as_map_key() {
        let mut dirs = HashMap::new();
        dirs.insert(EmrKind::BestPractice, "/import/bp");
        dirs.insert(EmrKind::from_name("Genie"), "/import/other");
        assert_eq!(dirs.get(&EmrKind::BestPractice), Some(&"/import/bp"));
        assert_eq!(
            dirs.get(&EmrKind::Other("Genie".to_string())),
            Some(&"/import/other")
        );
    }
}
