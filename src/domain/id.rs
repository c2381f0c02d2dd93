//! Identifiers for pilots, drones and missions
//!
//! ID Format:
//! - Pilot IDs: `P{digits}` (e.g., `P001`)
//! - Drone IDs: `D{digits}` (e.g., `D007`)
//! - Mission IDs: `PRJ{digits}` (e.g., `PRJ012`)
//!
//! Numbers are zero-padded to three digits when displayed. Ordering is
//! numeric, so `P999 < P1000`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("Invalid pilot ID format: expected 'P{{digits}}' (e.g. P001), got '{0}'")]
    InvalidPilotId(String),

    #[error("Invalid drone ID format: expected 'D{{digits}}' (e.g. D001), got '{0}'")]
    InvalidDroneId(String),

    #[error("Invalid mission ID format: expected 'PRJ{{digits}}' (e.g. PRJ001), got '{0}'")]
    InvalidMissionId(String),
}

/// Parses `{prefix}{digits}`, case-insensitive on the prefix
fn parse_numbered(s: &str, prefix: &str) -> Option<u32> {
    let s = s.trim();
    if s.len() <= prefix.len() || !s.is_char_boundary(prefix.len()) {
        return None;
    }

    let (head, digits) = s.split_at(prefix.len());
    if !head.eq_ignore_ascii_case(prefix) || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    digits.parse().ok()
}

macro_rules! numbered_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal, $err:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from its number
            pub fn new(number: u32) -> Self {
                Self(number)
            }

            /// Returns the numeric portion of the ID
            pub fn number(&self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(&format!(concat!($prefix, "{:03}"), self.0))
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_numbered(s, $prefix)
                    .map(Self)
                    .ok_or_else(|| IdError::$err(s.trim().to_string()))
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.to_string()
            }
        }
    };
}

numbered_id!(
    /// Pilot ID in the format `P{digits}`
    PilotId,
    "P",
    InvalidPilotId
);

numbered_id!(
    /// Drone ID in the format `D{digits}`
    DroneId,
    "D",
    InvalidDroneId
);

numbered_id!(
    /// Mission ID in the format `PRJ{digits}`
    MissionId,
    "PRJ",
    InvalidMissionId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pilot_id_format_is_correct() {
        assert_eq!(PilotId::new(1).to_string(), "P001");
        assert_eq!(PilotId::new(1234).to_string(), "P1234");
    }

    #[test]
    fn ids_parse_correctly() {
        let pilot: PilotId = "P001".parse().unwrap();
        let drone: DroneId = "d042".parse().unwrap();
        let mission: MissionId = " PRJ007 ".parse().unwrap();

        assert_eq!(pilot.number(), 1);
        assert_eq!(drone.to_string(), "D042");
        assert_eq!(mission, MissionId::new(7));
    }

    #[test]
    fn ids_reject_invalid_format() {
        assert!("001".parse::<PilotId>().is_err());
        assert!("P".parse::<PilotId>().is_err());
        assert!("P-1".parse::<PilotId>().is_err());
        assert!("X001".parse::<DroneId>().is_err());
        assert!("PR001".parse::<MissionId>().is_err());
        assert!("PRJ1a".parse::<MissionId>().is_err());
    }

    #[test]
    fn mission_prefix_does_not_parse_as_pilot() {
        assert_eq!(
            "PRJ001".parse::<PilotId>(),
            Err(IdError::InvalidPilotId("PRJ001".to_string()))
        );
    }

    #[test]
    fn ordering_is_numeric() {
        let small: PilotId = "P999".parse().unwrap();
        let large: PilotId = "P1000".parse().unwrap();
        assert!(small < large);
    }

    #[test]
    fn serde_uses_display_form() {
        let id = MissionId::new(3);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"PRJ003\"");

        let parsed: MissionId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);

        assert!(serde_json::from_str::<MissionId>("\"M3\"").is_err());
    }
}
