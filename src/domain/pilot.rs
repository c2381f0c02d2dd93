//! Pilot roster model
//!
//! Pilots carry skills, certifications (optionally expiring) and a home
//! location. Status changes are Store commands validated here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use super::assignment::AssignmentRef;
use super::id::PilotId;
use super::location::Location;
use super::requirements::normalize_term;
use super::transition::TransitionError;
use super::window::{parse_end, TimeWindow, WindowError};

/// Availability of a pilot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PilotStatus {
    #[default]
    Available,
    /// Flying an assigned mission
    #[serde(alias = "assigned")]
    Deployed,
    OnLeave,
    Unavailable,
}

impl PilotStatus {
    pub fn label(&self) -> &'static str {
        match self {
            PilotStatus::Available => "available",
            PilotStatus::Deployed => "deployed",
            PilotStatus::OnLeave => "on_leave",
            PilotStatus::Unavailable => "unavailable",
        }
    }

    /// Returns true if the transition is allowed
    ///
    /// `Available <-> Deployed`, `Available <-> OnLeave <-> Unavailable`
    pub fn can_transition_to(&self, next: PilotStatus) -> bool {
        use PilotStatus::*;
        matches!(
            (self, next),
            (Available, Deployed)
                | (Deployed, Available)
                | (Available, OnLeave)
                | (OnLeave, Available)
                | (OnLeave, Unavailable)
                | (Unavailable, OnLeave)
        )
    }

    /// Returns true if the pilot can be considered for any work at all
    pub fn is_on_duty(&self) -> bool {
        matches!(self, PilotStatus::Available | PilotStatus::Deployed)
    }
}

impl fmt::Display for PilotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for PilotStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_term(s).as_str() {
            "available" => Ok(PilotStatus::Available),
            "deployed" | "assigned" => Ok(PilotStatus::Deployed),
            "on leave" | "onleave" => Ok(PilotStatus::OnLeave),
            "unavailable" => Ok(PilotStatus::Unavailable),
            _ => Err(format!(
                "unknown pilot status '{}' (available, deployed, on_leave, unavailable)",
                s
            )),
        }
    }
}

/// A named certification, optionally expiring
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Certification {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Certification {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expires_at: None,
        }
    }

    pub fn expiring(name: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            expires_at: Some(expires_at),
        }
    }

    /// Returns true if the certification stays valid for the whole window
    pub fn covers(&self, window: &TimeWindow) -> bool {
        self.expires_at.map(|exp| exp >= window.end()).unwrap_or(true)
    }
}

/// Parses `name` or `name@date`
impl FromStr for Certification {
    type Err = WindowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('@') {
            Some((name, expiry)) => Ok(Self::expiring(name.trim(), parse_end(expiry)?)),
            None => Ok(Self::new(s.trim())),
        }
    }
}

impl fmt::Display for Certification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.expires_at {
            Some(exp) => write!(f, "{} (until {})", self.name, exp.format("%Y-%m-%d")),
            None => f.write_str(&self.name),
        }
    }
}

/// Outcome of checking one certification requirement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CertificationCheck {
    Valid,
    Missing,
    Expired(DateTime<Utc>),
}

/// A pilot in the roster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pilot {
    pub id: PilotId,

    pub name: String,

    #[serde(default)]
    pub skills: BTreeSet<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub certifications: Vec<Certification>,

    pub location: Location,

    #[serde(default)]
    pub status: PilotStatus,

    /// Earliest instant the pilot can start a mission
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_from: Option<DateTime<Utc>>,

    /// Missions this pilot is assigned to (rebuilt from missions on save)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assignments: Vec<AssignmentRef>,
}

impl Pilot {
    pub fn new(id: PilotId, name: impl Into<String>, location: Location) -> Self {
        Self {
            id,
            name: name.into(),
            skills: BTreeSet::new(),
            certifications: Vec::new(),
            location,
            status: PilotStatus::Available,
            available_from: None,
            assignments: Vec::new(),
        }
    }

    pub fn with_skill(mut self, skill: impl Into<String>) -> Self {
        self.skills.insert(skill.into());
        self
    }

    pub fn with_certification(mut self, cert: Certification) -> Self {
        self.certifications.push(cert);
        self
    }

    pub fn with_status(mut self, status: PilotStatus) -> Self {
        self.status = status;
        self
    }

    /// Checks a required certification against the mission window
    pub fn check_certification(&self, required: &str, window: &TimeWindow) -> CertificationCheck {
        let required = normalize_term(required);
        let mut expired = None;

        for cert in self
            .certifications
            .iter()
            .filter(|c| normalize_term(&c.name) == required)
        {
            if cert.covers(window) {
                return CertificationCheck::Valid;
            }
            expired = cert.expires_at;
        }

        match expired {
            Some(at) => CertificationCheck::Expired(at),
            None => CertificationCheck::Missing,
        }
    }

    /// Returns true if the pilot can start at the window's start
    pub fn available_by(&self, window: &TimeWindow) -> bool {
        self.available_from
            .map(|from| from <= window.start())
            .unwrap_or(true)
    }

    /// Changes status, rejecting transitions outside the state machine
    pub fn set_status(&mut self, next: PilotStatus) -> Result<(), TransitionError> {
        if self.status == next {
            return Ok(());
        }
        if !self.status.can_transition_to(next) {
            return Err(TransitionError::new(
                "Pilot",
                self.id,
                self.status.label(),
                next.label(),
            ));
        }
        self.status = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn window() -> TimeWindow {
        TimeWindow::new(
            Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 3, 4, 0, 0, 0).unwrap(),
        )
        .unwrap()
    }

    fn pilot() -> Pilot {
        Pilot::new(PilotId::new(1), "Arjun", Location::named("Bangalore"))
    }

    #[test]
    fn status_transitions_follow_state_machine() {
        let mut p = pilot();
        p.set_status(PilotStatus::Deployed).unwrap();
        assert!(p.set_status(PilotStatus::OnLeave).is_err());

        p.set_status(PilotStatus::Available).unwrap();
        p.set_status(PilotStatus::OnLeave).unwrap();
        p.set_status(PilotStatus::Unavailable).unwrap();
        assert!(p.set_status(PilotStatus::Available).is_err());
        assert_eq!(p.status, PilotStatus::Unavailable);
    }

    #[test]
    fn same_status_is_a_no_op() {
        let mut p = pilot().with_status(PilotStatus::Unavailable);
        assert!(p.set_status(PilotStatus::Unavailable).is_ok());
    }

    #[test]
    fn certification_expiry_is_checked_against_window_end() {
        let mid = Utc.with_ymd_and_hms(2026, 3, 3, 0, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();

        let p = pilot()
            .with_certification(Certification::expiring("DGCA", mid))
            .with_certification(Certification::new("Night Ops"));

        assert_eq!(p.check_certification("dgca", &window()), CertificationCheck::Expired(mid));
        assert_eq!(p.check_certification("night-ops", &window()), CertificationCheck::Valid);
        assert_eq!(p.check_certification("BVLOS", &window()), CertificationCheck::Missing);

        let renewed = p.with_certification(Certification::expiring("DGCA", late));
        assert_eq!(renewed.check_certification("DGCA", &window()), CertificationCheck::Valid);
    }

    #[test]
    fn parse_certification() {
        let plain: Certification = "DGCA".parse().unwrap();
        assert!(plain.expires_at.is_none());

        let dated: Certification = "DGCA@2026-12-31".parse().unwrap();
        assert_eq!(
            dated.expires_at,
            Some(Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap())
        );

        assert!("DGCA@soon".parse::<Certification>().is_err());
    }

    #[test]
    fn parse_status_accepts_sheet_labels() {
        assert_eq!("On Leave".parse::<PilotStatus>(), Ok(PilotStatus::OnLeave));
        assert_eq!("Assigned".parse::<PilotStatus>(), Ok(PilotStatus::Deployed));
        assert!("retired".parse::<PilotStatus>().is_err());
    }

    #[test]
    fn available_from_gates_start() {
        let mut p = pilot();
        assert!(p.available_by(&window()));

        p.available_from = Some(Utc.with_ymd_and_hms(2026, 3, 5, 0, 0, 0).unwrap());
        assert!(!p.available_by(&window()));
    }
}
