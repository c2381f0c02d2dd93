//! Status transition errors shared by pilots, drones and missions

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
#[error("{entity} {id} cannot move from {from} to {to}")]
pub struct TransitionError {
    pub entity: &'static str,
    pub id: String,
    pub from: &'static str,
    pub to: &'static str,
}

impl TransitionError {
    pub fn new(entity: &'static str, id: impl ToString, from: &'static str, to: &'static str) -> Self {
        Self {
            entity,
            id: id.to_string(),
            from,
            to,
        }
    }
}
