use crate::models::availability::AvailabilityRule;
use crate::models::session::Session;
use crate::models::tutor::Tutor;
use serde::{Deserialize, Serialize};

/// Seed data for an in-memory store, as read by the `schedule` binary.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Fixture {
    #[serde(default)]
    pub tutors: Vec<Tutor>,
    #[serde(default)]
    pub rules: Vec<AvailabilityRule>,
    #[serde(default)]
    pub sessions: Vec<Session>,
}
