use std::path::PathBuf;

use thiserror::Error;

/// Data-integrity failures raised while reading simulation state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("unknown aircraft '{0}'")]
    UnknownAircraft(String),
    #[error("unknown aircraft type '{0}'")]
    UnknownAircraftType(String),
    #[error("unknown airport '{0}'")]
    UnknownAirport(String),
    #[error("no route {0}")]
    UnknownRoute(String),
    #[error("aircraft '{aircraft}' has no leg at index {index}")]
    UnknownLeg { aircraft: String, index: usize },
    #[error("corrupt state for '{entity}': {detail}")]
    Corrupt { entity: String, detail: String },
}

impl SimError {
    pub fn corrupt(entity: impl Into<String>, detail: impl Into<String>) -> Self {
        SimError::Corrupt {
            entity: entity.into(),
            detail: detail.into(),
        }
    }
}

/// Reasons a user command is rejected. State is unchanged whenever one of
/// these is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("schedules are locked for the week")]
    SchedulesLocked,
    #[error("schedules can only be locked on day 1 of the cycle (today is day {day})")]
    LockOutsidePlanningDay { day: u32 },
    #[error("not enough cash: need {needed:.0}, have {available:.0}")]
    InsufficientCash { needed: f64, available: f64 },
    #[error("aircraft '{0}' must be landed")]
    NotLanded(String),
    #[error("leg must depart from {expected}, not {actual}")]
    DisconnectedLeg { expected: String, actual: String },
    #[error("leg would arrive at {arrival:.2}h, past the {horizon}h schedule horizon")]
    PastHorizon { arrival: f64, horizon: f64 },
    #[error("{distance:.0} nm exceeds the aircraft range of {range:.0} nm")]
    OutOfRange { distance: f64, range: f64 },
    #[error("aircraft '{0}' has no scheduled legs")]
    EmptySchedule(String),
    #[error("aircraft is already scheduled to return to {0}")]
    AlreadyHome(String),
    #[error("no direct route from {origin} to {destination}")]
    NoDirectRoute { origin: String, destination: String },
    #[error("fare multiplier {0:.2} is outside 0.80-1.20")]
    FareOutOfRange(f64),
    #[error("upgrade {0} is already installed")]
    UpgradeInstalled(&'static str),
    #[error("a marketing campaign is already running on {0}")]
    CampaignActive(String),
    #[error("unknown staff member '{0}'")]
    UnknownStaff(String),
    #[error("'{target}' is not a valid posting for {staff}")]
    InvalidPosting { staff: String, target: String },
    #[error(transparent)]
    NoSchedule(#[from] PlanError),
    #[error(transparent)]
    Data(#[from] SimError),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    #[error("no profitable round trip from {home} for aircraft '{aircraft}'")]
    NoRoundTrip { aircraft: String, home: String },
    #[error(transparent)]
    Data(#[from] SimError),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("simulation halted: {0}")]
    Halted(String),
    #[error("snapshot io error at {path}: {source}")]
    Snapshot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("snapshot encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}
