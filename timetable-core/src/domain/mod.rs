//! Domain types for the timetable assembly engine.
//!
//! This module contains the core domain model types that represent
//! validated rail data. All types enforce their invariants at construction
//! time, so code that receives these types can trust their validity.

mod headcode;
mod operator;
mod pattern;
mod run_id;
mod station;
mod stop;
mod time;

pub use headcode::Headcode;
pub use operator::{AtocCode, InvalidAtocCode};
pub use pattern::{CallPattern, Endpoint};
pub use run_id::{InvalidRunId, RunId};
pub use station::{Crs, InvalidCrs, Station};
pub use stop::{CallType, Stop};
pub use time::{
    DAY_MINUTES, RailTime, ROLLOVER_THRESHOLD_MINUTES, RolloverTracker, TimeError,
};
