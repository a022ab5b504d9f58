//! Job bookkeeping around edit requests.
//!
//! - `audit`: the `AuditRecorder` capability and the `run_audited` wrapper handlers use.
//! - `sqlite`: the `jobq` journal implementation.
//! - `state`: per-campaign write locks shared across handlers.

pub mod audit;
pub mod sqlite;
pub mod state;
