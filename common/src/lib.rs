//! Wire models shared between the campaign editor backend and its clients.
//!
//! - `model`: campaign configuration and template views plus their update requests.
//! - `jobs`: the vocabulary used by the job audit journal.

pub mod jobs;
pub mod model;
