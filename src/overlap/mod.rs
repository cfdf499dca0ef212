//! Overlap module: who exchanges what with whom.
//!
//! - [`schedule`]: per-neighbor send/receive lists in global ids.
//! - [`external_map`]: the finalized numbering of remote columns.
//! - [`halo_plan`]: the local-index plan handed to the exchange routine.

pub mod external_map;
pub mod halo_plan;
pub mod schedule;

pub use external_map::ExternalIndexMap;
pub use halo_plan::{HaloPlan, NeighborLink};
pub use schedule::CommSchedule;
