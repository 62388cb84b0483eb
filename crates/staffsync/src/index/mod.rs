//! Index maintenance.
//!
//! Builders here compute every store path a mutation must touch so the
//! flat search index and the per-manager / per-employee reverse indices
//! stay consistent with the primary registration, all inside one atomic
//! fan-out write. The sweep repairs reverse-index drift left behind by
//! earlier writers.

pub mod maintainer;
pub mod sweep;

pub use maintainer::{delete_plan, replace_applications_plan, transition_plan, upsert_plan};
pub use sweep::{repair, sweep, SweepReport};
