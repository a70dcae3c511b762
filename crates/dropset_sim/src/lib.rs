//! dropset_sim: scatter placement and physics settling.
//!
//! `support` derives the sampling region from the surface, `placement`
//! scatters template copies above it, and `physics` hands them to a
//! [`PhysicsBackend`] to settle.  `drop_solver` is a small built-in backend.

pub mod drop_solver;
pub mod error;
pub mod physics;
pub mod placement;
pub mod support;

pub use drop_solver::DropSolver;
pub use error::SimError;
pub use physics::{
    BodyDesc, BodyKind, PhysicsAdapter, PhysicsBackend, PhysicsConfig, SettleReport,
    FIRST_FRAME, SURFACE_BODY,
};
pub use placement::{degrees_to_radians, place, PlacementConfig, PlacementReport};
pub use support::SupportRegion;
