//! # rebar_core - Beam Reinforcement Layout Engine
//!
//! `rebar_core` computes where longitudinal bars and stirrups go inside
//! rectangular concrete beams. It takes beam spans and a reinforcement
//! parameter set and returns bar centerlines and closed stirrup loops in
//! global coordinates, ready for a host application to draw.
//!
//! ## Design Philosophy
//!
//! - **Pure geometry**: layouts are plain data; drawing happens behind [`layout::ShapeSink`]
//! - **Millimetres inside**: host units are converted once, at the job boundary
//! - **JSON-First**: jobs, layouts, reports and errors all serialize
//! - **Per-beam isolation**: one bad beam doesn't sink a batch
//!
//! ## Quick Start
//!
//! ```rust
//! use rebar_core::beam::BeamSpan;
//! use rebar_core::geometry::Point3;
//! use rebar_core::layout::calculate_layout;
//! use rebar_core::params::ReinforcementParameters;
//! use rebar_core::settings::LayoutSettings;
//!
//! let span = BeamSpan::new("B-1", Point3::origin(), Point3::new(4000.0, 0.0, 0.0), 400.0, 600.0);
//! let layout = calculate_layout(&span, &ReinforcementParameters::default(), &LayoutSettings::default()).unwrap();
//!
//! assert_eq!(layout.bars.len(), 4);
//! assert_eq!(layout.stirrups.len(), 26);
//! ```
//!
//! ## Modules
//!
//! - [`layout`] - Bars, stirrups and the shape groups handed to the host
//! - [`frame`] - Beam-local coordinate frame
//! - [`batch`] - Many beams with failure isolation
//! - [`job`] - Job container, scopes and unit conversion
//! - [`file_io`] - Atomic saves and job locking
//! - [`errors`] - Structured error types

pub mod batch;
pub mod beam;
pub mod errors;
pub mod file_io;
pub mod frame;
pub mod geometry;
pub mod job;
pub mod layout;
pub mod params;
pub mod settings;
pub mod units;

pub use batch::{run_batch, run_single, BatchReport, LayoutSummary};
pub use beam::BeamSpan;
pub use errors::{RebarError, RebarResult};
pub use file_io::{load_job, save_job, save_report, FileLock};
pub use job::{HostBeam, LayoutJob, Scope};
pub use layout::{calculate_layout, BeamLayout};
pub use params::ReinforcementParameters;
pub use settings::LayoutSettings;
