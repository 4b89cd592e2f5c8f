//! # Batch Processing
//!
//! Runs [`calculate_layout`] over many beams. Parameters and settings are
//! checked once up front; after that every beam is independent, so beam
//! failures are isolated according to the [`FailurePolicy`].
//!
//! Beams are computed in parallel. The report lists layouts in input order.
//!
//! ## Example
//!
//! ```rust
//! use rebar_core::batch::run_batch;
//! use rebar_core::beam::BeamSpan;
//! use rebar_core::geometry::Point3;
//! use rebar_core::params::ReinforcementParameters;
//! use rebar_core::settings::LayoutSettings;
//!
//! let beams = vec![
//!     BeamSpan::new("B-1", Point3::origin(), Point3::new(4000.0, 0.0, 0.0), 400.0, 600.0),
//!     // vertical member: no frame with a Z-up vector
//!     BeamSpan::new("C-1", Point3::origin(), Point3::new(0.0, 0.0, 3000.0), 400.0, 400.0),
//! ];
//!
//! let report = run_batch(&beams, &ReinforcementParameters::default(), &LayoutSettings::default()).unwrap();
//! assert_eq!(report.summary.beams_processed, 1);
//! assert_eq!(report.summary.beams_failed, 1);
//! println!("{}", report.summary);
//! ```

use std::fmt;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::beam::BeamSpan;
use crate::errors::{RebarError, RebarResult};
use crate::layout::{calculate_layout, BeamLayout, BeamRef};
use crate::params::ReinforcementParameters;
use crate::settings::{FailurePolicy, LayoutMode, LayoutSettings};

/// A beam that could not be laid out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamFailure {
    pub beam: BeamRef,
    pub error: RebarError,
}

/// Counts for the human-readable report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutSummary {
    pub mode: LayoutMode,
    pub beams_processed: usize,
    pub beams_failed: usize,
    pub bars: usize,
    pub stirrups: usize,
    pub stirrups_skipped: usize,
    /// Number of shape groups handed to the renderer
    pub shapes_created: usize,
}

impl LayoutSummary {
    fn from_results(mode: LayoutMode, layouts: &[BeamLayout], failures: &[BeamFailure]) -> Self {
        LayoutSummary {
            mode,
            beams_processed: layouts.len(),
            beams_failed: failures.len(),
            bars: layouts.iter().map(|l| l.bars.len()).sum(),
            stirrups: layouts.iter().map(|l| l.stirrups.len()).sum(),
            stirrups_skipped: layouts.iter().filter(|l| l.stirrups_skipped()).count(),
            shapes_created: layouts.iter().map(|l| l.groups().len()).sum(),
        }
    }
}

impl fmt::Display for LayoutSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self.mode {
            LayoutMode::Preview => "previewed",
            LayoutMode::Apply => "created",
        };
        write!(
            f,
            "Processed {} beam(s): {} shape(s) {} ({} bars, {} stirrups)",
            self.beams_processed, self.shapes_created, verb, self.bars, self.stirrups
        )?;
        if self.stirrups_skipped > 0 {
            write!(f, "; stirrups skipped on {} beam(s)", self.stirrups_skipped)?;
        }
        if self.beams_failed > 0 {
            write!(f, "; {} beam(s) failed", self.beams_failed)?;
        }
        Ok(())
    }
}

/// Everything a batch produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub layouts: Vec<BeamLayout>,
    pub failures: Vec<BeamFailure>,
    pub summary: LayoutSummary,
}

/// Lay out every beam in `beams`.
///
/// # Errors
///
/// * `InvalidParameter` - parameters or settings rejected before any beam runs
/// * any beam error, when `settings.failure_policy` is `AllOrNothing`
pub fn run_batch(
    beams: &[BeamSpan],
    params: &ReinforcementParameters,
    settings: &LayoutSettings,
) -> RebarResult<BatchReport> {
    params.validate()?;
    settings.validate()?;

    let results: Vec<(BeamRef, RebarResult<BeamLayout>)> = beams
        .par_iter()
        .map(|span| (BeamRef::from(span), calculate_layout(span, params, settings)))
        .collect();

    let mut layouts = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for (beam, result) in results {
        match result {
            Ok(layout) => layouts.push(layout),
            Err(error) => {
                if settings.failure_policy == FailurePolicy::AllOrNothing {
                    return Err(error);
                }
                warn!(beam = %beam.label, code = error.error_code(), "Beam skipped: {}", error);
                failures.push(BeamFailure { beam, error });
            }
        }
    }

    let summary = LayoutSummary::from_results(settings.mode, &layouts, &failures);
    info!("{}", summary);

    Ok(BatchReport {
        layouts,
        failures,
        summary,
    })
}

/// Lay out a single beam; any failure is returned to the caller.
pub fn run_single(
    beam: &BeamSpan,
    params: &ReinforcementParameters,
    settings: &LayoutSettings,
) -> RebarResult<BatchReport> {
    let layout = calculate_layout(beam, params, settings)?;
    let layouts = vec![layout];
    let summary = LayoutSummary::from_results(settings.mode, &layouts, &[]);
    info!("{}", summary);
    Ok(BatchReport {
        layouts,
        failures: Vec::new(),
        summary,
    })
}
