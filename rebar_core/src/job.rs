//! # Layout Jobs
//!
//! A `LayoutJob` is the root container stored in `.rbj` (rebar job) files as
//! readable JSON: metadata, settings, one parameter set and the beams it
//! applies to.
//!
//! ## Structure
//!
//! ```text
//! LayoutJob
//! ├── meta: JobMetadata (version, author, job id, timestamps)
//! ├── settings: LayoutSettings (units, up vector, policy, mode)
//! ├── parameters: ReinforcementParameters (in settings.parameter_unit)
//! └── beams: Vec<HostBeam> (in settings.geometry_unit)
//! ```
//!
//! Values in the file are in the host's units. [`LayoutJob::prepare`]
//! converts them into millimetres once, before anything is computed.
//!
//! ## Example
//!
//! ```rust
//! use rebar_core::job::{HostBeam, LayoutJob, Scope};
//! use rebar_core::geometry::Point3;
//! use rebar_core::units::LengthUnit;
//!
//! let mut job = LayoutJob::new("Site Engineer", "26-014");
//! job.settings.geometry_unit = LengthUnit::Feet;
//! job.add_beam(HostBeam::new("B-1", Point3::origin(), Point3::new(13.0, 0.0, 0.0), 1.3, 2.0));
//!
//! let report = job.run(&Scope::All).unwrap();
//! assert_eq!(report.summary.beams_processed, 1);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::batch::{run_batch, run_single, BatchReport};
use crate::beam::BeamSpan;
use crate::errors::{RebarError, RebarResult};
use crate::geometry::Point3;
use crate::params::ReinforcementParameters;
use crate::settings::LayoutSettings;
use crate::units::LengthUnit;

/// Current schema version for .rbj files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// A beam as exported by the host, in the job's geometry unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostBeam {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub label: String,
    #[serde(default)]
    pub type_name: Option<String>,
    pub start: Point3,
    pub end: Point3,
    pub width: f64,
    pub depth: f64,
}

impl HostBeam {
    pub fn new(label: impl Into<String>, start: Point3, end: Point3, width: f64, depth: f64) -> Self {
        HostBeam {
            id: Uuid::new_v4(),
            label: label.into(),
            type_name: None,
            start,
            end,
            width,
            depth,
        }
    }

    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    /// Convert into a millimetre span.
    pub fn to_span(&self, unit: LengthUnit) -> BeamSpan {
        let factor = unit.mm_factor();
        BeamSpan {
            id: self.id,
            label: self.label.clone(),
            type_name: self.type_name.clone(),
            start: self.start * factor,
            end: self.end * factor,
            width_mm: self.width * factor,
            depth_mm: self.depth * factor,
        }
    }
}

/// Which beams of a job to process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scope {
    /// One beam; any failure aborts
    Single(Uuid),
    /// Every beam of the given host type
    ByType(String),
    /// Every beam in the job
    All,
}

/// Job metadata stored in the file header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,

    /// Who prepared the job
    pub author: String,

    /// Job/project number
    pub job_id: String,

    pub created: DateTime<Utc>,

    pub modified: DateTime<Utc>,
}

/// Root job container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutJob {
    pub meta: JobMetadata,

    #[serde(default)]
    pub settings: LayoutSettings,

    /// Lengths are in `settings.parameter_unit` until [`prepare`](Self::prepare)
    pub parameters: ReinforcementParameters,

    #[serde(default)]
    pub beams: Vec<HostBeam>,
}

impl LayoutJob {
    /// Create an empty job with default settings and parameters.
    pub fn new(author: impl Into<String>, job_id: impl Into<String>) -> Self {
        let now = Utc::now();
        LayoutJob {
            meta: JobMetadata {
                version: SCHEMA_VERSION.to_string(),
                author: author.into(),
                job_id: job_id.into(),
                created: now,
                modified: now,
            },
            settings: LayoutSettings::default(),
            parameters: ReinforcementParameters::default(),
            beams: Vec::new(),
        }
    }

    /// Add a beam; returns its id.
    pub fn add_beam(&mut self, beam: HostBeam) -> Uuid {
        let id = beam.id;
        self.beams.push(beam);
        self.touch();
        id
    }

    /// Remove a beam by id.
    pub fn remove_beam(&mut self, id: &Uuid) -> Option<HostBeam> {
        let index = self.beams.iter().position(|b| &b.id == id)?;
        self.touch();
        Some(self.beams.remove(index))
    }

    pub fn get_beam(&self, id: &Uuid) -> Option<&HostBeam> {
        self.beams.iter().find(|b| &b.id == id)
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    pub fn beam_count(&self) -> usize {
        self.beams.len()
    }

    /// Beams matching `scope`, in job order.
    pub fn select(&self, scope: &Scope) -> RebarResult<Vec<&HostBeam>> {
        match scope {
            Scope::Single(id) => self.get_beam(id).map(|b| vec![b]).ok_or_else(|| {
                RebarError::invalid_parameter("scope", id.to_string(), "No beam with this id in the job")
            }),
            Scope::ByType(name) => Ok(self
                .beams
                .iter()
                .filter(|b| b.type_name.as_deref() == Some(name.as_str()))
                .collect()),
            Scope::All => Ok(self.beams.iter().collect()),
        }
    }

    /// Selected beams and the parameters, converted to millimetres.
    pub fn prepare(&self, scope: &Scope) -> RebarResult<(Vec<BeamSpan>, ReinforcementParameters)> {
        let geometry_unit = self.settings.geometry_unit;
        let spans = self
            .select(scope)?
            .into_iter()
            .map(|b| b.to_span(geometry_unit))
            .collect();

        let unit = self.settings.parameter_unit;
        let params = ReinforcementParameters {
            cover_mm: unit.to_mm(self.parameters.cover_mm),
            bar_diameter_mm: unit.to_mm(self.parameters.bar_diameter_mm),
            stirrup_diameter_mm: unit.to_mm(self.parameters.stirrup_diameter_mm),
            stirrup_spacing_mm: unit.to_mm(self.parameters.stirrup_spacing_mm),
            ..self.parameters.clone()
        };
        Ok((spans, params))
    }

    /// Convert, then lay out the selected beams.
    ///
    /// `Scope::Single` returns the beam's error directly; other scopes follow
    /// `settings.failure_policy`.
    pub fn run(&self, scope: &Scope) -> RebarResult<BatchReport> {
        let (spans, params) = self.prepare(scope)?;
        match (scope, spans.as_slice()) {
            (Scope::Single(_), [span]) => run_single(span, &params, &self.settings),
            _ => run_batch(&spans, &params, &self.settings),
        }
    }
}

impl Default for LayoutJob {
    fn default() -> Self {
        LayoutJob::new("", "")
    }
}
