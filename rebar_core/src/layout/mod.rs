//! # Beam Reinforcement Layout
//!
//! Given one beam, the reinforcement parameters and the job settings,
//! [`calculate_layout`] produces the longitudinal bar centerlines and stirrup
//! loops in world coordinates (mm), tagged with the beam's identity.
//!
//! The output is geometry only. What it becomes in a host model (real rebar,
//! preview shapes, a drawing) is decided by whatever [`ShapeSink`] consumes
//! the [`ShapeGroup`]s.
//!
//! ## Example
//!
//! ```rust
//! use rebar_core::beam::BeamSpan;
//! use rebar_core::geometry::Point3;
//! use rebar_core::layout::{calculate_layout, GroupLabel};
//! use rebar_core::params::ReinforcementParameters;
//! use rebar_core::settings::LayoutSettings;
//!
//! let beam = BeamSpan::new(
//!     "B-1",
//!     Point3::new(0.0, 0.0, 3000.0),
//!     Point3::new(4000.0, 0.0, 3000.0),
//!     400.0,
//!     600.0,
//! );
//! let layout = calculate_layout(&beam, &ReinforcementParameters::default(), &LayoutSettings::default()).unwrap();
//!
//! assert_eq!(layout.bars.len(), 4);
//! assert_eq!(layout.stirrups.len(), 26);
//!
//! let groups = layout.groups();
//! assert_eq!(groups[0].label, GroupLabel::LongitudinalBars);
//! assert_eq!(groups[1].label, GroupLabel::Stirrups);
//! ```

pub mod longitudinal;
pub mod offsets;
pub mod stirrups;

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::beam::BeamSpan;
use crate::errors::{RebarError, RebarResult};
use crate::frame::LocalFrame;
use crate::geometry::Segment;
use crate::params::ReinforcementParameters;
use crate::settings::LayoutSettings;
use crate::units::LengthUnit;

pub use longitudinal::{generate_bars, BarCenterline, BarRole};
pub use offsets::compute_offsets;
pub use stirrups::{generate_stirrups, stirrup_placement, StirrupLoop, StirrupPlacement};

/// Identity of the beam a shape belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BeamRef {
    pub id: Uuid,
    pub label: String,
}

impl From<&BeamSpan> for BeamRef {
    fn from(span: &BeamSpan) -> Self {
        BeamRef {
            id: span.id,
            label: span.label.clone(),
        }
    }
}

impl fmt::Display for BeamRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label, self.id)
    }
}

/// Something worth telling the user that did not stop the beam's layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "details")]
pub enum LayoutWarning {
    /// No stirrups were generated because the section is too small
    StirrupsSkipped { reason: RebarError },
    /// The beam is too short for any stirrup between the end margins
    NoStirrupLength { usable_length_mm: f64 },
    /// Cover and bar size exceed the section width; bars lie outside it
    NegativeUsableWidth { role: BarRole, usable_width_mm: f64 },
}

impl fmt::Display for LayoutWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutWarning::StirrupsSkipped { reason } => write!(f, "stirrups skipped: {}", reason),
            LayoutWarning::NoStirrupLength { usable_length_mm } => {
                write!(f, "no stirrups fit (usable length {:.1} mm)", usable_length_mm)
            }
            LayoutWarning::NegativeUsableWidth { role, usable_width_mm } => {
                write!(f, "{} bars exceed section width (usable width {:.1} mm)", role, usable_width_mm)
            }
        }
    }
}

/// Complete reinforcement layout for one beam (mm).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamLayout {
    pub beam: BeamRef,
    pub frame: LocalFrame,
    #[serde(default)]
    pub bar_type: Option<String>,
    pub bars: Vec<BarCenterline>,
    pub stirrups: Vec<StirrupLoop>,
    #[serde(default)]
    pub warnings: Vec<LayoutWarning>,
}

/// Output group label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupLabel {
    #[serde(rename = "longitudinal bars")]
    LongitudinalBars,
    #[serde(rename = "stirrups")]
    Stirrups,
}

impl fmt::Display for GroupLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupLabel::LongitudinalBars => f.write_str("longitudinal bars"),
            GroupLabel::Stirrups => f.write_str("stirrups"),
        }
    }
}

/// A labeled list of line segments for one beam, ready for a renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeGroup {
    pub beam: BeamRef,
    pub label: GroupLabel,
    pub segments: Vec<Segment>,
}

impl ShapeGroup {
    /// Copy with segment coordinates expressed in `unit` instead of mm
    pub fn converted(&self, unit: LengthUnit) -> ShapeGroup {
        let scale = 1.0 / unit.mm_factor();
        ShapeGroup {
            beam: self.beam.clone(),
            label: self.label,
            segments: self
                .segments
                .iter()
                .map(|s| Segment::new(s.start * scale, s.end * scale))
                .collect(),
        }
    }
}

impl BeamLayout {
    /// The "longitudinal bars" group, plus a "stirrups" group when any
    /// stirrup was produced.
    pub fn groups(&self) -> Vec<ShapeGroup> {
        let mut groups = vec![ShapeGroup {
            beam: self.beam.clone(),
            label: GroupLabel::LongitudinalBars,
            segments: self.bars.iter().map(|b| b.segment).collect(),
        }];
        if !self.stirrups.is_empty() {
            groups.push(ShapeGroup {
                beam: self.beam.clone(),
                label: GroupLabel::Stirrups,
                segments: self.stirrups.iter().flat_map(|s| s.segments).collect(),
            });
        }
        groups
    }

    /// [`groups`](Self::groups) re-expressed in `unit`
    pub fn groups_in(&self, unit: LengthUnit) -> Vec<ShapeGroup> {
        self.groups().iter().map(|g| g.converted(unit)).collect()
    }

    pub fn stirrups_skipped(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, LayoutWarning::StirrupsSkipped { .. }))
    }
}

/// Consumer of finished shape groups (a host model writer, a preview, a file).
pub trait ShapeSink {
    fn emit(&mut self, group: &ShapeGroup) -> RebarResult<()>;
}

/// Sink that keeps every group in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub groups: Vec<ShapeGroup>,
}

impl ShapeSink for CollectingSink {
    fn emit(&mut self, group: &ShapeGroup) -> RebarResult<()> {
        self.groups.push(group.clone());
        Ok(())
    }
}

/// Hand every group of `layout` to `sink`. Returns the number emitted.
pub fn emit_layout(layout: &BeamLayout, sink: &mut dyn ShapeSink) -> RebarResult<usize> {
    let groups = layout.groups();
    for group in &groups {
        sink.emit(group)?;
    }
    Ok(groups.len())
}

/// Compute the full layout for one beam.
///
/// # Errors
///
/// * `InvalidParameter` - bad parameters, settings or section size
/// * `DegenerateGeometry` - zero-length beam or up-vector parallel to it
///
/// A section too small for stirrups is not an error here: the bars are still
/// produced and the skip is recorded in [`BeamLayout::warnings`].
pub fn calculate_layout(
    span: &BeamSpan,
    params: &ReinforcementParameters,
    settings: &LayoutSettings,
) -> RebarResult<BeamLayout> {
    params.validate()?;
    settings.validate()?;
    span.validate()?;

    let frame = LocalFrame::from_span(span, &settings.up_vector)?;
    let mut warnings = Vec::new();

    let bars = generate_bars(span, &frame, params);
    let usable_width = longitudinal::bar_usable_width(span, params);
    if usable_width < 0.0 {
        for (role, count) in [(BarRole::Top, params.top_count), (BarRole::Bottom, params.bottom_count)] {
            if count >= 2 {
                warnings.push(LayoutWarning::NegativeUsableWidth {
                    role,
                    usable_width_mm: usable_width,
                });
            }
        }
    }

    let stirrups = match generate_stirrups(
        span,
        &frame,
        params,
        settings.end_clearance_mm,
        settings.section_tolerance_mm,
    ) {
        Ok((placement, loops)) => {
            if loops.is_empty() {
                warnings.push(LayoutWarning::NoStirrupLength {
                    usable_length_mm: placement.usable_length_mm,
                });
            }
            loops
        }
        Err(reason @ RebarError::InsufficientSection { .. }) => {
            warn!(beam = %span.label, "{}", reason);
            warnings.push(LayoutWarning::StirrupsSkipped { reason });
            Vec::new()
        }
        Err(other) => return Err(other),
    };

    debug!(
        beam = %span.label,
        bars = bars.len(),
        stirrups = stirrups.len(),
        warnings = warnings.len(),
        "Beam layout computed"
    );

    Ok(BeamLayout {
        beam: BeamRef::from(span),
        frame,
        bar_type: params.bar_type.clone(),
        bars,
        stirrups,
        warnings,
    })
}
