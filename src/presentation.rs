//! Presentation transform: the rotate-then-translate applied to a rendered
//! tile purely so several tiles compose into one shape.
//!
//! The transform lives in tile-local pixel space and rotates about the tile
//! center. As drawn, a projection-space point `p` ends up on screen at
//! `center + R(p + translation - center)`, which is exactly the SVG list
//! `rotate(θ cx cy) translate(dx dy)`.

use glam::{DAffine2, DMat2, DVec2, dvec2};
use miette::SourceSpan;
use pest::Parser;
use pest::iterators::Pair;

use crate::catalog::ProjectionParameters;
use crate::errors::TransformError;
use crate::log::debug;
use crate::types::TileSize;
use crate::{Rule, TransformParser};

/// Tolerance for treating a parsed matrix as a pure rotation
const RIGID_EPSILON: f64 = 1e-9;

/// Rotation (degrees) and translation (pixels, in the rotated frame) about a
/// pivot
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PresentationTransform {
    rotation: f64,
    translation: DVec2,
    center: DVec2,
}

impl Default for PresentationTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl PresentationTransform {
    pub const fn identity() -> Self {
        PresentationTransform {
            rotation: 0.0,
            translation: DVec2::ZERO,
            center: DVec2::ZERO,
        }
    }

    pub fn new(rotation: f64, translation: DVec2, center: DVec2) -> Self {
        PresentationTransform {
            rotation,
            translation,
            center,
        }
    }

    /// The catalog's fixed layout parameters, resolved against a tile size
    pub fn for_kind(params: &ProjectionParameters, size: TileSize) -> Self {
        Self::new(
            params.presentation_rotation,
            params.presentation_translation * size.px(),
            size.center(),
        )
    }

    /// The transform a tile was actually drawn with.
    ///
    /// A non-empty rendered attribute wins over the catalog parameters.
    pub fn resolve(
        params: &ProjectionParameters,
        size: TileSize,
        rendered: Option<&str>,
    ) -> Result<Self, TransformError> {
        let configured = Self::for_kind(params, size);
        match rendered.map(str::trim).filter(|s| !s.is_empty()) {
            None => Ok(configured),
            Some(rendered) => {
                let actual = Self::from_rendered(rendered, size.center())?;
                if !actual.approx_eq(&configured) {
                    debug!(rendered, "rendered transform overrides catalog layout");
                }
                Ok(actual)
            }
        }
    }

    /// Parse an SVG transform list and express it as a rotation about
    /// `center` followed by a translation.
    pub fn from_rendered(rendered: &str, center: DVec2) -> Result<Self, TransformError> {
        let affine = parse_transform(rendered)?;
        Self::from_affine(affine, center).ok_or_else(|| TransformError::NonRigid {
            src: TransformError::source_named(rendered),
            span: (0, rendered.len()).into(),
        })
    }

    /// Decompose a rigid affine map; `None` if it scales, skews or reflects
    pub fn from_affine(affine: DAffine2, center: DVec2) -> Option<Self> {
        let m = affine.matrix2;
        let orthonormal = (m.x_axis.length() - 1.0).abs() < RIGID_EPSILON
            && (m.y_axis.length() - 1.0).abs() < RIGID_EPSILON
            && m.x_axis.dot(m.y_axis).abs() < RIGID_EPSILON;
        if !orthonormal || (m.determinant() - 1.0).abs() > RIGID_EPSILON {
            return None;
        }
        let rotation = m.x_axis.y.atan2(m.x_axis.x).to_degrees();
        let translation = m.transpose() * (affine.translation - center) + center;
        Some(Self::new(rotation, translation, center))
    }

    /// Projection space to screen space, as the tile is drawn
    pub fn to_affine(&self) -> DAffine2 {
        DAffine2::from_translation(self.center)
            * DAffine2::from_angle(self.rotation.to_radians())
            * DAffine2::from_translation(self.translation - self.center)
    }

    /// Map a tile-local point through the transform.
    ///
    /// `reverse = false` takes a screen point into projection space: undo the
    /// rotation about the center, then undo the translation.
    /// `reverse = true` is its exact inverse, taking projection output to
    /// where it was drawn on screen.
    pub fn apply(&self, point: DVec2, reverse: bool) -> DVec2 {
        if self.is_identity() {
            return point;
        }
        if reverse {
            rotate_about(point + self.translation, self.rotation, self.center)
        } else {
            rotate_about(point, -self.rotation, self.center) - self.translation
        }
    }

    pub fn is_identity(&self) -> bool {
        self.rotation == 0.0 && self.translation == DVec2::ZERO
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn translation(&self) -> DVec2 {
        self.translation
    }

    pub fn center(&self) -> DVec2 {
        self.center
    }

    /// The attribute a renderer should set on the tile; empty for identity
    pub fn to_svg(&self) -> String {
        if self.is_identity() {
            return String::new();
        }
        format!(
            "rotate({} {} {}) translate({} {})",
            self.rotation, self.center.x, self.center.y, self.translation.x, self.translation.y
        )
    }

    fn approx_eq(&self, other: &Self) -> bool {
        (self.rotation - other.rotation).abs() < RIGID_EPSILON
            && self.translation.abs_diff_eq(other.translation, RIGID_EPSILON)
    }
}

fn rotate_about(point: DVec2, degrees: f64, center: DVec2) -> DVec2 {
    DMat2::from_angle(degrees.to_radians()) * (point - center) + center
}

// ============================================================================
// Transform attribute parsing
// ============================================================================

/// Parse an SVG transform list into the affine map it denotes
pub fn parse_transform(source: &str) -> Result<DAffine2, TransformError> {
    let list = TransformParser::parse(Rule::transform_list, source)
        .map_err(|e| syntax_error(source, &e))?;

    let mut affine = DAffine2::IDENTITY;
    for pair in list.flat_map(|p| p.into_inner()) {
        if pair.as_rule() == Rule::command {
            affine = affine * parse_command(source, pair)?;
        }
    }
    Ok(affine)
}

fn syntax_error(source: &str, err: &pest::error::Error<Rule>) -> TransformError {
    let span: SourceSpan = match err.location {
        pest::error::InputLocation::Pos(pos) => (pos, 0).into(),
        pest::error::InputLocation::Span((start, end)) => (start, end - start).into(),
    };
    TransformError::Syntax {
        message: err.variant.message().into_owned(),
        src: TransformError::source_named(source),
        span,
    }
}

fn parse_command(source: &str, pair: Pair<'_, Rule>) -> Result<DAffine2, TransformError> {
    let span = pair.as_span();
    let span: SourceSpan = (span.start(), span.end() - span.start()).into();
    let mut name = "";
    let mut args = Vec::new();
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::command_name => name = inner.as_str(),
            Rule::arguments => {
                for number in inner.into_inner() {
                    let value = number.as_str().parse::<f64>().map_err(|e| TransformError::Syntax {
                        message: e.to_string(),
                        src: TransformError::source_named(source),
                        span: (number.as_span().start(), number.as_str().len()).into(),
                    })?;
                    args.push(value);
                }
            }
            _ => {}
        }
    }

    let arity = |expected: &'static str| TransformError::Arity {
        command: name.to_string(),
        expected,
        got: args.len(),
        src: TransformError::source_named(source),
        span,
    };

    let affine = match (name, args.as_slice()) {
        ("matrix", &[a, b, c, d, e, f]) => {
            DAffine2::from_cols(dvec2(a, b), dvec2(c, d), dvec2(e, f))
        }
        ("matrix", _) => return Err(arity("6")),
        ("translate", &[x]) => DAffine2::from_translation(dvec2(x, 0.0)),
        ("translate", &[x, y]) => DAffine2::from_translation(dvec2(x, y)),
        ("translate", _) => return Err(arity("1 or 2")),
        ("scale", &[s]) => DAffine2::from_scale(DVec2::splat(s)),
        ("scale", &[x, y]) => DAffine2::from_scale(dvec2(x, y)),
        ("scale", _) => return Err(arity("1 or 2")),
        ("rotate", &[a]) => DAffine2::from_angle(a.to_radians()),
        ("rotate", &[a, cx, cy]) => {
            let c = dvec2(cx, cy);
            DAffine2::from_translation(c)
                * DAffine2::from_angle(a.to_radians())
                * DAffine2::from_translation(-c)
        }
        ("rotate", _) => return Err(arity("1 or 3")),
        ("skewX", &[a]) => {
            DAffine2::from_mat2(DMat2::from_cols(dvec2(1.0, 0.0), dvec2(a.to_radians().tan(), 1.0)))
        }
        ("skewY", &[a]) => {
            DAffine2::from_mat2(DMat2::from_cols(dvec2(1.0, a.to_radians().tan()), dvec2(0.0, 1.0)))
        }
        (_, _) => return Err(arity("1")),
    };
    Ok(affine)
}
