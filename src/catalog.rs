//! Projection catalog: the static registry of named projection kinds.
//!
//! Each kind pairs a raw projection with the parameters that configure it
//! (rotation, clip angle, scale, center) and the presentation transform used
//! to lay its tile out next to others.

use std::collections::HashSet;
use std::f64::consts::SQRT_2;
use std::sync::LazyLock;

use glam::{DVec2, dvec2};

use crate::errors::{CatalogError, InvalidParameter};
use crate::log::warn;
use crate::projection::raw::{Equirectangular, Quincuncial, Raw};
use crate::types::{LatLong, NumericError, check_finite, check_non_negative, check_positive};

/// Kind used when a caller asks for an explicit, unprojected fallback
pub const FALLBACK_KIND: &str = "equirectangular";

/// Sideways shift, in the rotated frame and as a fraction of the tile size,
/// that butts a 45°-rotated hemisphere square against the middle tile.
const TRIPTYCH_SHIFT: f64 = (SQRT_2 - 1.0) / 4.0;

/// Sphere rotation in degrees, applied before projecting.
///
/// `lambda` spins around the polar axis, then `phi` tilts, then `gamma` rolls
/// around the projection's view axis.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Rotation {
    pub lambda: f64,
    pub phi: f64,
    pub gamma: f64,
}

impl Rotation {
    pub const fn new(lambda: f64, phi: f64, gamma: f64) -> Self {
        Rotation { lambda, phi, gamma }
    }
}

/// Every tunable of a projection kind
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectionParameters {
    pub rotation: Rotation,
    /// Angular radius in degrees beyond which nothing is drawn; 0 means none
    pub clip_angle: f64,
    /// Multiplier applied after fitting to the tile
    pub scale: f64,
    /// Point of the projection plane that stays fixed under `scale`
    pub center: Option<LatLong>,
    /// Layout-only rotation in degrees, about the tile center
    pub presentation_rotation: f64,
    /// Layout-only translation as a fraction of the tile size
    pub presentation_translation: DVec2,
}

impl Default for ProjectionParameters {
    fn default() -> Self {
        ProjectionParameters {
            rotation: Rotation::default(),
            clip_angle: 0.0,
            scale: 1.0,
            center: None,
            presentation_rotation: 0.0,
            presentation_translation: DVec2::ZERO,
        }
    }
}

impl ProjectionParameters {
    /// Reject values that would break the fit or the inverse
    pub fn validate(&self) -> Result<(), InvalidParameter> {
        let Rotation { lambda, phi, gamma } = self.rotation;
        let translation = self.presentation_translation;
        for (parameter, value) in [
            ("rotation lambda", lambda),
            ("rotation phi", phi),
            ("rotation gamma", gamma),
            ("presentation rotation", self.presentation_rotation),
            ("presentation translation x", translation.x),
            ("presentation translation y", translation.y),
        ] {
            checked(parameter, check_finite(value))?;
        }
        if let Some(center) = self.center {
            checked("center latitude", check_finite(center.lat))?;
            checked("center longitude", check_finite(center.long))?;
        }
        checked("scale", check_positive(self.scale))?;
        checked("clip angle", check_non_negative(self.clip_angle))?;
        Ok(())
    }
}

fn checked(
    parameter: &'static str,
    value: Result<f64, NumericError>,
) -> Result<f64, InvalidParameter> {
    value.map_err(|source| InvalidParameter { parameter, source })
}

/// A named projection kind
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectionKind {
    name: String,
    aliases: Vec<String>,
    raw: Raw,
    params: ProjectionParameters,
}

impl ProjectionKind {
    pub fn new(name: impl Into<String>, raw: impl Into<Raw>) -> Self {
        ProjectionKind {
            name: name.into(),
            aliases: Vec::new(),
            raw: raw.into(),
            params: ProjectionParameters::default(),
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn rotation(mut self, lambda: f64, phi: f64, gamma: f64) -> Self {
        self.params.rotation = Rotation::new(lambda, phi, gamma);
        self
    }

    pub fn clip_angle(mut self, degrees: f64) -> Self {
        self.params.clip_angle = degrees;
        self
    }

    pub fn scale(mut self, scale: f64) -> Self {
        self.params.scale = scale;
        self
    }

    pub fn center(mut self, center: LatLong) -> Self {
        self.params.center = Some(center);
        self
    }

    pub fn presentation(mut self, rotation: f64, translation: DVec2) -> Self {
        self.params.presentation_rotation = rotation;
        self.params.presentation_translation = translation;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn raw(&self) -> Raw {
        self.raw
    }

    pub fn parameters(&self) -> ProjectionParameters {
        self.params
    }

    fn matches_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    fn matches_alias(&self, name: &str) -> bool {
        self.aliases.iter().any(|a| a.eq_ignore_ascii_case(name))
    }
}

/// Registry of projection kinds, looked up by name or alias
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectionCatalog {
    kinds: Vec<ProjectionKind>,
}

static BUILTIN: LazyLock<ProjectionCatalog> = LazyLock::new(|| ProjectionCatalog {
    kinds: builtin_kinds(),
});

fn builtin_kinds() -> Vec<ProjectionKind> {
    vec![
        ProjectionKind::new("equirectangular", Equirectangular)
            .alias("plate carree")
            .alias("platecarree")
            .alias("equirect")
            .alias("unprojected")
            .alias("latlong"),
        ProjectionKind::new("quincuncial", Quincuncial)
            .alias("peirce")
            .alias("peirce quincuncial")
            .alias("peirce-quincuncial")
            .rotation(0.0, -90.0, 0.0),
        ProjectionKind::new("quincuncial north", Quincuncial)
            .alias("north")
            .alias("northern")
            .alias("quincuncial-north")
            .alias("peirce north")
            .rotation(0.0, -90.0, 0.0)
            .clip_angle(90.0)
            .presentation(45.0, dvec2(TRIPTYCH_SHIFT, -TRIPTYCH_SHIFT)),
        ProjectionKind::new("quincuncial south", Quincuncial)
            .alias("south")
            .alias("southern")
            .alias("quincuncial-south")
            .alias("peirce south")
            .rotation(0.0, 90.0, 0.0)
            .clip_angle(90.0)
            .presentation(-45.0, dvec2(-TRIPTYCH_SHIFT, -TRIPTYCH_SHIFT)),
    ]
}

impl ProjectionCatalog {
    /// The catalog shipped with the crate
    pub fn builtin() -> &'static ProjectionCatalog {
        &BUILTIN
    }

    /// Start a custom catalog
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    /// Build a catalog, rejecting colliding names or aliases and invalid
    /// parameters
    pub fn new(kinds: Vec<ProjectionKind>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for kind in &kinds {
            kind.params
                .validate()
                .map_err(|source| CatalogError::InvalidParameter {
                    name: kind.name.clone(),
                    source,
                })?;
            for name in std::iter::once(&kind.name).chain(&kind.aliases) {
                if !seen.insert(name.to_ascii_lowercase()) {
                    return Err(CatalogError::DuplicateName { name: name.clone() });
                }
            }
        }
        Ok(ProjectionCatalog { kinds })
    }

    /// Look a kind up by primary name, then by alias, ignoring case.
    pub fn resolve(&self, name: &str) -> Result<&ProjectionKind, CatalogError> {
        let name = name.trim();
        self.kinds
            .iter()
            .find(|k| k.matches_name(name))
            .or_else(|| self.kinds.iter().find(|k| k.matches_alias(name)))
            .ok_or_else(|| CatalogError::UnknownProjection {
                name: name.to_string(),
            })
    }

    /// Resolve `name`, falling back to the explicitly named `fallback` kind.
    ///
    /// The fallback is logged loudly; it is never a silent guess.
    pub fn resolve_or(&self, name: &str, fallback: &str) -> Result<&ProjectionKind, CatalogError> {
        match self.resolve(name) {
            Ok(kind) => Ok(kind),
            Err(err) => {
                warn!(requested = name, fallback, "unknown projection, using fallback");
                self.resolve(fallback).map_err(|_| err)
            }
        }
    }

    /// The parameters of a kind
    pub fn parameters(&self, kind: &ProjectionKind) -> ProjectionParameters {
        kind.parameters()
    }

    /// Primary names in definition order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.kinds.iter().map(|k| k.name())
    }

    pub fn kinds(&self) -> &[ProjectionKind] {
        &self.kinds
    }
}

/// Accumulates kinds for a custom catalog
#[derive(Clone, Debug, Default)]
pub struct CatalogBuilder {
    kinds: Vec<ProjectionKind>,
}

impl CatalogBuilder {
    pub fn kind(mut self, kind: ProjectionKind) -> Self {
        self.kinds.push(kind);
        self
    }

    /// Add every kind of the builtin catalog
    pub fn with_builtin(mut self) -> Self {
        self.kinds.extend(builtin_kinds());
        self
    }

    pub fn build(self) -> Result<ProjectionCatalog, CatalogError> {
        ProjectionCatalog::new(self.kinds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_primary_name_ignoring_case() {
        let catalog = ProjectionCatalog::builtin();
        let kind = catalog.resolve("Equirectangular").map(ProjectionKind::name);
        assert_eq!(kind, Ok("equirectangular"));
        let kind = catalog.resolve("  QUINCUNCIAL north ").map(ProjectionKind::name);
        assert_eq!(kind, Ok("quincuncial north"));
    }

    #[test]
    fn resolve_alias() {
        let catalog = ProjectionCatalog::builtin();
        assert_eq!(catalog.resolve("Plate Carree").map(ProjectionKind::name), Ok("equirectangular"));
        assert_eq!(catalog.resolve("peirce").map(ProjectionKind::name), Ok("quincuncial"));
        assert_eq!(catalog.resolve("Southern").map(ProjectionKind::name), Ok("quincuncial south"));
    }

    #[test]
    fn resolve_unknown() {
        let err = ProjectionCatalog::builtin().resolve("mercator").unwrap_err();
        assert_eq!(
            err,
            CatalogError::UnknownProjection {
                name: "mercator".to_string()
            }
        );
    }

    #[test]
    fn resolve_or_uses_explicit_fallback() {
        let catalog = ProjectionCatalog::builtin();
        let kind = catalog.resolve_or("mercator", FALLBACK_KIND).unwrap();
        assert_eq!(kind.name(), "equirectangular");
        let kind = catalog.resolve_or("north", FALLBACK_KIND).unwrap();
        assert_eq!(kind.name(), "quincuncial north");
    }

    #[test]
    fn resolve_or_reports_requested_name_when_fallback_missing() {
        let err = ProjectionCatalog::builtin()
            .resolve_or("mercator", "robinson")
            .unwrap_err();
        assert_eq!(
            err,
            CatalogError::UnknownProjection {
                name: "mercator".to_string()
            }
        );
    }

    #[test]
    fn builtin_aliases_are_disjoint() {
        let kinds = ProjectionCatalog::builtin().kinds().to_vec();
        assert!(ProjectionCatalog::new(kinds).is_ok());
    }

    #[test]
    fn new_rejects_colliding_alias() {
        let result = ProjectionCatalog::new(vec![
            ProjectionKind::new("equirectangular", Equirectangular).alias("flat"),
            ProjectionKind::new("peirce", Quincuncial).alias("FLAT"),
        ]);
        assert_eq!(
            result,
            Err(CatalogError::DuplicateName {
                name: "FLAT".to_string()
            })
        );
    }

    #[test]
    fn new_rejects_invalid_parameters() {
        let result = ProjectionCatalog::new(vec![
            ProjectionKind::new("flat", Equirectangular).scale(0.0),
        ]);
        assert_eq!(
            result,
            Err(CatalogError::InvalidParameter {
                name: "flat".to_string(),
                source: InvalidParameter {
                    parameter: "scale",
                    source: NumericError::Zero,
                },
            })
        );

        let negative = ProjectionCatalog::builder()
            .kind(ProjectionKind::new("shrunk", Equirectangular).scale(-2.0))
            .build();
        assert!(matches!(
            negative,
            Err(CatalogError::InvalidParameter {
                source: InvalidParameter {
                    source: NumericError::Negative,
                    ..
                },
                ..
            })
        ));

        let nan_clip = ProjectionCatalog::builder()
            .kind(ProjectionKind::new("hazy", Quincuncial).clip_angle(f64::NAN))
            .build();
        assert!(matches!(
            nan_clip,
            Err(CatalogError::InvalidParameter {
                source: InvalidParameter {
                    parameter: "clip angle",
                    ..
                },
                ..
            })
        ));

        let lost = ProjectionKind::new("lost", Equirectangular).center(LatLong::new(f64::INFINITY, 0.0));
        let off_globe = ProjectionCatalog::builder().kind(lost).build();
        assert!(matches!(off_globe, Err(CatalogError::InvalidParameter { .. })));
    }

    #[test]
    fn builtin_parameters_are_valid() {
        for kind in ProjectionCatalog::builtin().kinds() {
            assert_eq!(kind.parameters().validate(), Ok(()), "{}", kind.name());
        }
    }

    #[test]
    fn builder_extends_builtin() {
        let catalog = ProjectionCatalog::builder()
            .with_builtin()
            .kind(ProjectionKind::new("flat earth", Equirectangular).scale(0.5))
            .build()
            .unwrap();
        assert_eq!(catalog.resolve("Flat Earth").map(|k| k.parameters().scale), Ok(0.5));
        assert_eq!(catalog.names().count(), 5);

        let clash = ProjectionCatalog::builder()
            .with_builtin()
            .kind(ProjectionKind::new("mine", Quincuncial).alias("north"))
            .build();
        assert!(matches!(clash, Err(CatalogError::DuplicateName { .. })));
    }

    #[test]
    fn hemisphere_parameters() {
        let catalog = ProjectionCatalog::builtin();
        let north = catalog.resolve("north").unwrap();
        let params = catalog.parameters(north);
        assert_eq!(params.clip_angle, 90.0);
        assert_eq!(params.scale, 1.0);
        assert_eq!(params.rotation, Rotation::new(0.0, -90.0, 0.0));
        assert_eq!(params.presentation_rotation, 45.0);
        assert!(params.presentation_translation.x > 0.0);
    }

    #[test]
    fn names_in_definition_order() {
        let names: Vec<_> = ProjectionCatalog::builtin().names().collect();
        insta::assert_debug_snapshot!(names, @r#"
        [
            "equirectangular",
            "quincuncial",
            "quincuncial north",
            "quincuncial south",
        ]
        "#);
    }
}
