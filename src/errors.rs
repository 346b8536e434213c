//! Error types with rich diagnostics using miette
//!
//! Construction errors (`CatalogError`, `FitError`) abort building a tile.
//! Query errors (`QueryError`) are expected and recoverable: callers use them
//! as "no answer" signals or to switch to an alternate strategy.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::types::NumericError;

// ============================================================================
// Catalog Errors
// ============================================================================

/// Errors raised while resolving or building a projection catalog
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("unknown projection: {name}")]
    #[diagnostic(
        code(triptych::catalog::unknown_projection),
        help("choose an explicit fallback kind, e.g. `equirectangular`")
    )]
    UnknownProjection { name: String },

    #[error("projection name or alias registered twice: {name}")]
    #[diagnostic(code(triptych::catalog::duplicate_name))]
    DuplicateName { name: String },

    #[error("projection {name} has an invalid parameter")]
    #[diagnostic(code(triptych::catalog::invalid_parameter))]
    InvalidParameter {
        name: String,
        #[source]
        source: InvalidParameter,
    },
}

/// A projection parameter outside its domain
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
#[error("{parameter} is invalid")]
#[diagnostic(
    code(triptych::parameter::invalid),
    help("scale must be positive and the clip angle must not be negative")
)]
pub struct InvalidParameter {
    pub parameter: &'static str,
    #[source]
    pub source: NumericError,
}

// ============================================================================
// Fit Errors
// ============================================================================

/// Errors that occur while fitting a projection to its tile
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum FitError {
    #[error("reference outline is empty")]
    #[diagnostic(
        code(triptych::fit::empty_outline),
        help("the fit needs a polygon set spanning the full geographic domain")
    )]
    EmptyOutline,

    #[error("projected outline has a degenerate extent ({width} x {height})")]
    #[diagnostic(code(triptych::fit::degenerate_extent))]
    DegenerateExtent { width: f64, height: f64 },

    #[error("invalid tile size")]
    #[diagnostic(code(triptych::fit::invalid_tile_size))]
    InvalidTileSize {
        #[source]
        source: NumericError,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    InvalidParameter(#[from] InvalidParameter),
}

/// Anything that can abort the construction of a tile's projection engine
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum BuildError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Fit(#[from] FitError),
}

// ============================================================================
// Query Errors
// ============================================================================

/// Recoverable failures of coordinate queries
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("map is still loading ({pending} tiles pending)")]
    #[diagnostic(
        code(triptych::query::not_ready),
        help("retry once every expected tile has completed layout")
    )]
    NotReady { pending: usize },

    #[error("no tiles loaded")]
    #[diagnostic(code(triptych::query::no_tiles_loaded))]
    NoTilesLoaded,

    #[error("point ({x}, {y}) lies outside every tile")]
    #[diagnostic(code(triptych::query::point_out_of_bounds))]
    PointOutOfBounds { x: f64, y: f64 },

    #[error("tile {index} has not been laid out")]
    #[diagnostic(code(triptych::query::tile_not_laid_out))]
    TileNotLaidOut { index: usize },

    #[error("unknown tile {index}")]
    #[diagnostic(code(triptych::query::unknown_tile))]
    UnknownTile { index: usize },

    #[error("transform produced a non-finite coordinate")]
    #[diagnostic(code(triptych::query::non_finite))]
    NonFinite,
}

// ============================================================================
// Layout Errors
// ============================================================================

/// Errors raised while tiles are added to a composite map
#[derive(Error, Diagnostic, Debug)]
pub enum LayoutError {
    #[error("tile completed with no layout pending")]
    #[diagnostic(
        code(triptych::layout::counter_underflow),
        help("a tile reported completion twice, or after the map was already ready")
    )]
    CounterUnderflow,

    #[error("tile {index} is already part of this map")]
    #[diagnostic(code(triptych::layout::duplicate_tile))]
    DuplicateTile { index: usize },

    #[error("document has no box for tile {index}")]
    #[diagnostic(code(triptych::layout::tile_not_laid_out))]
    TileNotLaidOut { index: usize },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Transform(#[from] TransformError),
}

// ============================================================================
// Transform Attribute Errors
// ============================================================================

/// Errors from reading a tile's rendered transform attribute
#[derive(Error, Diagnostic, Debug)]
pub enum TransformError {
    #[error("malformed transform attribute")]
    #[diagnostic(code(triptych::transform::syntax))]
    Syntax {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("{message}")]
        span: SourceSpan,
    },

    #[error("{command} takes {expected} arguments, got {got}")]
    #[diagnostic(code(triptych::transform::arity))]
    Arity {
        command: String,
        expected: &'static str,
        got: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("wrong number of arguments")]
        span: SourceSpan,
    },

    #[error("transform is not a rotation plus translation")]
    #[diagnostic(
        code(triptych::transform::non_rigid),
        help("tile layout transforms may only rotate and translate")
    )]
    NonRigid {
        #[source_code]
        src: NamedSource<String>,
        #[label("this transform scales or skews")]
        span: SourceSpan,
    },
}

impl TransformError {
    pub(crate) fn source_named(source: &str) -> NamedSource<String> {
        NamedSource::new("transform", source.to_string())
    }
}

// ============================================================================
// Session Errors
// ============================================================================

/// Errors from the application session that tracks the active map
#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("no map named {name}")]
    #[diagnostic(code(triptych::session::unknown_map))]
    UnknownMap { name: String },
}
