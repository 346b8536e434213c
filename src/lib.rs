//! Geographic to screen coordinate transforms for composite world maps.
//!
//! Several projection tiles (for instance a Peirce quincuncial flanked by its
//! two hemisphere halves) are laid out side by side and treated as one
//! surface: clicks map back to latitude/longitude and stored positions map
//! to pixels, whichever tile they fall on.

use pest_derive::Parser;

pub mod catalog;
pub mod composite;
pub mod document;
pub mod errors;
pub mod log;
pub mod marker;
pub mod presentation;
pub mod projection;
pub mod readout;
pub mod session;
pub mod tile;
pub mod types;

pub use catalog::{ProjectionCatalog, ProjectionKind, ProjectionParameters, Rotation};
pub use composite::{CompositeMap, MapState, PendingTile, QueryOptions};
pub use document::{Document, MemoryDocument};
pub use errors::{
    BuildError, CatalogError, FitError, InvalidParameter, LayoutError, QueryError, SessionError,
    TransformError,
};
pub use marker::{Marker, MarkerPosition, MarkerStyle, RenderedMarker};
pub use presentation::PresentationTransform;
pub use projection::{FitOptions, GeoProjectionEngine, ReferenceOutline};
pub use readout::Readout;
pub use session::Session;
pub use tile::{Constrain, TileGeometry, constrain_to_bounds};
pub use types::{LatLong, NumericError, Rect, TileSize};

#[derive(Parser)]
#[grammar = "transform.pest"]
pub struct TransformParser;
