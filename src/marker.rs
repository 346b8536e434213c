//! Map markers (dots)
//!
//! A marker stores a position in one of three coordinate spaces and never
//! caches where it is drawn; every tile resolves it afresh through its own
//! conversion.

use std::fmt;

use glam::DVec2;

use crate::types::LatLong;

/// A stored marker position, tagged with its coordinate space
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MarkerPosition {
    /// Document pixels
    ScreenGlobal(DVec2),
    /// Pixels local to the tile the marker was placed on
    TileLocal { tile: usize, point: DVec2 },
    /// Geographic position
    LatLong(LatLong),
}

impl fmt::Display for MarkerPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkerPosition::ScreenGlobal(p) => write!(f, "screen ({}, {})", p.x, p.y),
            MarkerPosition::TileLocal { tile, point } => {
                write!(f, "tile {} ({}, {})", tile, point.x, point.y)
            }
            MarkerPosition::LatLong(at) => write!(f, "geo {}", at),
        }
    }
}

/// How a marker is drawn
#[derive(Clone, Debug, PartialEq)]
pub struct MarkerStyle {
    pub radius: f64,
    pub fill: String,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        MarkerStyle {
            radius: 4.0,
            fill: "#e4572e".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
    pub position: MarkerPosition,
    pub id: Option<String>,
    pub style: MarkerStyle,
}

impl Marker {
    pub fn new(position: MarkerPosition) -> Self {
        Marker {
            position,
            id: None,
            style: MarkerStyle::default(),
        }
    }

    pub fn at(at: LatLong) -> Self {
        Self::new(MarkerPosition::LatLong(at))
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_style(mut self, style: MarkerStyle) -> Self {
        self.style = style;
        self
    }

    /// Same position, space and id; style is not part of identity
    pub fn same_as(&self, other: &Marker) -> bool {
        self.position == other.position && self.id == other.id
    }
}

/// A marker resolved for one tile, in that tile's local pixels
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedMarker {
    pub id: Option<String>,
    pub point: DVec2,
    pub style: MarkerStyle,
}
