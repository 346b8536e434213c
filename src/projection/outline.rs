//! Reference outline used to fit a projection to its tile.
//!
//! The outline is a fixed polygon set spanning the whole ±180°/±90° domain,
//! independent of whatever data a map displays, so one fit serves every
//! dataset.

use crate::types::LatLong;

/// A set of closed rings in geographic coordinates
#[derive(Clone, Debug, PartialEq, Default)]
pub struct ReferenceOutline {
    rings: Vec<Vec<LatLong>>,
}

impl ReferenceOutline {
    /// Rings are implicitly closed; repeating the first vertex is allowed.
    pub fn new(rings: Vec<Vec<LatLong>>) -> Self {
        ReferenceOutline { rings }
    }

    /// Four quadrant boxes covering the full domain.
    ///
    /// Split at the prime meridian and the equator so every ring stays
    /// smaller than a hemisphere.
    pub fn full_domain() -> Self {
        let quadrant = |lat0: f64, lat1: f64, long0: f64, long1: f64| {
            vec![
                LatLong::new(lat0, long0),
                LatLong::new(lat0, long1),
                LatLong::new(lat1, long1),
                LatLong::new(lat1, long0),
            ]
        };
        ReferenceOutline::new(vec![
            quadrant(0.0, 90.0, -180.0, 0.0),
            quadrant(0.0, 90.0, 0.0, 180.0),
            quadrant(-90.0, 0.0, -180.0, 0.0),
            quadrant(-90.0, 0.0, 0.0, 180.0),
        ])
    }

    pub fn rings(&self) -> &[Vec<LatLong>] {
        &self.rings
    }

    /// True when no ring has an edge to sample
    pub fn is_empty(&self) -> bool {
        self.rings.iter().all(|r| r.len() < 2)
    }

    /// Vertices plus points interpolated along every edge, at most `step`
    /// degrees apart on either axis.
    pub fn samples(&self, step: f64) -> impl Iterator<Item = LatLong> + '_ {
        self.sampled_rings(step).flatten()
    }

    /// Like [`samples`](Self::samples), one iterator per ring
    pub fn sampled_rings(
        &self,
        step: f64,
    ) -> impl Iterator<Item = impl Iterator<Item = LatLong> + '_> + '_ {
        self.rings
            .iter()
            .filter(|ring| ring.len() >= 2)
            .map(move |ring| {
                let closing = (ring[ring.len() - 1], ring[0]);
                ring.windows(2)
                    .map(|w| (w[0], w[1]))
                    .chain(std::iter::once(closing))
                    .flat_map(move |(a, b)| densify(a, b, step))
            })
    }
}

/// Points from `a` (inclusive) to `b` (inclusive)
fn densify(a: LatLong, b: LatLong, step: f64) -> impl Iterator<Item = LatLong> {
    let span = (b.lat - a.lat).abs().max((b.long - a.long).abs());
    let n = if step > 0.0 {
        ((span / step).ceil() as usize).max(1)
    } else {
        1
    };
    (0..=n).map(move |i| {
        let t = i as f64 / n as f64;
        LatLong::new(a.lat + (b.lat - a.lat) * t, a.long + (b.long - a.long) * t)
    })
}
