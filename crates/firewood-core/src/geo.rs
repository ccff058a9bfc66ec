//! Geographic primitives shared by the grouper, the viewport filter and the
//! marker projector.

use serde::{Deserialize, Serialize};

pub const MIN_LATITUDE: f64 = -90.0;
pub const MAX_LATITUDE: f64 = 90.0;
pub const MIN_LONGITUDE: f64 = -180.0;
pub const MAX_LONGITUDE: f64 = 180.0;

/// A placeable point: both values finite and inside the valid ranges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Returns `None` unless both values are finite and in range.
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let lat_ok = latitude.is_finite() && (MIN_LATITUDE..=MAX_LATITUDE).contains(&latitude);
        let lng_ok =
            longitude.is_finite() && (MIN_LONGITUDE..=MAX_LONGITUDE).contains(&longitude);
        (lat_ok && lng_ok).then_some(Self {
            latitude,
            longitude,
        })
    }

    /// Builds coordinates from optional record fields.
    #[must_use]
    pub fn from_parts(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        Self::new(latitude?, longitude?)
    }

    /// Exact-match grouping key.
    ///
    /// `-0.0` is folded into `0.0` so the key agrees with `==` on finite
    /// values.
    #[must_use]
    pub fn key(&self) -> CoordKey {
        fn bits(v: f64) -> u64 {
            if v == 0.0 {
                0.0_f64.to_bits()
            } else {
                v.to_bits()
            }
        }
        CoordKey(bits(self.latitude), bits(self.longitude))
    }

    /// Formats both values with the given number of decimal places, as used
    /// when filling form inputs and notices.
    #[must_use]
    pub fn format(&self, decimals: usize) -> (String, String) {
        (
            format!("{:.*}", decimals, self.latitude),
            format!("{:.*}", decimals, self.longitude),
        )
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}

/// Hashable identity of an exact (latitude, longitude) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CoordKey(u64, u64);

/// A rectangular viewport, inclusive of its edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub south_west: Coordinates,
    pub north_east: Coordinates,
}

impl Bounds {
    /// Builds bounds from two opposite corners in any order.
    #[must_use]
    pub fn from_corners(a: Coordinates, b: Coordinates) -> Self {
        Self {
            south_west: Coordinates {
                latitude: a.latitude.min(b.latitude),
                longitude: a.longitude.min(b.longitude),
            },
            north_east: Coordinates {
                latitude: a.latitude.max(b.latitude),
                longitude: a.longitude.max(b.longitude),
            },
        }
    }

    #[must_use]
    pub fn world() -> Self {
        Self {
            south_west: Coordinates {
                latitude: MIN_LATITUDE,
                longitude: MIN_LONGITUDE,
            },
            north_east: Coordinates {
                latitude: MAX_LATITUDE,
                longitude: MAX_LONGITUDE,
            },
        }
    }

    /// Smallest bounds enclosing every point, or `None` for an empty input.
    pub fn enclosing<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Coordinates>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Self {
            south_west: first,
            north_east: first,
        };
        for p in iter {
            bounds.extend(p);
        }
        Some(bounds)
    }

    fn extend(&mut self, p: Coordinates) {
        self.south_west.latitude = self.south_west.latitude.min(p.latitude);
        self.south_west.longitude = self.south_west.longitude.min(p.longitude);
        self.north_east.latitude = self.north_east.latitude.max(p.latitude);
        self.north_east.longitude = self.north_east.longitude.max(p.longitude);
    }

    /// Grows the bounds by `ratio` of their span on every side, clamped to
    /// the world.
    #[must_use]
    pub fn pad(&self, ratio: f64) -> Self {
        let lat_pad = (self.north_east.latitude - self.south_west.latitude).abs() * ratio;
        let lng_pad = (self.north_east.longitude - self.south_west.longitude).abs() * ratio;
        Self {
            south_west: Coordinates {
                latitude: (self.south_west.latitude - lat_pad).max(MIN_LATITUDE),
                longitude: (self.south_west.longitude - lng_pad).max(MIN_LONGITUDE),
            },
            north_east: Coordinates {
                latitude: (self.north_east.latitude + lat_pad).min(MAX_LATITUDE),
                longitude: (self.north_east.longitude + lng_pad).min(MAX_LONGITUDE),
            },
        }
    }

    #[must_use]
    pub fn contains(&self, p: Coordinates) -> bool {
        p.latitude >= self.south_west.latitude
            && p.latitude <= self.north_east.latitude
            && p.longitude >= self.south_west.longitude
            && p.longitude <= self.north_east.longitude
    }

    #[must_use]
    pub fn center(&self) -> Coordinates {
        Coordinates {
            latitude: (self.south_west.latitude + self.north_east.latitude) / 2.0,
            longitude: (self.south_west.longitude + self.north_east.longitude) / 2.0,
        }
    }
}
