//! Geohash bucketing for the shared cache.
//!
//! Coordinates map to a base32 geohash of [`BUCKET_PRECISION`] characters.
//! At that precision a cell is about 4.9 km tall and 4.9 km wide at the
//! equator, narrowing in longitude toward the poles.

const BASE32: &[u8; 32] = b"0123456789bcdefghjkmnpqrstuvwxyz";

pub const BUCKET_PRECISION: usize = 5;

/// Neighbor offsets in cell units as (rows north, columns east):
/// N, NE, E, SE, S, SW, W, NW.
const COMPASS_OFFSETS: [(f64, f64); 8] = [
    (1.0, 0.0),
    (1.0, 1.0),
    (0.0, 1.0),
    (-1.0, 1.0),
    (-1.0, 0.0),
    (-1.0, -1.0),
    (0.0, -1.0),
    (1.0, -1.0),
];

/// Bounding box of a geohash cell, in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl Cell {
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }

    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    pub fn width(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.min_lat && lat < self.max_lat && lon >= self.min_lon && lon < self.max_lon
    }
}

/// Shared-cache key for a coordinate.
pub fn bucket_key(lat: f64, lon: f64) -> String {
    encode(lat, lon, BUCKET_PRECISION)
}

pub fn encode(lat: f64, lon: f64, precision: usize) -> String {
    let lat = lat.clamp(-90.0, 90.0);
    let lon = lon.clamp(-180.0, 180.0);

    let (mut lat_lo, mut lat_hi) = (-90.0_f64, 90.0_f64);
    let (mut lon_lo, mut lon_hi) = (-180.0_f64, 180.0_f64);

    let mut hash = String::with_capacity(precision);
    let mut even_bit = true;
    let mut bits = 0;
    let mut index = 0usize;

    while hash.len() < precision {
        if even_bit {
            let mid = (lon_lo + lon_hi) / 2.0;
            if lon >= mid {
                index = index * 2 + 1;
                lon_lo = mid;
            } else {
                index *= 2;
                lon_hi = mid;
            }
        } else {
            let mid = (lat_lo + lat_hi) / 2.0;
            if lat >= mid {
                index = index * 2 + 1;
                lat_lo = mid;
            } else {
                index *= 2;
                lat_hi = mid;
            }
        }
        even_bit = !even_bit;

        bits += 1;
        if bits == 5 {
            hash.push(BASE32[index] as char);
            bits = 0;
            index = 0;
        }
    }

    hash
}

/// Bounding box for a geohash, or `None` if it is empty or contains
/// characters outside the geohash alphabet.
pub fn decode_cell(key: &str) -> Option<Cell> {
    if key.is_empty() {
        return None;
    }

    let mut cell = Cell {
        min_lat: -90.0,
        max_lat: 90.0,
        min_lon: -180.0,
        max_lon: 180.0,
    };
    let mut even_bit = true;

    for c in key.bytes() {
        let value = BASE32.iter().position(|&b| b == c.to_ascii_lowercase())?;
        for shift in (0..5).rev() {
            let bit = (value >> shift) & 1 == 1;
            if even_bit {
                let mid = (cell.min_lon + cell.max_lon) / 2.0;
                if bit {
                    cell.min_lon = mid;
                } else {
                    cell.max_lon = mid;
                }
            } else {
                let mid = (cell.min_lat + cell.max_lat) / 2.0;
                if bit {
                    cell.min_lat = mid;
                } else {
                    cell.max_lat = mid;
                }
            }
            even_bit = !even_bit;
        }
    }

    Some(cell)
}

/// Keys of the cells surrounding `key`, in N, NE, E, SE, S, SW, W, NW order.
///
/// The order is fixed but not sorted by distance to any query point.
/// Longitude wraps across the antimeridian; rows past a pole do not exist,
/// so cells on the polar edge have five neighbors.
pub fn neighbor_keys(key: &str) -> Vec<String> {
    let Some(cell) = decode_cell(key) else {
        return Vec::new();
    };

    let precision = key.len();
    let (center_lat, center_lon) = cell.center();
    let (height, width) = (cell.height(), cell.width());

    COMPASS_OFFSETS
        .iter()
        .filter_map(|&(rows, cols)| {
            let lat = center_lat + rows * height;
            if !(-90.0..=90.0).contains(&lat) {
                return None;
            }
            let lon = wrap_longitude(center_lon + cols * width);
            Some(encode(lat, lon, precision))
        })
        .collect()
}

fn wrap_longitude(lon: f64) -> f64 {
    if lon >= 180.0 {
        lon - 360.0
    } else if lon < -180.0 {
        lon + 360.0
    } else {
        lon
    }
}
