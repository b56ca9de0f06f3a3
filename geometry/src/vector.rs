use crate::coordinates::Coordinates;

/// A cartesian vector with its magnitude and unit direction precomputed, since the
/// ledger recomputes this on every placement change.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub magnitude: f64,
    pub unit: (f64, f64, f64),
}

impl Vector {
    pub fn from_coordinates(coords: Coordinates) -> Self {
        let (x, y, z) = (coords.x as f64, coords.y as f64, coords.z as f64);
        let magnitude = (x * x + y * y + z * z).sqrt();
        let unit = if magnitude == 0.0 { (0.0, 0.0, 0.0) } else { (x / magnitude, y / magnitude, z / magnitude) };
        Self { x, y, z, magnitude, unit }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_coordinates_yield_zero_vector_and_direction() {
        let v = Vector::from_coordinates(Coordinates::ZERO);
        assert_eq!(v.magnitude, 0.0);
        assert_eq!(v.unit, (0.0, 0.0, 0.0));
    }

    #[test]
    fn unit_direction_is_normalized() {
        let v = Vector::from_coordinates(Coordinates::new(3, 0, 4));
        assert_eq!(v.magnitude, 5.0);
        assert_eq!(v.unit, (0.6, 0.0, 0.8));
    }
}
