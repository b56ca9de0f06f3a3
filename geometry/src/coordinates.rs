/// Integer coordinates in 3-space. Values are exact at level 1 and scale by
/// `3^(level-1)` at deeper levels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Coordinates {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl Coordinates {
    pub const ZERO: Coordinates = Coordinates { x: 0, y: 0, z: 0 };

    pub fn new(x: i64, y: i64, z: i64) -> Self {
        Self { x, y, z }
    }

    pub fn offset(self, other: Coordinates) -> Coordinates {
        Coordinates { x: self.x + other.x, y: self.y + other.y, z: self.z + other.z }
    }

    pub fn scale(self, factor: i64) -> Coordinates {
        Coordinates { x: self.x * factor, y: self.y * factor, z: self.z * factor }
    }
}

/// Local (x, y) of a face position `p` in `[0, 8]`, interpreted row-major in a 3x3
/// grid: `(x_local, y_local) = (col - 1, 1 - row)`. Out-of-range positions fall back
/// to the origin rather than panicking — the ledger may query a tentative position
/// before a face has saturated.
pub fn local_face_position(p: u8) -> (i64, i64) {
    if p > 8 {
        return (0, 0);
    }
    let row = (p / 3) as i64;
    let col = (p % 3) as i64;
    (col - 1, 1 - row)
}

/// Local z for a face sitting at index `f` within its cube, `f ∈ {0, 1, 2}`.
pub fn local_face_z(f: u8) -> i64 {
    f as i64 - 1
}

/// Position of a level-1 cube within its containing 3x3x3 grid of spacing 3, given
/// its sequential index `c`. 27 cubes fill one level-2 super-cube; the grid extends
/// by the same rule for `c >= 27`.
pub fn level1_cube_grid_position(c: u64) -> Coordinates {
    let cube_face_num = (c / 9) as i64;
    let pos_in_face = (c % 9) as i64;
    let row = pos_in_face / 3;
    let col = pos_in_face % 3;
    Coordinates::new((col - 1) * 3, (1 - row) * 3, (cube_face_num - 1) * 3)
}

/// Absolute coordinates of a block: its cube's grid position plus its local position
/// within the face, plus the face's z offset, scaled by `3^(level-1)`.
pub fn absolute_coordinates(level: u32, cube_index: u64, face_index: u8, position: u8) -> Coordinates {
    let (x_local, y_local) = local_face_position(position);
    let z_local = local_face_z(face_index);
    let cube_pos = level1_cube_grid_position(cube_index);
    let local = Coordinates::new(x_local, y_local, z_local);
    let scale = 3i64.pow(level.saturating_sub(1));
    cube_pos.offset(local).scale(scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_face_position_corners_and_center() {
        assert_eq!(local_face_position(0), (-1, 1));
        assert_eq!(local_face_position(4), (0, 0));
        assert_eq!(local_face_position(8), (1, -1));
    }

    #[test]
    fn local_face_position_out_of_range_falls_back_to_origin() {
        assert_eq!(local_face_position(9), (0, 0));
        assert_eq!(local_face_position(255), (0, 0));
    }

    #[test]
    fn local_face_z_spans_minus_one_to_one() {
        assert_eq!(local_face_z(0), -1);
        assert_eq!(local_face_z(1), 0);
        assert_eq!(local_face_z(2), 1);
    }

    #[test]
    fn level1_cube_grid_position_first_cube() {
        assert_eq!(level1_cube_grid_position(0), Coordinates::new(-3, 3, -3));
    }

    #[test]
    fn level1_cube_grid_position_extends_past_27() {
        // c=27 starts a new super-cube face: cube_face_num=3, pos_in_face=0
        assert_eq!(level1_cube_grid_position(27), Coordinates::new(-3, 3, 6));
    }

    #[test]
    fn absolute_coordinates_scale_with_level() {
        let level1 = absolute_coordinates(1, 0, 0, 0);
        let level2 = absolute_coordinates(2, 0, 0, 0);
        assert_eq!(level2, level1.scale(3));
    }
}
