/// Where a block (or, at higher levels, a cube) sits within the recursive structure:
/// which position in which face, of which cube, at which level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Location {
    pub face_index: u8,
    pub position: u8,
    pub cube_index: u64,
    pub cube_sequential_index: u64,
    pub level: u32,
}

impl Location {
    pub fn new(level: u32, cube_sequential_index: u64, face_index: u8, position: u8) -> Self {
        Self { face_index, position, cube_index: cube_sequential_index, cube_sequential_index, level }
    }
}
