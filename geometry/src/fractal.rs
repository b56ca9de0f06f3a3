/// One step of a fractal address: a cube at `level` reached via `cube_index`. At the
/// leaf level (1), the step additionally names the face and position within it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DescentStep {
    pub level: u32,
    pub cube_index: u64,
    pub face_index: Option<u8>,
    pub position: Option<u8>,
}

pub type FractalAddress = Vec<DescentStep>;

/// Builds a block's fractal address from its ancestry — `(level, cube_index)` pairs
/// ordered from the highest known level down to level 1 — plus the leaf face index
/// and position within that level-1 cube.
pub fn build_fractal_address(ancestry: &[(u32, u64)], leaf_face_index: u8, leaf_position: u8) -> FractalAddress {
    ancestry
        .iter()
        .map(|&(level, cube_index)| {
            if level == 1 {
                DescentStep { level, cube_index, face_index: Some(leaf_face_index), position: Some(leaf_position) }
            } else {
                DescentStep { level, cube_index, face_index: None, position: None }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_level_carries_face_and_position() {
        let address = build_fractal_address(&[(2, 4), (1, 17)], 1, 5);
        assert_eq!(
            address,
            vec![
                DescentStep { level: 2, cube_index: 4, face_index: None, position: None },
                DescentStep { level: 1, cube_index: 17, face_index: Some(1), position: Some(5) },
            ]
        );
    }

    #[test]
    fn single_level_address() {
        let address = build_fractal_address(&[(1, 0)], 2, 3);
        assert_eq!(address, vec![DescentStep { level: 1, cube_index: 0, face_index: Some(2), position: Some(3) }]);
    }
}
