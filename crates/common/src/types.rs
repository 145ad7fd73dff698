use serde::{Deserialize, Serialize};

/// Address of a voxel: shell index (innermost = 0), latitude band, longitude index.
///
/// Ordered so that collections keyed by coordinate iterate shell-major, which
/// keeps boundary and plate listings deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VoxelCoord {
    pub shell: usize,
    pub lat: usize,
    pub lon: usize,
}

impl VoxelCoord {
    pub fn new(shell: usize, lat: usize, lon: usize) -> Self {
        Self { shell, lat, lon }
    }
}

impl std::fmt::Display for VoxelCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}:{}:{}]", self.shell, self.lat, self.lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_shell_major() {
        let a = VoxelCoord::new(0, 9, 9);
        let b = VoxelCoord::new(1, 0, 0);
        assert!(a < b);
    }

    #[test]
    fn display_format() {
        assert_eq!(VoxelCoord::new(3, 1, 7).to_string(), "[3:1:7]");
    }
}
