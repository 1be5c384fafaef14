use anyhow::Context;
use placementcore::catalog::Transform;
use placementcore::persistence::{DeviceCapabilities, MappingStatus};
use rand::{rngs::StdRng, Rng};
use serde::{Deserialize, Serialize};

/// Describes the simulated room and how the AR tracker behaves in it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldProfile {
    pub seed: u64,
    pub feature_points: usize,
    /// Room size in metres (width, height, depth).
    pub extent: [f32; 3],
    pub mapping_status: MappingStatus,
    pub tracking_ready: bool,
    pub capture_delay_ms: u64,
    pub capabilities: DeviceCapabilities,
}

impl Default for WorldProfile {
    fn default() -> Self {
        Self {
            seed: 0,
            feature_points: 512,
            extent: [4.0, 2.6, 5.0],
            mapping_status: MappingStatus::Mapped,
            tracking_ready: true,
            capture_delay_ms: 25,
            capabilities: DeviceCapabilities::default(),
        }
    }
}

impl WorldProfile {
    fn normalized_extent(&self) -> [f32; 3] {
        self.extent.map(|side| if side.is_finite() && side > 0.1 { side } else { 0.1 })
    }

    pub fn center(&self) -> [f32; 3] {
        let [_, height, depth] = self.normalized_extent();
        [0.0, height / 2.0, -depth / 2.0]
    }

    pub fn room_extent(&self) -> [f32; 3] {
        self.normalized_extent()
    }
}

/// Scatters feature points over the floor and walls of the room.
pub fn scan_feature_points(profile: &WorldProfile, rng: &mut StdRng) -> anyhow::Result<Vec<[f32; 3]>> {
    let [width, height, depth] = profile.normalized_extent();
    let mut points = Vec::new();
    points
        .try_reserve(profile.feature_points)
        .context("allocating feature points for simulated scan")?;

    for index in 0..profile.feature_points {
        let x = rng.gen_range(-width / 2.0..width / 2.0);
        let z = rng.gen_range(-depth..0.0);
        let point = match index % 3 {
            // floor
            0 => [x, 0.0, z],
            // back wall
            1 => [x, rng.gen_range(0.0..height), -depth],
            _ => [x, rng.gen_range(0.0..height), z],
        };
        points.push(point);
    }

    Ok(points)
}

/// A floor pose somewhere inside the room, facing a random direction.
pub fn random_floor_pose(profile: &WorldProfile, rng: &mut StdRng) -> Transform {
    let [width, _, depth] = profile.normalized_extent();
    let x = rng.gen_range(-width / 2.0..width / 2.0);
    let z = rng.gen_range(-depth..0.0);
    let yaw: f32 = rng.gen_range(0.0..std::f32::consts::TAU);
    let (sin, cos) = yaw.sin_cos();

    let mut pose = Transform::from_translation(x, 0.0, z);
    pose.0[0] = cos;
    pose.0[2] = -sin;
    pose.0[8] = sin;
    pose.0[10] = cos;
    pose
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn scan_produces_requested_point_count_inside_room() {
        let profile = WorldProfile {
            feature_points: 300,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(7);
        let points = scan_feature_points(&profile, &mut rng).unwrap();
        assert_eq!(points.len(), 300);
        let [width, height, depth] = profile.room_extent();
        assert!(points.iter().all(|p| p[0].abs() <= width / 2.0
            && (0.0..=height).contains(&p[1])
            && (-depth..=0.0).contains(&p[2])));
    }

    #[test]
    fn same_seed_gives_same_pose() {
        let profile = WorldProfile::default();
        let a = random_floor_pose(&profile, &mut StdRng::seed_from_u64(3));
        let b = random_floor_pose(&profile, &mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
        assert_eq!(a.translation()[1], 0.0);
    }

    #[test]
    fn degenerate_extent_is_clamped() {
        let profile = WorldProfile {
            extent: [0.0, f32::NAN, -3.0],
            ..Default::default()
        };
        assert_eq!(profile.room_extent(), [0.1, 0.1, 0.1]);
    }
}
