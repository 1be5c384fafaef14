use serde::{Deserialize, Serialize};

use crate::catalog::PlacementRecord;
use crate::persistence::world::WorldMap;
use crate::prelude::{SceneError, SceneResult};

pub const SNAPSHOT_MAGIC: &[u8; 8] = b"HRZSCENE";
pub const SNAPSHOT_VERSION: u16 = 1;
/// Type tag for `SceneSnapshot`; the only payload kind a scene file may hold.
pub const SNAPSHOT_KIND: u8 = 1;

const HEADER_LEN: usize = SNAPSHOT_MAGIC.len() + 2 + 1;

/// Serialized world map plus the placements needed to rebuild placed objects
/// after a restore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneSnapshot {
    pub world_map: WorldMap,
    pub placements: Vec<PlacementRecord>,
}

impl SceneSnapshot {
    pub fn new(world_map: WorldMap, placements: Vec<PlacementRecord>) -> Self {
        Self {
            world_map,
            placements,
        }
    }

    /// `magic | version (u16 LE) | kind (u8) | JSON body`
    ///
    /// Maps holding NaN or infinite coordinates are refused; JSON would
    /// store them as `null` and the file could never be decoded.
    pub fn encode(&self) -> SceneResult<Vec<u8>> {
        if let Some(field) = non_finite_field(&self.world_map) {
            return Err(SceneError::Serialization(format!(
                "world map {} is not finite",
                field
            )));
        }
        let body =
            serde_json::to_vec(self).map_err(|err| SceneError::Serialization(err.to_string()))?;
        let mut bytes = Vec::with_capacity(HEADER_LEN + body.len());
        bytes.extend_from_slice(SNAPSHOT_MAGIC);
        bytes.extend_from_slice(&SNAPSHOT_VERSION.to_le_bytes());
        bytes.push(SNAPSHOT_KIND);
        bytes.extend_from_slice(&body);
        Ok(bytes)
    }

    /// Decodes strictly: foreign magic, any other version or kind, and
    /// bodies with missing or unknown fields are all rejected.
    pub fn decode(bytes: &[u8]) -> SceneResult<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(SceneError::Deserialization(format!(
                "snapshot is {} bytes, shorter than its header",
                bytes.len()
            )));
        }

        let (magic, rest) = bytes.split_at(SNAPSHOT_MAGIC.len());
        if magic != SNAPSHOT_MAGIC {
            return Err(SceneError::Deserialization(
                "not a scene snapshot (bad magic)".into(),
            ));
        }

        let version = u16::from_le_bytes([rest[0], rest[1]]);
        if version != SNAPSHOT_VERSION {
            return Err(SceneError::Deserialization(format!(
                "unsupported snapshot version {} (expected {})",
                version, SNAPSHOT_VERSION
            )));
        }

        let kind = rest[2];
        if kind != SNAPSHOT_KIND {
            return Err(SceneError::Deserialization(format!(
                "unexpected payload kind {}",
                kind
            )));
        }

        serde_json::from_slice(&rest[3..]).map_err(|err| SceneError::Deserialization(err.to_string()))
    }
}

fn non_finite_field(map: &WorldMap) -> Option<String> {
    let finite = |values: &[f32]| values.iter().all(|value| value.is_finite());
    if !finite(&map.center) {
        return Some("center".into());
    }
    if !finite(&map.extent) {
        return Some("extent".into());
    }
    if let Some(anchor) = map.anchors.iter().find(|anchor| !finite(&anchor.transform.0)) {
        return Some(format!("anchor {} transform", anchor.id));
    }
    map.feature_points
        .iter()
        .position(|point| !finite(point))
        .map(|index| format!("feature point {}", index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Anchor, AnchorId, CatalogModel, ModelCategory, PlacementId, Transform};
    use crate::prelude::ErrorKind;

    fn sample() -> SceneSnapshot {
        let anchor = Anchor::new(AnchorId("a-1".into()), Transform::from_translation(0.5, 0.0, -1.25));
        let world_map = WorldMap {
            center: [0.0, 0.0, -1.0],
            extent: [4.0, 2.5, 4.0],
            anchors: vec![anchor],
            feature_points: vec![[0.25, 0.0, -1.0], [1.0, 0.5, -2.0]],
        };
        let placements = vec![PlacementRecord {
            id: PlacementId(0),
            model: CatalogModel::new("m-1", "swan_chair", ModelCategory::Chair),
            anchor: Some(AnchorId("a-1".into())),
        }];
        SceneSnapshot::new(world_map, placements)
    }

    #[test]
    fn encoded_snapshot_starts_with_versioned_header() {
        let bytes = sample().encode().unwrap();
        assert_eq!(&bytes[..8], SNAPSHOT_MAGIC);
        assert_eq!(u16::from_le_bytes([bytes[8], bytes[9]]), SNAPSHOT_VERSION);
        assert_eq!(bytes[10], SNAPSHOT_KIND);
        assert_eq!(SceneSnapshot::decode(&bytes).unwrap(), sample());
    }

    #[test]
    fn non_finite_coordinates_are_not_encoded() {
        let mut snapshot = sample();
        snapshot.world_map.anchors[0].transform = Transform::from_translation(f32::NAN, 0.0, 0.0);
        let err = snapshot.encode().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Serialization);
        assert!(err.to_string().contains("a-1"));

        let mut snapshot = sample();
        snapshot.world_map.feature_points[1][2] = f32::NEG_INFINITY;
        assert_eq!(snapshot.encode().unwrap_err().kind(), ErrorKind::Serialization);

        let mut snapshot = sample();
        snapshot.world_map.extent[0] = f32::INFINITY;
        assert_eq!(snapshot.encode().unwrap_err().kind(), ErrorKind::Serialization);
    }

    #[test]
    fn future_version_is_rejected() {
        let mut bytes = sample().encode().unwrap();
        bytes[8..10].copy_from_slice(&2u16.to_le_bytes());
        let err = SceneSnapshot::decode(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Deserialization);
    }

    #[test]
    fn foreign_payloads_are_rejected() {
        let mut wrong_kind = sample().encode().unwrap();
        wrong_kind[10] = 7;
        assert!(SceneSnapshot::decode(&wrong_kind).is_err());

        assert!(SceneSnapshot::decode(b"{\"world_map\":{}}").is_err());
        assert!(SceneSnapshot::decode(b"HRZ").is_err());
        assert!(SceneSnapshot::decode(&[]).is_err());
    }

    #[test]
    fn body_of_another_type_is_rejected() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(SNAPSHOT_MAGIC);
        bytes.extend_from_slice(&SNAPSHOT_VERSION.to_le_bytes());
        bytes.push(SNAPSHOT_KIND);
        bytes.extend_from_slice(
            br#"{"world_map":{"center":[0,0,0],"extent":[0,0,0],"anchors":[],"feature_points":[]},"placements":[],"script":"rm -rf"}"#,
        );
        let err = SceneSnapshot::decode(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Deserialization);
    }
}
