use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Number of keypoints produced per pose.
pub const KEYPOINT_COUNT: usize = 17;

/// Body part identifiers in the model's canonical output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyPart {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

impl BodyPart {
    /// All body parts, indexed by their position in a [`Pose`].
    pub const ALL: [BodyPart; KEYPOINT_COUNT] = [
        Self::Nose,
        Self::LeftEye,
        Self::RightEye,
        Self::LeftEar,
        Self::RightEar,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
    ];

    /// Index of this part within a pose's keypoint array.
    pub fn index(self) -> usize {
        self as usize
    }

    /// True for the five head keypoints (nose, eyes, ears).
    pub fn is_face(self) -> bool {
        self.index() < Self::LeftShoulder.index()
    }

    /// Human-readable display name.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Nose => "Nose",
            Self::LeftEye => "Left Eye",
            Self::RightEye => "Right Eye",
            Self::LeftEar => "Left Ear",
            Self::RightEar => "Right Ear",
            Self::LeftShoulder => "Left Shoulder",
            Self::RightShoulder => "Right Shoulder",
            Self::LeftElbow => "Left Elbow",
            Self::RightElbow => "Right Elbow",
            Self::LeftWrist => "Left Wrist",
            Self::RightWrist => "Right Wrist",
            Self::LeftHip => "Left Hip",
            Self::RightHip => "Right Hip",
            Self::LeftKnee => "Left Knee",
            Self::RightKnee => "Right Knee",
            Self::LeftAnkle => "Left Ankle",
            Self::RightAnkle => "Right Ankle",
        }
    }
}

impl fmt::Display for BodyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Two body parts joined by a bone when both are confidently detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoneEdge(pub BodyPart, pub BodyPart);

impl BoneEdge {
    /// True if this edge joins `a` and `b`, in either order.
    pub fn connects(self, a: BodyPart, b: BodyPart) -> bool {
        (self.0 == a && self.1 == b) || (self.0 == b && self.1 == a)
    }
}

/// The fixed skeleton: arms, shoulder and hip girdles, torso sides, legs.
pub const BONES: [BoneEdge; 12] = [
    BoneEdge(BodyPart::LeftWrist, BodyPart::LeftElbow),
    BoneEdge(BodyPart::LeftElbow, BodyPart::LeftShoulder),
    BoneEdge(BodyPart::LeftShoulder, BodyPart::RightShoulder),
    BoneEdge(BodyPart::RightShoulder, BodyPart::RightElbow),
    BoneEdge(BodyPart::RightElbow, BodyPart::RightWrist),
    BoneEdge(BodyPart::LeftShoulder, BodyPart::LeftHip),
    BoneEdge(BodyPart::LeftHip, BodyPart::RightHip),
    BoneEdge(BodyPart::RightHip, BodyPart::RightShoulder),
    BoneEdge(BodyPart::LeftHip, BodyPart::LeftKnee),
    BoneEdge(BodyPart::LeftKnee, BodyPart::LeftAnkle),
    BoneEdge(BodyPart::RightHip, BodyPart::RightKnee),
    BoneEdge(BodyPart::RightKnee, BodyPart::RightAnkle),
];

/// A point in model-input pixel coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A detected body part with its confidence score in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Keypoint {
    pub body_part: BodyPart,
    pub position: Position,
    pub score: f32,
}

/// Result of one inference call: all 17 keypoints in canonical order plus
/// the diagnostics shown in the overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pose {
    keypoints: [Keypoint; KEYPOINT_COUNT],
    score: f32,
    inference_time: Duration,
    device: String,
}

impl Pose {
    /// Build a pose by asking `locate` for the position and score of each
    /// body part. Keypoint order always follows [`BodyPart::ALL`].
    pub fn from_fn(
        score: f32,
        device: impl Into<String>,
        inference_time: Duration,
        mut locate: impl FnMut(BodyPart) -> (Position, f32),
    ) -> Self {
        let keypoints = std::array::from_fn(|i| {
            let body_part = BodyPart::ALL[i];
            let (position, score) = locate(body_part);
            Keypoint {
                body_part,
                position,
                score,
            }
        });
        Self {
            keypoints,
            score,
            inference_time,
            device: device.into(),
        }
    }

    pub fn keypoints(&self) -> &[Keypoint; KEYPOINT_COUNT] {
        &self.keypoints
    }

    pub fn keypoint(&self, part: BodyPart) -> &Keypoint {
        &self.keypoints[part.index()]
    }

    /// Overall pose confidence.
    pub fn score(&self) -> f32 {
        self.score
    }

    pub fn inference_time(&self) -> Duration {
        self.inference_time
    }

    /// Label of the device the model ran on (e.g. "CPU", "GPU").
    pub fn device(&self) -> &str {
        &self.device
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_parts_are_in_index_order() {
        for (i, part) in BodyPart::ALL.iter().enumerate() {
            assert_eq!(part.index(), i);
        }
    }

    #[test]
    fn face_parts_are_the_first_five() {
        let face: Vec<_> = BodyPart::ALL.iter().filter(|p| p.is_face()).collect();
        assert_eq!(face.len(), 5);
        assert!(!BodyPart::LeftShoulder.is_face());
    }

    #[test]
    fn skeleton_has_twelve_distinct_edges() {
        for (i, a) in BONES.iter().enumerate() {
            for b in &BONES[i + 1..] {
                assert!(!a.connects(b.0, b.1), "duplicate edge {a:?}");
            }
        }
    }

    #[test]
    fn bones_never_touch_the_face() {
        assert!(BONES.iter().all(|e| !e.0.is_face() && !e.1.is_face()));
    }

    #[test]
    fn edge_connects_in_either_order() {
        let edge = BoneEdge(BodyPart::LeftHip, BodyPart::RightHip);
        assert!(edge.connects(BodyPart::RightHip, BodyPart::LeftHip));
        assert!(!edge.connects(BodyPart::LeftHip, BodyPart::LeftKnee));
    }

    #[test]
    fn from_fn_fills_canonical_order() {
        let pose = Pose::from_fn(0.8, "CPU", Duration::from_millis(12), |part| {
            (Position::new(part.index() as f32, 0.0), 0.5)
        });
        assert_eq!(pose.keypoint(BodyPart::RightAnkle).position.x, 16.0);
        assert_eq!(pose.keypoints()[3].body_part, BodyPart::LeftEar);
        assert_eq!(pose.device(), "CPU");
        assert_eq!(pose.inference_time(), Duration::from_millis(12));
    }

    #[test]
    fn pose_serialises_with_camel_case_keys() {
        let pose = Pose::from_fn(0.8, "GPU", Duration::ZERO, |_| (Position::default(), 1.0));
        let json = serde_json::to_value(&pose).unwrap();
        assert_eq!(json["keypoints"][5]["bodyPart"], "left_shoulder");
        assert!(json["keypoints"][5].get("body_part").is_none());
        assert_eq!(json["device"], "GPU");
        assert!(json["inferenceTime"].is_object());
    }
}
