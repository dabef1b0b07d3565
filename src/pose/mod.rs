// Pose model — body parts, keypoints, skeleton edges, and the inference seam.

pub mod engine;
pub mod types;

pub use engine::{InferenceEngine, InferenceError};
pub use types::{BodyPart, BoneEdge, Keypoint, Pose, Position, BONES};
