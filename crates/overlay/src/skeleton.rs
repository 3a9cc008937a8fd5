use telemetry::{Keypoint, Landmark};

/// Both endpoints of a bone must be more confident than this.
pub const MIN_CONFIDENCE: f32 = 0.5;

/// Limb and torso links drawn between pose landmarks, in drawing order.
pub const SKELETON_PAIRS: [(Keypoint, Keypoint); 12] = {
    use Keypoint::*;
    [
        (LeftShoulder, LeftElbow),
        (LeftElbow, LeftWrist),
        (RightShoulder, RightElbow),
        (RightElbow, RightWrist),
        (LeftHip, LeftKnee),
        (LeftKnee, LeftAnkle),
        (RightHip, RightKnee),
        (RightKnee, RightAnkle),
        (LeftShoulder, RightShoulder),
        (LeftHip, RightHip),
        (LeftShoulder, LeftHip),
        (RightShoulder, RightHip),
    ]
};

/// A drawn connection between two landmarks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bone {
    pub from: Landmark,
    pub to: Landmark,
}

impl Bone {
    pub fn ids(&self) -> (u8, u8) {
        (self.from.id, self.to.id)
    }
}

/// Bones that can be drawn from `landmarks`.
///
/// A pair yields a bone only when both landmarks are present and each is
/// more confident than `MIN_CONFIDENCE`; missing points are never guessed.
/// Landmarks may come in any order. If an id repeats, the last sample counts.
pub fn links(landmarks: &[Landmark]) -> impl Iterator<Item = Bone> + '_ {
    SKELETON_PAIRS.iter().filter_map(move |&(a, b)| {
        let from = find(landmarks, a)?;
        let to = find(landmarks, b)?;
        if from.confidence > MIN_CONFIDENCE && to.confidence > MIN_CONFIDENCE {
            Some(Bone {
                from: *from,
                to: *to,
            })
        } else {
            None
        }
    })
}

fn find(landmarks: &[Landmark], keypoint: Keypoint) -> Option<&Landmark> {
    let id = u8::from(keypoint);
    landmarks.iter().rev().find(|l| l.id == id)
}
