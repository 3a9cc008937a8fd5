use {
    base::{Rect, Vec2},
    serde::{Deserialize, Serialize},
};

/// Number of keypoints in the COCO pose layout.
pub const COCO_KEYPOINT_COUNT: usize = 17;

/// COCO keypoint indices for a human pose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keypoint {
    Nose = 0,
    LeftEye = 1,
    RightEye = 2,
    LeftEar = 3,
    RightEar = 4,
    LeftShoulder = 5,
    RightShoulder = 6,
    LeftElbow = 7,
    RightElbow = 8,
    LeftWrist = 9,
    RightWrist = 10,
    LeftHip = 11,
    RightHip = 12,
    LeftKnee = 13,
    RightKnee = 14,
    LeftAnkle = 15,
    RightAnkle = 16,
}

impl From<Keypoint> for u8 {
    fn from(keypoint: Keypoint) -> u8 {
        keypoint as u8
    }
}

impl TryFrom<u8> for Keypoint {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Keypoint::Nose),
            1 => Ok(Keypoint::LeftEye),
            2 => Ok(Keypoint::RightEye),
            3 => Ok(Keypoint::LeftEar),
            4 => Ok(Keypoint::RightEar),
            5 => Ok(Keypoint::LeftShoulder),
            6 => Ok(Keypoint::RightShoulder),
            7 => Ok(Keypoint::LeftElbow),
            8 => Ok(Keypoint::RightElbow),
            9 => Ok(Keypoint::LeftWrist),
            10 => Ok(Keypoint::RightWrist),
            11 => Ok(Keypoint::LeftHip),
            12 => Ok(Keypoint::RightHip),
            13 => Ok(Keypoint::LeftKnee),
            14 => Ok(Keypoint::RightKnee),
            15 => Ok(Keypoint::LeftAnkle),
            16 => Ok(Keypoint::RightAnkle),
            _ => Err(format!(
                "invalid keypoint index: {}, must be in range 0-16",
                value
            )),
        }
    }
}

/// Axis-aligned box in logical coordinates, `[x1, y1, x2, y2]` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn top_left(&self) -> Vec2<f32> {
        Vec2::new(self.x1, self.y1)
    }

    pub fn bottom_right(&self) -> Vec2<f32> {
        Vec2::new(self.x2, self.y2)
    }

    pub fn rect(&self) -> Rect<f32> {
        Rect::from_min_max(self.top_left(), self.bottom_right())
    }
}

impl From<[f32; 4]> for BoundingBox {
    fn from(v: [f32; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<BoundingBox> for [f32; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.x1, b.y1, b.x2, b.y2]
    }
}

/// One pose sample, `[id, x, y, conf]` on the wire.
///
/// The backend serialises the id as a number; fractional or out-of-range ids
/// reject the message.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 4]", into = "[f64; 4]")]
pub struct Landmark {
    pub id: u8,
    pub position: Vec2<f32>,
    pub confidence: f32,
}

impl Landmark {
    pub fn new(id: u8, x: f32, y: f32, confidence: f32) -> Self {
        Self {
            id,
            position: Vec2::new(x, y),
            confidence,
        }
    }

    /// The COCO keypoint this sample belongs to, if the id names one.
    pub fn keypoint(&self) -> Option<Keypoint> {
        Keypoint::try_from(self.id).ok()
    }
}

impl TryFrom<[f64; 4]> for Landmark {
    type Error = String;

    fn try_from(v: [f64; 4]) -> Result<Self, Self::Error> {
        let id = v[0];
        if id.fract() != 0.0 || !(0.0..=u8::MAX as f64).contains(&id) {
            return Err(format!("invalid landmark id: {}", id));
        }
        Ok(Self::new(id as u8, v[1] as f32, v[2] as f32, v[3] as f32))
    }
}

impl From<Landmark> for [f64; 4] {
    fn from(l: Landmark) -> Self {
        [
            l.id as f64,
            l.position.x as f64,
            l.position.y as f64,
            l.confidence as f64,
        ]
    }
}

/// One tracked subject in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub id: i64,
    #[serde(rename = "box")]
    pub bbox: BoundingBox,
    #[serde(rename = "conf")]
    pub confidence: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotion: Option<String>,
    #[serde(
        rename = "emotion_conf",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub emotion_confidence: Option<f32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub landmarks: Vec<Landmark>,
}

impl Detection {
    pub fn new(id: i64, bbox: BoundingBox, confidence: f32) -> Self {
        Self {
            id,
            bbox,
            confidence,
            action: None,
            emotion: None,
            emotion_confidence: None,
            landmarks: Vec::new(),
        }
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn with_emotion(mut self, emotion: impl Into<String>, confidence: f32) -> Self {
        self.emotion = Some(emotion.into());
        self.emotion_confidence = Some(confidence);
        self
    }

    pub fn with_landmarks(mut self, landmarks: Vec<Landmark>) -> Self {
        self.landmarks = landmarks;
        self
    }

    /// Look up a landmark by id. When the same id appears more than once the
    /// last sample wins.
    pub fn landmark(&self, id: u8) -> Option<&Landmark> {
        self.landmarks.iter().rev().find(|l| l.id == id)
    }
}
