use {
    crate::{Viewport, skeleton},
    base::{Rect, Vec2},
    telemetry::{Detection, TelemetrySnapshot},
};

/// Length of each arm of a corner bracket, in logical pixels.
pub const CORNER_ARM: f32 = 15.0;
/// Labels sit this far above the top edge of their box.
pub const LABEL_RISE: f32 = 6.0;
pub const JOINT_RADIUS: f32 = 3.0;

const UNKNOWN_ACTION: &str = "UNKNOWN";
const NEUTRAL_EMOTION: &str = "NEUTRAL";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

/// One primitive of the overlay. Every op carries the id of the detection it
/// belongs to.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Box {
        id: i64,
        rect: Rect<f32>,
    },
    /// An L-shaped bracket: `points[1]` is the corner, the others are the
    /// arm ends.
    Corner {
        id: i64,
        corner: Corner,
        points: [Vec2<f32>; 3],
    },
    /// Text whose baseline starts at `anchor`.
    Label {
        id: i64,
        anchor: Vec2<f32>,
        text: String,
    },
    Joint {
        id: i64,
        center: Vec2<f32>,
        radius: f32,
    },
    Bone {
        id: i64,
        from: Vec2<f32>,
        to: Vec2<f32>,
    },
}

impl DrawOp {
    pub fn id(&self) -> i64 {
        match self {
            DrawOp::Box { id, .. }
            | DrawOp::Corner { id, .. }
            | DrawOp::Label { id, .. }
            | DrawOp::Joint { id, .. }
            | DrawOp::Bone { id, .. } => *id,
        }
    }

    /// The same op mapped through `viewport`.
    pub fn mapped(&self, viewport: &Viewport) -> DrawOp {
        match self {
            DrawOp::Box { id, rect } => DrawOp::Box {
                id: *id,
                rect: viewport.map_rect(*rect),
            },
            DrawOp::Corner { id, corner, points } => DrawOp::Corner {
                id: *id,
                corner: *corner,
                points: points.map(|p| viewport.map_point(p)),
            },
            DrawOp::Label { id, anchor, text } => DrawOp::Label {
                id: *id,
                anchor: viewport.map_point(*anchor),
                text: text.clone(),
            },
            DrawOp::Joint { id, center, radius } => DrawOp::Joint {
                id: *id,
                center: viewport.map_point(*center),
                radius: viewport.map_length(*radius),
            },
            DrawOp::Bone { id, from, to } => DrawOp::Bone {
                id: *id,
                from: viewport.map_point(*from),
                to: viewport.map_point(*to),
            },
        }
    }
}

/// `ID_<id> [<ACTION>]`, plus ` // <EMOTION>` for any emotion but neutral.
pub fn label_text(detection: &Detection) -> String {
    let action = detection
        .action
        .as_deref()
        .filter(|action| !action.is_empty())
        .unwrap_or(UNKNOWN_ACTION);
    let mut text = format!("ID_{} [{}]", detection.id, action);
    if let Some(emotion) = detection.emotion.as_deref() {
        if !emotion.is_empty() && emotion != NEUTRAL_EMOTION {
            text.push_str(" // ");
            text.push_str(emotion);
        }
    }
    text
}

/// Build the overlay for `snapshot`.
///
/// Detection geometry is authored in the 1280x720 logical frame. The ops are
/// expressed in a frame of size `logical`; pass `base::logical_size()` to get
/// them unscaled. Detections keep their order; nothing is filtered or merged.
pub fn render(snapshot: &TelemetrySnapshot, logical: Vec2<f32>) -> Vec<DrawOp> {
    let authored = base::logical_size();
    let scale = Vec2::new(logical.x / authored.x, logical.y / authored.y);
    let to_frame = |p: Vec2<f32>| p * scale;
    // Lengths follow the tighter axis so joints stay round.
    let joint_radius = JOINT_RADIUS * scale.x.min(scale.y);

    let mut ops = Vec::new();
    for detection in &snapshot.detections {
        push_detection(&mut ops, detection, &to_frame, joint_radius);
    }
    ops
}

fn push_detection(
    ops: &mut Vec<DrawOp>,
    detection: &Detection,
    to_frame: &impl Fn(Vec2<f32>) -> Vec2<f32>,
    joint_radius: f32,
) {
    let id = detection.id;
    let b = detection.bbox;
    let (x1, y1, x2, y2) = (b.x1, b.y1, b.x2, b.y2);

    ops.push(DrawOp::Box {
        id,
        rect: Rect::from_min_max(to_frame(b.top_left()), to_frame(b.bottom_right())),
    });

    let brackets = [
        (
            Corner::TopLeft,
            [(x1, y1 + CORNER_ARM), (x1, y1), (x1 + CORNER_ARM, y1)],
        ),
        (
            Corner::TopRight,
            [(x2 - CORNER_ARM, y1), (x2, y1), (x2, y1 + CORNER_ARM)],
        ),
        (
            Corner::BottomRight,
            [(x2, y2 - CORNER_ARM), (x2, y2), (x2 - CORNER_ARM, y2)],
        ),
        (
            Corner::BottomLeft,
            [(x1 + CORNER_ARM, y2), (x1, y2), (x1, y2 - CORNER_ARM)],
        ),
    ];
    for (corner, points) in brackets {
        ops.push(DrawOp::Corner {
            id,
            corner,
            points: points.map(|(x, y)| to_frame(Vec2::new(x, y))),
        });
    }

    ops.push(DrawOp::Label {
        id,
        anchor: to_frame(Vec2::new(x1, y1 - LABEL_RISE)),
        text: label_text(detection),
    });

    if detection.landmarks.is_empty() {
        return;
    }
    for landmark in &detection.landmarks {
        ops.push(DrawOp::Joint {
            id,
            center: to_frame(landmark.position),
            radius: joint_radius,
        });
    }
    for bone in skeleton::links(&detection.landmarks) {
        ops.push(DrawOp::Bone {
            id,
            from: to_frame(bone.from.position),
            to: to_frame(bone.to.position),
        });
    }
}
