use {
    base::logical_size,
    image::Surface,
    overlay::{Style, Viewport, draw_fault, draw_ops, draw_standby, render},
    telemetry::TelemetrySnapshot,
};

/// The video layer for one tick.
#[derive(Debug, Clone, Copy)]
pub enum Video<'a> {
    Fault(&'a str),
    Frame(&'a Surface),
    Standby,
}

/// Paint one presented frame onto `canvas`: the video layer, then the
/// detection overlay on top. A fault replaces both.
pub fn compose(
    canvas: &mut Surface,
    video: Video<'_>,
    snapshot: Option<&TelemetrySnapshot>,
    style: &Style,
) {
    match video {
        Video::Fault(status) => {
            canvas.fill([0, 0, 0]);
            draw_fault(canvas, status);
            return;
        }
        Video::Frame(frame) => {
            if frame.size() != canvas.size() {
                canvas.fill([0, 0, 0]);
            }
            canvas.blit(frame);
        }
        Video::Standby => draw_standby(canvas),
    }

    let Some(snapshot) = snapshot else {
        return;
    };
    let logical = logical_size();
    let viewport = Viewport::slice(logical, canvas.size().to_f32());
    let ops: Vec<_> = render(snapshot, logical)
        .iter()
        .map(|op| op.mapped(&viewport))
        .collect();
    draw_ops(canvas, &ops, style);
}
