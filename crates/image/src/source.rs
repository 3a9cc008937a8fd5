use {
    crate::{ImageError, SharedSurface, decode_frame_blocking, surface::WeakSurface},
    base::{LOGICAL_HEIGHT, LOGICAL_WIDTH, Sequence, Stamped, Vec2},
    telemetry::{EncodedFrame, TelemetrySnapshot},
    tokio::task::JoinHandle,
};

pub const DEFAULT_PULL_URL: &str = "http://localhost:8000/video_feed";

#[derive(Debug, Clone)]
pub struct FrameSourceConfig {
    pull_url: String,
    target: Vec2<usize>,
}

impl Default for FrameSourceConfig {
    fn default() -> Self {
        Self {
            pull_url: DEFAULT_PULL_URL.to_string(),
            target: Vec2::new(LOGICAL_WIDTH, LOGICAL_HEIGHT),
        }
    }
}

impl FrameSourceConfig {
    pub fn with_pull_url(mut self, url: impl Into<String>) -> Self {
        self.pull_url = url.into();
        self
    }

    pub fn with_target(mut self, target: Vec2<usize>) -> Self {
        self.target = target;
        self
    }

    pub fn pull_url(&self) -> &str {
        &self.pull_url
    }

    pub fn target(&self) -> Vec2<usize> {
        self.target
    }
}

/// Which visual path the latest snapshot selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameMode {
    /// The camera reported an error; video and overlay are replaced by a
    /// fault indicator.
    Fault,
    /// The presenter reads the live video feed itself.
    Pull,
    /// Frames arrive inline and are painted onto the surface.
    Push,
    /// Nothing to show yet.
    Standby,
}

/// What the presenter should draw right now.
#[derive(Debug, Clone)]
pub enum CurrentFrame {
    Fault(String),
    Pull(String),
    Surface(SharedSurface),
    None,
}

/// Chooses between pull and push video and owns the push-mode surface.
pub struct FrameSource {
    config: FrameSourceConfig,
    surface: Option<SharedSurface>,
    sequence: Sequence,
    in_flight: Vec<JoinHandle<()>>,
    inline_protocol: bool,
    camera_active: bool,
    fault: Option<String>,
}

impl FrameSource {
    pub fn new(config: FrameSourceConfig) -> Self {
        let surface = SharedSurface::new(config.target());
        Self {
            config,
            surface: Some(surface),
            sequence: Sequence::new(),
            in_flight: Vec::new(),
            inline_protocol: false,
            camera_active: false,
            fault: None,
        }
    }

    pub fn config(&self) -> &FrameSourceConfig {
        &self.config
    }

    /// Take in a snapshot. An inline frame starts a decode in the background;
    /// call from within a tokio runtime.
    pub fn apply(&mut self, snapshot: &TelemetrySnapshot) -> FrameMode {
        self.in_flight.retain(|task| !task.is_finished());

        self.fault = snapshot.camera_fault().map(str::to_string);
        self.camera_active = snapshot.camera_active;

        if let Some(frame) = &snapshot.encoded_frame {
            if !self.inline_protocol {
                log::info!("inline frames detected, switching to push mode");
            }
            self.inline_protocol = true;
            self.spawn_decode(frame.clone());
        }

        self.mode()
    }

    pub fn mode(&self) -> FrameMode {
        if self.fault.is_some() {
            FrameMode::Fault
        } else if self.inline_protocol {
            FrameMode::Push
        } else if self.camera_active {
            FrameMode::Pull
        } else {
            FrameMode::Standby
        }
    }

    pub fn current_frame(&self) -> CurrentFrame {
        if let Some(fault) = &self.fault {
            return CurrentFrame::Fault(fault.clone());
        }
        if self.camera_active && !self.inline_protocol {
            return CurrentFrame::Pull(self.config.pull_url().to_string());
        }
        match &self.surface {
            Some(surface) if surface.is_painted() => CurrentFrame::Surface(surface.clone()),
            _ => CurrentFrame::None,
        }
    }

    /// True once any snapshot carried an inline frame.
    pub fn inline_protocol(&self) -> bool {
        self.inline_protocol
    }

    pub fn pending_decodes(&self) -> usize {
        self.in_flight
            .iter()
            .filter(|task| !task.is_finished())
            .count()
    }

    /// Wait for every decode started so far.
    pub async fn settle(&mut self) {
        for task in self.in_flight.drain(..) {
            if let Err(e) = task.await {
                log::warn!("frame decode task failed: {}", e);
            }
        }
    }

    /// Release the surface. Decodes still running finish without painting.
    pub fn close(&mut self) {
        if let Some(surface) = self.surface.take() {
            surface.release();
            log::debug!("frame surface released");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.surface.is_none()
    }

    fn spawn_decode(&mut self, frame: EncodedFrame) {
        let Some(surface) = &self.surface else {
            return;
        };
        let stamp = self.sequence.next();
        let weak = surface.downgrade();
        let target = self.config.target();

        let task = tokio::task::spawn_blocking(move || {
            match paint_frame(&frame, target, stamp, &weak) {
                Ok(true) => {}
                Ok(false) => log::debug!("discarding stale frame {}", stamp),
                Err(ImageError::Closed) => log::debug!("surface gone, dropping frame {}", stamp),
                Err(e) => log::warn!("dropping frame {}: {}", stamp, e),
            }
        });
        self.in_flight.push(task);
    }
}

impl Drop for FrameSource {
    fn drop(&mut self) {
        self.close();
    }
}

fn paint_frame(
    frame: &EncodedFrame,
    target: Vec2<usize>,
    stamp: u64,
    surface: &WeakSurface,
) -> Result<bool, ImageError> {
    let bytes = frame.bytes()?;
    let decoded = decode_frame_blocking(&bytes, target)?;
    let Some(surface) = surface.upgrade() else {
        return Err(ImageError::Closed);
    };
    surface.paint(Stamped::new(stamp, decoded))
}
