use {
    base::Vec2,
    com::{ComError, MjpegReader},
    image::{Surface, decode_frame},
    std::sync::Arc,
    tokio::{
        sync::watch,
        task::JoinHandle,
        time::{Duration, sleep},
    },
};

/// Wait between attempts to reopen the video feed.
pub const REOPEN_DELAY: Duration = Duration::from_millis(1000);

/// Reads the live video feed while the frame source is in pull mode and keeps
/// the newest decoded frame.
pub struct PullPresenter {
    url: String,
    latest: watch::Receiver<Option<Arc<Surface>>>,
    task: JoinHandle<()>,
}

impl PullPresenter {
    pub fn start(http: reqwest::Client, url: impl Into<String>, target: Vec2<usize>) -> Self {
        let url = url.into();
        let (tx, latest) = watch::channel(None);
        let task = tokio::spawn(run(http, url.clone(), target, tx));
        Self { url, latest, task }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn latest(&self) -> Option<Arc<Surface>> {
        self.latest.borrow().clone()
    }

    pub fn frames(&self) -> watch::Receiver<Option<Arc<Surface>>> {
        self.latest.clone()
    }
}

impl Drop for PullPresenter {
    fn drop(&mut self) {
        self.task.abort();
        log::debug!("video feed reader stopped");
    }
}

async fn run(
    http: reqwest::Client,
    url: String,
    target: Vec2<usize>,
    tx: watch::Sender<Option<Arc<Surface>>>,
) {
    loop {
        match read_feed(&http, &url, target, &tx).await {
            Ok(()) => return,
            Err(e) => log::warn!("video feed {}: {}", url, e),
        }
        sleep(REOPEN_DELAY).await;
    }
}

/// Returns Ok once nobody is watching any more.
async fn read_feed(
    http: &reqwest::Client,
    url: &str,
    target: Vec2<usize>,
    tx: &watch::Sender<Option<Arc<Surface>>>,
) -> Result<(), ComError> {
    let mut reader = MjpegReader::open(http, url).await?;
    loop {
        let jpeg = reader.next_frame().await?;
        match decode_frame(jpeg, target).await {
            Ok(surface) => {
                if tx.send(Some(Arc::new(surface))).is_err() {
                    return Ok(());
                }
            }
            // A bad frame keeps the previous one on screen.
            Err(e) => log::debug!("skipping video frame: {}", e),
        }
    }
}
