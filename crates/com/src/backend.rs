use {
    crate::ComError,
    std::net::{Ipv6Addr, SocketAddr},
};

pub const DEFAULT_PORT: u16 = 8000;

pub const TELEMETRY_PATH: &str = "/ws/telemetry";
pub const VIDEO_FEED_PATH: &str = "/video_feed";
pub const CAMERA_TOGGLE_PATH: &str = "/camera/toggle";
pub const UPDATE_SETTINGS_PATH: &str = "/update_settings";
pub const VAULT_PATH: &str = "/vault";
pub const ANALYTICS_PATH: &str = "/analytics";
pub const HISTORY_PATH: &str = "/history";
pub const SNAPSHOT_PATH: &str = "/telemetry";

/// Location of the sensing backend. All endpoints hang off one host and port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backend {
    host: String,
    port: u16,
}

impl Default for Backend {
    fn default() -> Self {
        Self::new("localhost", DEFAULT_PORT)
    }
}

impl Backend {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn from_addr(addr: SocketAddr) -> Self {
        Self::new(addr.ip().to_string(), addr.port())
    }

    /// Parse `host` or `host:port`. The port defaults to 8000. IPv6 hosts are
    /// given bare (`::1`) or bracketed (`[::1]`, `[::1]:8001`).
    pub fn parse(text: &str) -> Result<Self, ComError> {
        let text = text.trim();
        if let Ok(addr) = text.parse::<SocketAddr>() {
            return Ok(Self::from_addr(addr));
        }
        if let Ok(ip) = text.parse::<Ipv6Addr>() {
            return Ok(Self::new(ip.to_string(), DEFAULT_PORT));
        }
        if let Some(rest) = text.strip_prefix('[') {
            let (host, port) = match rest.split_once(']') {
                Some((host, "")) => (host, DEFAULT_PORT),
                Some((host, port)) => match port.strip_prefix(':').map(str::parse::<u16>) {
                    Some(Ok(port)) => (host, port),
                    _ => return Err(ComError::InvalidEndpoint(format!("bad port in {text:?}"))),
                },
                None => return Err(ComError::InvalidEndpoint(format!("unclosed bracket in {text:?}"))),
            };
            return match host.parse::<Ipv6Addr>() {
                Ok(ip) => Ok(Self::new(ip.to_string(), port)),
                Err(_) => Err(ComError::InvalidEndpoint(format!("bad host in {text:?}"))),
            };
        }
        let (host, port) = match text.rsplit_once(':') {
            Some((host, port)) => {
                let port = port
                    .parse()
                    .map_err(|_| ComError::InvalidEndpoint(format!("bad port in {text:?}")))?;
                (host, port)
            }
            None => (text, DEFAULT_PORT),
        };
        if host.is_empty() || host.contains('/') {
            return Err(ComError::InvalidEndpoint(format!("bad host in {text:?}")));
        }
        Ok(Self::new(host, port))
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    fn authority(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// `ws://host:port/ws/telemetry`
    pub fn telemetry_uri(&self) -> Result<http::Uri, ComError> {
        let uri = format!("ws://{}{}", self.authority(), TELEMETRY_PATH);
        uri.parse()
            .map_err(|e| ComError::InvalidEndpoint(format!("{uri}: {e}")))
    }

    pub fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.authority(), path)
    }

    /// The stable locator of the pull-mode video stream.
    pub fn video_feed_url(&self) -> String {
        self.http_url(VIDEO_FEED_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoints() {
        let backend = Backend::default();
        assert_eq!(
            backend.telemetry_uri().expect("uri").to_string(),
            "ws://localhost:8000/ws/telemetry"
        );
        assert_eq!(backend.video_feed_url(), "http://localhost:8000/video_feed");
        assert_eq!(
            backend.http_url(CAMERA_TOGGLE_PATH),
            "http://localhost:8000/camera/toggle"
        );
    }

    #[test]
    fn test_parse() {
        assert_eq!(Backend::parse("edge-01").expect("host"), Backend::new("edge-01", 8000));
        assert_eq!(
            Backend::parse("10.0.0.5:9000").expect("addr"),
            Backend::new("10.0.0.5", 9000)
        );
        assert_eq!(Backend::parse("[::1]:8001").expect("v6"), Backend::new("::1", 8001));
        assert!(Backend::parse("edge:notaport").is_err());
    }

    #[test]
    fn test_parse_ipv6_default_port() {
        assert_eq!(Backend::parse("::1").expect("bare v6"), Backend::new("::1", 8000));
        assert_eq!(Backend::parse("[::1]").expect("bracketed v6"), Backend::new("::1", 8000));
        assert_eq!(
            Backend::parse("fe80::2").expect("bare v6").video_feed_url(),
            "http://[fe80::2]:8000/video_feed"
        );
        assert!(Backend::parse("[::1]x").is_err());
        assert!(Backend::parse("[::1").is_err());
        assert!(Backend::parse("[edge]:8000").is_err());
        assert!(Backend::parse("").is_err());
    }

    #[test]
    fn test_ipv6_authority() {
        let backend = Backend::new("::1", 8000);
        assert_eq!(backend.video_feed_url(), "http://[::1]:8000/video_feed");
    }
}
