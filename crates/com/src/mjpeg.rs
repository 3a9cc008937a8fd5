//! Reader for the backend's `multipart/x-mixed-replace` video feed.
//!
//! Part headers and boundaries are not parsed. The byte stream is scanned for
//! JPEG start and end markers instead, which tolerates any boundary string.

use crate::ComError;

const SOI: [u8; 2] = [0xff, 0xd8];
const EOI: [u8; 2] = [0xff, 0xd9];

pub const DEFAULT_MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

/// Splits a byte stream into complete JPEG images.
#[derive(Debug)]
pub struct JpegScanner {
    buffer: Vec<u8>,
    max_frame_size: usize,
}

impl JpegScanner {
    pub fn new(max_frame_size: usize) -> Self {
        Self {
            buffer: Vec::new(),
            max_frame_size,
        }
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Take the next complete image out of the buffer, if there is one.
    pub fn next_frame(&mut self) -> Result<Option<Vec<u8>>, ComError> {
        let Some(start) = find(&self.buffer, &SOI, 0) else {
            // Keep a trailing 0xff, it may begin a marker.
            let keep = usize::from(self.buffer.last() == Some(&0xff));
            self.buffer.drain(..self.buffer.len() - keep);
            return Ok(None);
        };
        if start > 0 {
            self.buffer.drain(..start);
        }

        match find(&self.buffer, &EOI, SOI.len()) {
            Some(end) => {
                let frame: Vec<u8> = self.buffer.drain(..end + EOI.len()).collect();
                Ok(Some(frame))
            }
            None if self.buffer.len() > self.max_frame_size => {
                let len = self.buffer.len();
                self.buffer.clear();
                Err(ComError::MessageTooLarge(u32::try_from(len).unwrap_or(u32::MAX)))
            }
            None => Ok(None),
        }
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }
}

fn find(haystack: &[u8], needle: &[u8; 2], from: usize) -> Option<usize> {
    haystack
        .get(from..)?
        .windows(2)
        .position(|w| w == needle)
        .map(|i| i + from)
}

/// Pulls JPEG frames from a live `/video_feed` response.
pub struct MjpegReader {
    response: reqwest::Response,
    scanner: JpegScanner,
}

impl MjpegReader {
    pub async fn open(http: &reqwest::Client, url: &str) -> Result<Self, ComError> {
        let response = http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(ComError::Status(response.status().as_u16()));
        }
        log::info!("video feed open: {}", url);
        Ok(Self {
            response,
            scanner: JpegScanner::new(DEFAULT_MAX_FRAME_SIZE),
        })
    }

    /// Next complete JPEG, or `ComError::ConnectionClosed` at end of stream.
    pub async fn next_frame(&mut self) -> Result<Vec<u8>, ComError> {
        loop {
            if let Some(frame) = self.scanner.next_frame()? {
                return Ok(frame);
            }
            match self.response.chunk().await? {
                Some(chunk) => self.scanner.push(&chunk),
                None => return Err(ComError::ConnectionClosed),
            }
        }
    }
}
