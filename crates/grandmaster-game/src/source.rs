//! Camera frame sources.

use crate::{CameraConfig, ImageFetchError};
use grandmaster_core::OutputSink;
use image::RgbImage;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

/// Produces one undistorted RGB frame per call.
pub trait ImageSource {
    fn fetch(&mut self) -> Result<RgbImage, ImageFetchError>;
}

impl<T: ImageSource + ?Sized> ImageSource for Box<T> {
    fn fetch(&mut self) -> Result<RgbImage, ImageFetchError> {
        (**self).fetch()
    }
}

/// PNG over HTTP from the camera service on the Raspberry Pi.
pub struct HttpImageSource {
    client: reqwest::blocking::Client,
    url: String,
}

impl HttpImageSource {
    pub fn new(config: &CameraConfig) -> Result<Self, ImageFetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl ImageSource for HttpImageSource {
    fn fetch(&mut self) -> Result<RgbImage, ImageFetchError> {
        let bytes = self
            .client
            .get(&self.url)
            .send()?
            .error_for_status()?
            .bytes()?;
        Ok(image::load_from_memory(&bytes)?.to_rgb8())
    }
}

/// Re-reads an image file on every fetch.
#[derive(Clone, Debug)]
pub struct FileImageSource {
    path: PathBuf,
}

impl FileImageSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ImageSource for FileImageSource {
    fn fetch(&mut self) -> Result<RgbImage, ImageFetchError> {
        Ok(image::open(&self.path)?.to_rgb8())
    }
}

/// Fetch a frame, retrying up to `retries` more times with `delay` between
/// attempts.
pub fn fetch_with_retry<S: ImageSource + ?Sized>(
    source: &mut S,
    retries: usize,
    delay: Duration,
    sink: &dyn OutputSink,
) -> Result<RgbImage, ImageFetchError> {
    let mut remaining = retries;
    loop {
        match source.fetch() {
            Ok(frame) => return Ok(frame),
            Err(err) if remaining == 0 => {
                return Err(ImageFetchError::Exhausted {
                    attempts: retries + 1,
                    last: Box::new(err),
                })
            }
            Err(err) => {
                sink.emit(&format!(
                    "Failed to fetch image, retrying {remaining} more times in {} seconds! {err}",
                    delay.as_secs()
                ));
                remaining -= 1;
                thread::sleep(delay);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grandmaster_core::MemorySink;
    use std::io;

    struct Flaky {
        failures_left: usize,
        calls: usize,
    }

    impl ImageSource for Flaky {
        fn fetch(&mut self) -> Result<RgbImage, ImageFetchError> {
            self.calls += 1;
            if self.failures_left > 0 {
                self.failures_left -= 1;
                return Err(io::Error::new(io::ErrorKind::TimedOut, "camera busy").into());
            }
            Ok(RgbImage::new(8, 8))
        }
    }

    #[test]
    fn recovers_within_budget() {
        let sink = MemorySink::new();
        let mut source = Flaky {
            failures_left: 5,
            calls: 0,
        };
        let frame = fetch_with_retry(&mut source, 5, Duration::ZERO, &sink).expect("frame");
        assert_eq!(frame.dimensions(), (8, 8));
        assert_eq!(source.calls, 6);
        assert_eq!(sink.lines().len(), 5);
        assert!(sink.contains("retrying 5 more times"));
    }

    #[test]
    fn exhaustion_reports_attempts() {
        let sink = MemorySink::new();
        let mut source = Flaky {
            failures_left: 10,
            calls: 0,
        };
        match fetch_with_retry(&mut source, 2, Duration::ZERO, &sink) {
            Err(ImageFetchError::Exhausted { attempts, .. }) => assert_eq!(attempts, 3),
            other => panic!("expected exhaustion, got {:?}", other.map(|f| f.dimensions())),
        }
        assert_eq!(source.calls, 3);
    }

    #[test]
    fn file_source_reads_png() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("frame.png");
        RgbImage::new(16, 9).save(&path).expect("save");
        let mut source = FileImageSource::new(&path);
        assert_eq!(source.fetch().expect("fetch").dimensions(), (16, 9));

        let mut missing = FileImageSource::new(dir.path().join("nope.png"));
        assert!(missing.fetch().is_err());
    }
}
