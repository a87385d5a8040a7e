//! Single-stream HTTPS GET into the replay folder.
//!
//! The body is streamed into a `.part` sibling of the destination and renamed
//! into place only after the transfer finished with a 2xx status. One attempt,
//! bounded by a total timeout; no retries.
//!
//! Redirects are followed here, not by curl: every `Location` goes through the
//! same [`AllowPolicy`] as the clicked URL before it is requested.

use anyhow::Context;
use std::path::Path;
use std::time::Duration;

use crate::config::DownloadConfig;
use crate::error::{HandlerError, HandlerResult};
use crate::logging::LogSink;
use crate::storage::{temp_path, StorageWriter};
use crate::url_model::{AllowPolicy, ReplayUrl};

const USER_AGENT: &str = concat!("wzreplay-handler/", env!("CARGO_PKG_VERSION"));

/// Redirect hops followed before giving up.
pub const MAX_REDIRECTS: usize = 10;

/// Result of one request.
enum Hop {
    /// 2xx; the body is in the writer.
    Done,
    /// 3xx with a `Location`, already resolved to an absolute URL.
    Redirect(String),
}

/// Streams a validated replay URL to disk.
#[derive(Debug, Clone)]
pub struct Downloader {
    timeout: Duration,
    connect_timeout: Duration,
}

impl Downloader {
    pub fn new(cfg: &DownloadConfig) -> Self {
        Self {
            timeout: cfg.timeout(),
            connect_timeout: cfg.connect_timeout(),
        }
    }

    /// Downloads `url` to `dest`. Returns the number of bytes written.
    ///
    /// Redirect targets must pass `policy`; a rejected hop is a
    /// [`HandlerError::Validation`] and nothing is requested from it.
    /// On any failure nothing appears at `dest`; the `.part` file is removed
    /// best-effort.
    pub fn fetch(
        &self,
        url: &ReplayUrl,
        policy: &AllowPolicy,
        dest: &Path,
        log: &dyn LogSink,
    ) -> HandlerResult<u64> {
        log.info(&format!("Downloading: {}", url));
        let tp = temp_path(dest);
        let mut current = url.clone();

        for _ in 0..=MAX_REDIRECTS {
            let mut writer = StorageWriter::create(&tp).map_err(HandlerError::Filesystem)?;
            match self.transfer(current.as_str(), &mut writer) {
                Ok(Hop::Done) => {
                    let written = writer.finalize(dest).map_err(HandlerError::Filesystem)?;
                    log.info(&format!("Saved to: {}", dest.display()));
                    return Ok(written);
                }
                Ok(Hop::Redirect(next)) => {
                    writer.discard();
                    current = policy.check(&next).map_err(|reason| {
                        HandlerError::Validation {
                            url: next.clone(),
                            reason: format!("redirect from {}: {}", current, reason),
                        }
                    })?;
                    log.info(&format!("Redirected to: {}", current));
                }
                Err(e) => {
                    log.warn(&format!(
                        "Discarding partial download ({} bytes) at {}",
                        writer.written(),
                        writer.temp_path().display()
                    ));
                    writer.discard();
                    return Err(e);
                }
            }
        }

        Err(HandlerError::Transfer(anyhow::anyhow!(
            "more than {} redirects starting at {}",
            MAX_REDIRECTS,
            url
        )))
    }

    fn transfer(&self, url: &str, writer: &mut StorageWriter) -> HandlerResult<Hop> {
        let mut easy = curl::easy::Easy::new();
        self.configure(&mut easy, url).map_err(curl_error)?;

        let mut storage_err: Option<anyhow::Error> = None;
        let performed = {
            let mut transfer = easy.transfer();
            transfer
                .write_function(|data| match writer.append(data) {
                    Ok(()) => Ok(data.len()),
                    Err(e) => {
                        storage_err = Some(e);
                        Ok(0) // abort transfer
                    }
                })
                .map_err(curl_error)?;
            transfer.perform()
        };

        if let Some(e) = storage_err {
            return Err(HandlerError::Filesystem(e));
        }
        performed
            .context("GET request failed")
            .map_err(HandlerError::Transfer)?;

        let code = easy
            .response_code()
            .context("no response code")
            .map_err(HandlerError::Transfer)?;
        if (300..400).contains(&code) {
            let location = easy.redirect_url().map_err(curl_error)?;
            return match location {
                Some(next) => Ok(Hop::Redirect(next.to_string())),
                None => Err(HandlerError::Transfer(anyhow::anyhow!(
                    "GET {} returned HTTP {} without a Location",
                    url,
                    code
                ))),
            };
        }
        if !(200..300).contains(&code) {
            return Err(HandlerError::Transfer(anyhow::anyhow!(
                "GET {} returned HTTP {}",
                url,
                code
            )));
        }
        Ok(Hop::Done)
    }

    fn configure(&self, easy: &mut curl::easy::Easy, url: &str) -> Result<(), curl::Error> {
        easy.url(url)?;
        easy.useragent(USER_AGENT)?;
        easy.follow_location(false)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(self.timeout)?;
        easy.low_speed_limit(1024)?;
        easy.low_speed_time(Duration::from_secs(60))?;
        Ok(())
    }
}

fn curl_error(e: curl::Error) -> HandlerError {
    HandlerError::Transfer(anyhow::Error::new(e))
}
