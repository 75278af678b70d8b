//! libcurl-backed fetch capability.
//!
//! Each fetch runs the curl transfer on its own thread and hands body chunks
//! to the reader through a bounded channel, so the body is never buffered in
//! full and a slow reader applies backpressure to the transfer. `fetch`
//! returns once the first body bytes (or the end of an empty body) arrive;
//! anything that fails before that is a `FetchError`.

use std::io::{self, Read};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::classify::{classify_curl_error, curl_error_to_io};
use super::{Body, Fetcher};
use crate::error::{FetchError, FetchErrorKind};
use crate::target::Target;

const MAX_REDIRECTIONS: u32 = 10;

/// Body chunks buffered between the transfer thread and the reader.
const BODY_CHANNEL_CHUNKS: usize = 16;

enum Event {
    Chunk(Vec<u8>),
    Done,
    Failed(curl::Error),
}

/// HTTP(S) GET via libcurl with a single total timeout per request
/// (connect, headers and body). Follows redirects; does not look at status codes.
#[derive(Debug, Clone)]
pub struct CurlFetcher {
    timeout: Duration,
    connect_timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl CurlFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            connect_timeout: None,
            user_agent: None,
        }
    }

    /// Separate bound on connection setup; capped at the total timeout.
    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = Some(connect_timeout);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Runs on the transfer thread. The final event is always sent, even if
    /// the reader has gone away.
    fn transfer(&self, url: &str, tx: SyncSender<Event>) {
        let event = match self.perform(url, &tx) {
            Ok(()) => Event::Done,
            Err(e) => Event::Failed(e),
        };
        let _ = tx.send(event);
    }

    fn perform(&self, url: &str, tx: &SyncSender<Event>) -> Result<(), curl::Error> {
        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(MAX_REDIRECTIONS)?;
        easy.timeout(self.timeout)?;
        if let Some(connect) = self.connect_timeout {
            easy.connect_timeout(connect.min(self.timeout))?;
        }
        if let Some(ua) = &self.user_agent {
            easy.useragent(ua)?;
        }

        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            // Receiver dropped: the reader stopped early, abort the transfer.
            match tx.send(Event::Chunk(data.to_vec())) {
                Ok(()) => Ok(data.len()),
                Err(_) => Ok(0),
            }
        })?;
        transfer.perform()
    }
}

impl Fetcher for CurlFetcher {
    fn fetch(&self, target: &Target) -> Result<Body, FetchError> {
        let (tx, rx) = mpsc::sync_channel(BODY_CHANNEL_CHUNKS);
        let fetcher = self.clone();
        let url = target.as_str().to_string();
        let handle = thread::Builder::new()
            .name("urlsum-transfer".into())
            .spawn(move || fetcher.transfer(&url, tx))
            .map_err(|e| FetchError::new(target.clone(), FetchErrorKind::Other, e))?;

        match rx.recv() {
            Ok(Event::Chunk(first)) => Ok(Box::new(CurlBody::new(rx, handle, first, false))),
            Ok(Event::Done) => Ok(Box::new(CurlBody::new(rx, handle, Vec::new(), true))),
            Ok(Event::Failed(e)) => {
                let _ = handle.join();
                tracing::debug!("fetch {} failed before body: {}", target, e);
                Err(FetchError::new(target.clone(), classify_curl_error(&e), e))
            }
            Err(_) => {
                let _ = handle.join();
                Err(FetchError::new(
                    target.clone(),
                    FetchErrorKind::Other,
                    "transfer thread exited without a result",
                ))
            }
        }
    }
}

/// Reader side of a running transfer. Dropping it aborts the transfer and
/// joins the transfer thread.
struct CurlBody {
    rx: Option<Receiver<Event>>,
    chunk: Vec<u8>,
    pos: usize,
    finished: bool,
    handle: Option<JoinHandle<()>>,
}

impl CurlBody {
    fn new(rx: Receiver<Event>, handle: JoinHandle<()>, first: Vec<u8>, finished: bool) -> Self {
        Self {
            rx: Some(rx),
            chunk: first,
            pos: 0,
            finished,
            handle: Some(handle),
        }
    }
}

impl Read for CurlBody {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            if self.pos < self.chunk.len() {
                let n = buf.len().min(self.chunk.len() - self.pos);
                buf[..n].copy_from_slice(&self.chunk[self.pos..self.pos + n]);
                self.pos += n;
                return Ok(n);
            }
            if self.finished || buf.is_empty() {
                return Ok(0);
            }
            let Some(rx) = self.rx.as_ref() else {
                return Ok(0);
            };
            match rx.recv() {
                Ok(Event::Chunk(chunk)) => {
                    self.chunk = chunk;
                    self.pos = 0;
                }
                Ok(Event::Done) => self.finished = true,
                Ok(Event::Failed(e)) => {
                    self.finished = true;
                    return Err(curl_error_to_io(e));
                }
                Err(_) => {
                    self.finished = true;
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "transfer ended without completing",
                    ));
                }
            }
        }
    }
}

impl Drop for CurlBody {
    fn drop(&mut self) {
        // Disconnect first so a transfer blocked on a full channel aborts.
        drop(self.rx.take());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
