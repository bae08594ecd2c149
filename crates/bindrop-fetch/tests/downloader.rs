//! Retry and placement behavior of the blob downloader.
//!
//! Tests that exercise the backoff schedule run on a paused tokio clock, so the
//! 2/4/8/16/32 second waits are observed on virtual time.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use bindrop_fetch::{BoxStream, Downloader, Error, HttpClient};
use bytes::Bytes;
use tempfile::tempdir;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy)]
enum Fault {
    /// Fails before any body bytes arrive.
    Connect,
    /// Delivers half the body, then drops the connection.
    MidStream,
    /// Rejects the URL outright.
    BadUrl,
}

struct ScriptedClient {
    body: Bytes,
    faults: Mutex<VecDeque<Fault>>,
    calls: Mutex<Vec<Instant>>,
}

impl ScriptedClient {
    fn new(body: &'static [u8], faults: impl IntoIterator<Item = Fault>) -> Self {
        Self {
            body: Bytes::from_static(body),
            faults: Mutex::new(faults.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn call_times(&self) -> Vec<Instant> { self.calls.lock().unwrap().clone() }
}

impl HttpClient for ScriptedClient {
    type Error = Error;

    async fn stream(
        &self,
        url: &str,
    ) -> Result<BoxStream<'static, Result<Bytes, Error>>, Error> {
        self.calls.lock().unwrap().push(Instant::now());
        let fault = self.faults.lock().unwrap().pop_front();

        match fault {
            Some(Fault::Connect) => Err(Error::Network("connection reset by peer".into())),
            Some(Fault::BadUrl) => Err(Error::InvalidUrl(url.to_string())),
            Some(Fault::MidStream) => {
                let half = self.body.slice(..self.body.len() / 2);
                let items = vec![Ok(half), Err(Error::Network("unexpected eof".into()))];
                Ok(Box::pin(futures_util::stream::iter(items)))
            }
            None => {
                let chunks: Vec<Result<Bytes, Error>> = self
                    .body
                    .chunks(4)
                    .map(|c| Ok(Bytes::copy_from_slice(c)))
                    .collect();
                Ok(Box::pin(futures_util::stream::iter(chunks)))
            }
        }
    }
}

const BODY: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

#[tokio::test]
async fn test_download_first_attempt() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("tool.dll");
    let downloader = Downloader::new(ScriptedClient::new(BODY, []));

    let outcome = downloader.download("https://blob/tool", &dest).await.unwrap();

    assert_eq!(outcome.attempts, 1);
    assert_eq!(outcome.bytes, BODY.len() as u64);
    assert_eq!(std::fs::read(&dest).unwrap(), BODY);
}

#[tokio::test(start_paused = true)]
async fn test_three_transient_failures_then_success() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("tool.dll");
    let downloader = Downloader::new(ScriptedClient::new(
        BODY,
        [Fault::MidStream, Fault::Connect, Fault::MidStream],
    ));

    let outcome = downloader.download("https://blob/tool", &dest).await.unwrap();

    assert_eq!(outcome.attempts, 4);
    assert_eq!(std::fs::read(&dest).unwrap(), BODY);

    let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1, "no residue from failed attempts");

    let times = downloader.client().call_times();
    let waits: Vec<u64> = times.windows(2).map(|w| (w[1] - w[0]).as_secs()).collect();
    assert_eq!(waits, vec![2, 4, 8]);
}

#[tokio::test(start_paused = true)]
async fn test_all_attempts_fail() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("tool.dll");
    let faults = [
        Fault::MidStream,
        Fault::Connect,
        Fault::MidStream,
        Fault::Connect,
        Fault::MidStream,
        Fault::MidStream,
    ];
    let downloader = Downloader::new(ScriptedClient::new(BODY, faults));

    let start = Instant::now();
    let err = downloader.download("https://blob/tool", &dest).await.unwrap_err();

    match &err {
        Error::DownloadFailed {
            url,
            path,
            attempts,
            source,
        } => {
            assert_eq!(url, "https://blob/tool");
            assert_eq!(path, &dest);
            assert_eq!(*attempts, 6);
            assert!(source.is_transient());
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!dest.exists(), "abandoned download must leave no file");
    assert_eq!(downloader.client().call_times().len(), 6);
    assert!(start.elapsed() >= Duration::from_secs(2 + 4 + 8 + 16 + 32));
}

#[tokio::test(start_paused = true)]
async fn test_existing_destination_is_not_overwritten() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("tool.dll");
    std::fs::write(&dest, b"already here").unwrap();
    let downloader = Downloader::new(ScriptedClient::new(BODY, []));

    let err = downloader.download("https://blob/tool", &dest).await.unwrap_err();

    assert!(matches!(err, Error::DownloadFailed { attempts: 1, .. }));
    assert_eq!(std::fs::read(&dest).unwrap(), b"already here");
    assert_eq!(downloader.client().call_times().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_invalid_url_is_not_retried() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("tool.dll");
    let downloader = Downloader::new(ScriptedClient::new(BODY, [Fault::BadUrl]));

    let err = downloader.download("not a url", &dest).await.unwrap_err();

    let Error::DownloadFailed { attempts, source, .. } = err else {
        panic!("expected DownloadFailed");
    };
    assert_eq!(attempts, 1);
    assert!(matches!(*source, Error::InvalidUrl(_)));
    assert!(!dest.exists());
}
