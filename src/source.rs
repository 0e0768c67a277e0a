//! Stop-info sources.
//!
//! A source turns the positional CLI argument into snapshots:
//!
//! - [`ProxySource`]: asks the transport proxy over TCP for a stop page URL
//! - [`FileSource`]: reads a saved stop-info JSON document (debugging)
//!
//! Sources implement [`StopInfoSource`] so the poller can drive either one,
//! or a scripted stand-in in tests.

use crate::error::{FetchError, StopboardError};
use crate::types::Snapshot;
use serde_json::Value;
use std::io::{ErrorKind, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Stop page URL prefix used to expand `stopid:<id>`.
pub const STOP_URL_PREFIX: &str = "https://yandex.ru/maps/?masstransit[stopId]=";

/// Frames on the proxy socket are NUL-terminated JSON documents.
const FRAME_DELIMITER: u8 = 0;

/// Longest exchange ever waited for, whatever timeout is asked for.
const MAX_EXCHANGE: Duration = Duration::from_secs(24 * 60 * 60);

/// A frame growing past this without a delimiter is rejected.
pub const MAX_FRAME_BYTES: usize = 16 * 1024 * 1024;

/// Trait for snapshot sources.
///
/// Sources are moved into the poller thread, hence `Send`.
pub trait StopInfoSource: Send {
    /// Short identifier used in log lines.
    fn id(&self) -> &'static str;

    /// Human-readable origin shown in the dashboard footer.
    fn describe(&self) -> String;

    /// Retrieves one snapshot, giving up after `timeout`.
    fn fetch(&mut self, timeout: Duration) -> Result<Snapshot, FetchError>;
}

/// A boxed source for dynamic dispatch.
pub type BoxedSource = Box<dyn StopInfoSource>;

/// What the positional `source` argument designates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocator {
    /// A stop page URL, resolved through the proxy.
    Url(String),
    /// A local JSON document.
    File(PathBuf),
}

impl SourceLocator {
    /// Interprets a full URL, a `stopid:<id>` shorthand, or a filename.
    pub fn parse(arg: &str) -> Result<Self, StopboardError> {
        let arg = arg.trim();
        if arg.starts_with("http://") || arg.starts_with("https://") {
            Ok(Self::Url(arg.to_string()))
        } else if let Some(id) = arg.strip_prefix("stopid:") {
            Ok(Self::Url(format!("{STOP_URL_PREFIX}{id}")))
        } else if arg.is_empty() {
            Err(StopboardError::MissingSource)
        } else {
            Ok(Self::File(PathBuf::from(arg)))
        }
    }

    /// Builds the matching source; URLs go through the proxy at `host:port`.
    #[must_use]
    pub fn into_source(self, host: &str, port: u16) -> BoxedSource {
        match self {
            Self::Url(url) => Box::new(ProxySource::new(host, port, url)),
            Self::File(path) => Box::new(FileSource::new(path)),
        }
    }
}

/// Loads a stop-info document from disk on every fetch.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Creates a source reading `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl StopInfoSource for FileSource {
    fn id(&self) -> &'static str {
        "file"
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch(&mut self, _timeout: Duration) -> Result<Snapshot, FetchError> {
        let text = std::fs::read_to_string(&self.path)?;
        Ok(Snapshot::from_json_str(&text)?)
    }
}

/// Client for the transport proxy.
///
/// One fetch is one connection: send `getStopInfo?id=<n>?<url>` followed by
/// NUL, then read NUL-delimited JSON frames until one carries the stop
/// document. Acknowledgement frames are skipped; a frame with an `error`
/// field ends the exchange with [`FetchError::Remote`]. The whole exchange,
/// connect included, is bounded by the fetch timeout.
#[derive(Debug, Clone)]
pub struct ProxySource {
    host: String,
    port: u16,
    url: String,
    next_query_id: u64,
}

impl ProxySource {
    /// Creates a client for the proxy at `host:port` asking about `url`.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16, url: impl Into<String>) -> Self {
        Self { host: host.into(), port, url: url.into(), next_query_id: 0 }
    }

    fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn connect(&self, deadline: Instant, timeout: Duration) -> Result<TcpStream, FetchError> {
        let addr = self.addr();
        let addrs = (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|source| FetchError::Connect { addr: addr.clone(), source })?;

        let mut last_err = None;
        for sock_addr in addrs {
            let remaining = remaining(deadline).ok_or(FetchError::Timeout(timeout))?;
            match TcpStream::connect_timeout(&sock_addr, remaining) {
                Ok(stream) => return Ok(stream),
                Err(e) => last_err = Some(e),
            }
        }
        let source = last_err
            .unwrap_or_else(|| std::io::Error::new(ErrorKind::NotFound, "no address resolved"));
        Err(FetchError::Connect { addr, source })
    }
}

impl StopInfoSource for ProxySource {
    fn id(&self) -> &'static str {
        "proxy"
    }

    fn describe(&self) -> String {
        self.url.clone()
    }

    fn fetch(&mut self, timeout: Duration) -> Result<Snapshot, FetchError> {
        let now = Instant::now();
        let deadline = now.checked_add(timeout.min(MAX_EXCHANGE)).unwrap_or(now);
        let mut stream = self.connect(deadline, timeout)?;

        self.next_query_id += 1;
        let mut request = format!("getStopInfo?id={}?{}", self.next_query_id, self.url).into_bytes();
        request.push(FRAME_DELIMITER);

        let remaining_or_timeout = || remaining(deadline).ok_or(FetchError::Timeout(timeout));
        stream.set_write_timeout(Some(remaining_or_timeout()?))?;
        stream.write_all(&request).map_err(|e| timeout_or_io(e, timeout))?;

        let mut pending: Vec<u8> = Vec::new();
        let mut chunk = [0u8; 8192];
        loop {
            stream.set_read_timeout(Some(remaining_or_timeout()?))?;
            let n = stream.read(&mut chunk).map_err(|e| timeout_or_io(e, timeout))?;
            if n == 0 {
                return Err(FetchError::ConnectionClosed);
            }
            let fresh = &chunk[..n];
            if !fresh.contains(&FRAME_DELIMITER) && pending.len() + n > MAX_FRAME_BYTES {
                return Err(FetchError::Remote(format!(
                    "proxy frame exceeds {MAX_FRAME_BYTES} bytes without a delimiter"
                )));
            }
            let scan_from = pending.len();
            pending.extend_from_slice(fresh);

            let mut searched = scan_from;
            while let Some(end) = pending[searched..].iter().position(|&b| b == FRAME_DELIMITER) {
                let frame: Vec<u8> = pending.drain(..=searched + end).collect();
                searched = 0;
                let frame = &frame[..frame.len() - 1];
                if frame.iter().all(u8::is_ascii_whitespace) {
                    continue;
                }
                let value: Value = serde_json::from_slice(frame)?;
                if let Some(snapshot) = classify_frame(value)? {
                    return Ok(snapshot);
                }
            }
        }
    }
}

fn remaining(deadline: Instant) -> Option<Duration> {
    deadline.checked_duration_since(Instant::now()).filter(|d| !d.is_zero())
}

fn timeout_or_io(err: std::io::Error, timeout: Duration) -> FetchError {
    match err.kind() {
        ErrorKind::WouldBlock | ErrorKind::TimedOut => FetchError::Timeout(timeout),
        _ => FetchError::Io(err),
    }
}

/// Interprets one proxy frame: `Ok(None)` for acknowledgements.
fn classify_frame(frame: Value) -> Result<Option<Snapshot>, FetchError> {
    match frame.get("error") {
        None | Some(Value::Null) => {}
        Some(Value::String(s)) if s.is_empty() || s.eq_ignore_ascii_case("ok") => {}
        Some(Value::String(s)) => return Err(FetchError::Remote(s.clone())),
        Some(other) => return Err(FetchError::Remote(other.to_string())),
    }

    let Some(data) = frame.get("data") else {
        return Ok(None);
    };
    // The stop document is either the frame itself or wrapped one level down.
    if data.get("properties").is_some() {
        Ok(Some(Snapshot::from_value(frame)?))
    } else if data.get("data").is_some() {
        let inner = data.clone();
        Ok(Some(Snapshot::from_value(inner)?))
    } else {
        Ok(Some(Snapshot::from_value(frame)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::BufRead;
    use std::net::TcpListener;
    use std::thread;

    fn stop_document(name: &str) -> Value {
        json!({"data": {"properties": {
            "name": name,
            "currentTime": "Fri Oct 16 2026 14:03:11 GMT+0300 (MSK)",
            "StopMetaData": {"Transport": [{"name": "5", "type": "bus"}]}
        }}})
    }

    /// Serves one connection: reads the request, answers with `frames`.
    fn serve_once(frames: Vec<Vec<u8>>) -> (u16, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = std::io::BufReader::new(stream.try_clone().unwrap());
            let mut request = Vec::new();
            reader.read_until(0, &mut request).unwrap();
            let mut stream = stream;
            for frame in frames {
                stream.write_all(&frame).unwrap();
            }
            String::from_utf8_lossy(&request).into_owned()
        });
        (port, handle)
    }

    fn frame(value: &Value) -> Vec<u8> {
        let mut bytes = serde_json::to_vec(value).unwrap();
        bytes.push(0);
        bytes
    }

    #[test]
    fn test_locator_parse_url() {
        let locator = SourceLocator::parse("https://yandex.ru/maps/?masstransit[stopId]=stop__9680781");
        assert_eq!(
            locator.unwrap(),
            SourceLocator::Url("https://yandex.ru/maps/?masstransit[stopId]=stop__9680781".into())
        );
    }

    #[test]
    fn test_locator_parse_stopid_expands() {
        let locator = SourceLocator::parse("stopid:stop__9680781").unwrap();
        assert_eq!(locator, SourceLocator::Url(format!("{STOP_URL_PREFIX}stop__9680781")));
    }

    #[test]
    fn test_locator_parse_file() {
        assert_eq!(SourceLocator::parse("data.json").unwrap(), SourceLocator::File("data.json".into()));
    }

    #[test]
    fn test_locator_parse_empty_is_error() {
        assert!(matches!(SourceLocator::parse(""), Err(StopboardError::MissingSource)));
    }

    #[test]
    fn test_file_source_reads_document() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", stop_document("Профсоюзная")).unwrap();

        let mut source = FileSource::new(file.path());
        let snapshot = source.fetch(Duration::from_secs(1)).unwrap();
        assert_eq!(snapshot.stop_name.as_deref(), Some("Профсоюзная"));
        assert_eq!(source.describe(), file.path().display().to_string());
    }

    #[test]
    fn test_file_source_missing_file_is_io_error() {
        let mut source = FileSource::new("/nonexistent/stop.json");
        assert!(matches!(source.fetch(Duration::from_secs(1)), Err(FetchError::Io(_))));
    }

    #[test]
    fn test_file_source_bad_json_is_decode_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ broken").unwrap();
        let mut source = FileSource::new(file.path());
        assert!(matches!(source.fetch(Duration::from_secs(1)), Err(FetchError::Decode(_))));
    }

    #[test]
    fn test_proxy_skips_ack_and_returns_document() {
        let ack = frame(&json!({"response": "OK", "queue_position": 0}));
        let result = frame(&json!({"method": "getStopInfo", "data": stop_document("Тёплый Стан")}));
        let (port, server) = serve_once(vec![ack, result]);

        let mut source = ProxySource::new("127.0.0.1", port, "https://example.test/stop");
        let snapshot = source.fetch(Duration::from_secs(5)).unwrap();
        assert_eq!(snapshot.stop_name.as_deref(), Some("Тёплый Стан"));

        let request = server.join().unwrap();
        assert!(request.starts_with("getStopInfo?id=1?https://example.test/stop"));
        assert!(request.ends_with('\0'));
    }

    #[test]
    fn test_proxy_accepts_unwrapped_document_split_across_writes() {
        let bytes = frame(&stop_document("Коньково"));
        let (head, tail) = bytes.split_at(bytes.len() / 2);
        let (port, server) = serve_once(vec![head.to_vec(), tail.to_vec()]);

        let mut source = ProxySource::new("127.0.0.1", port, "u");
        let snapshot = source.fetch(Duration::from_secs(5)).unwrap();
        assert_eq!(snapshot.stop_name.as_deref(), Some("Коньково"));
        server.join().unwrap();
    }

    #[test]
    fn test_proxy_error_frame_is_remote_error() {
        let (port, server) = serve_once(vec![frame(&json!({"error": "Stop not found"}))]);
        let mut source = ProxySource::new("127.0.0.1", port, "u");
        match source.fetch(Duration::from_secs(5)) {
            Err(FetchError::Remote(msg)) => assert_eq!(msg, "Stop not found"),
            other => panic!("expected remote error, got {other:?}"),
        }
        server.join().unwrap();
    }

    #[test]
    fn test_proxy_closed_without_result() {
        let (port, server) = serve_once(vec![frame(&json!({"response": "OK"}))]);
        let mut source = ProxySource::new("127.0.0.1", port, "u");
        let result = source.fetch(Duration::from_secs(5));
        server.join().unwrap();
        assert!(matches!(result, Err(FetchError::ConnectionClosed)));
    }

    #[test]
    fn test_proxy_silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            thread::sleep(Duration::from_millis(600));
            drop(stream);
        });

        let mut source = ProxySource::new("127.0.0.1", port, "u");
        let start = Instant::now();
        let result = source.fetch(Duration::from_millis(200));
        assert!(matches!(result, Err(FetchError::Timeout(_))), "got {result:?}");
        assert!(start.elapsed() < Duration::from_millis(550));
        server.join().unwrap();
    }

    #[test]
    fn test_proxy_huge_timeout_does_not_overflow() {
        let bytes = frame(&stop_document("Калужская"));
        let (port, server) = serve_once(vec![bytes]);

        let mut source = ProxySource::new("127.0.0.1", port, "u");
        let snapshot = source.fetch(Duration::from_secs(u64::MAX)).unwrap();
        assert_eq!(snapshot.stop_name.as_deref(), Some("Калужская"));
        server.join().unwrap();
    }

    #[test]
    fn test_proxy_oversized_frame_is_rejected() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = std::io::BufReader::new(stream.try_clone().unwrap());
            let mut request = Vec::new();
            reader.read_until(0, &mut request).unwrap();
            let block = vec![b'x'; 1024 * 1024];
            for _ in 0..=MAX_FRAME_BYTES / block.len() {
                if stream.write_all(&block).is_err() {
                    break;
                }
            }
        });

        let mut source = ProxySource::new("127.0.0.1", port, "u");
        match source.fetch(Duration::from_secs(30)) {
            Err(FetchError::Remote(msg)) => assert!(msg.contains("without a delimiter"), "{msg}"),
            other => panic!("expected oversized frame error, got {other:?}"),
        }
        drop(source);
        server.join().unwrap();
    }

    #[test]
    fn test_proxy_query_id_consumed_only_after_connect() {
        let mut source = ProxySource::new("127.0.0.1", 1, "u");
        source.next_query_id = 41;
        // Connection refused, but the id is only consumed after connecting.
        let _ = source.fetch(Duration::from_millis(200));
        assert_eq!(source.next_query_id, 41);
    }

    #[test]
    fn test_classify_ack_without_data() {
        assert!(classify_frame(json!({"response": "OK"})).unwrap().is_none());
        assert!(classify_frame(json!({"error": "OK"})).unwrap().is_none());
    }
}
