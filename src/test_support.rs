//! Throwaway HTTP server for fetch tests: canned responses per path, and a
//! log of every path requested.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
};

use crate::progress::Progress;

pub(crate) struct Route {
    pub status: u16,
    pub body: Vec<u8>,
    /// Replace `{base}` in the body with the server's base URL.
    pub templated: bool,
}

pub(crate) struct TestServer {
    pub base: String,
    hits: Arc<Mutex<Vec<String>>>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn hits(&self) -> Vec<String> {
        self.hits.lock().unwrap().clone()
    }
}

/// Serve `routes` on an ephemeral port until the runtime shuts down.
/// Unknown paths answer 404.
pub(crate) async fn serve(routes: Vec<(&str, Route)>) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let routes: Arc<HashMap<String, Route>> = Arc::new(
        routes
            .into_iter()
            .map(|(path, mut route)| {
                if route.templated {
                    let text = String::from_utf8_lossy(&route.body).replace("{base}", &base);
                    route.body = text.into_bytes();
                }
                (path.to_string(), route)
            })
            .collect(),
    );
    let hits = Arc::new(Mutex::new(Vec::new()));

    let hits_c = Arc::clone(&hits);
    tokio::spawn(async move {
        loop {
            let Ok((mut sock, _)) = listener.accept().await else {
                break;
            };
            let routes = Arc::clone(&routes);
            let hits = Arc::clone(&hits_c);
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    match sock.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                }
                let head = String::from_utf8_lossy(&buf);
                let path = head
                    .lines()
                    .next()
                    .and_then(|l| l.split_whitespace().nth(1))
                    .unwrap_or("/")
                    .to_string();
                hits.lock().unwrap().push(path.clone());

                let (status, body) = match routes.get(&path) {
                    Some(r) => (r.status, r.body.clone()),
                    None => (404, b"not found".to_vec()),
                };
                let header = format!(
                    "HTTP/1.1 {} X\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    status,
                    body.len()
                );
                let _ = sock.write_all(header.as_bytes()).await;
                let _ = sock.write_all(&body).await;
                let _ = sock.shutdown().await;
            });
        }
    });

    TestServer { base, hits }
}

pub(crate) fn ok(body: impl Into<Vec<u8>>) -> Route {
    Route {
        status: 200,
        body: body.into(),
        templated: false,
    }
}

/// 200 text page where `{base}` becomes the server's base URL.
pub(crate) fn page(text: &str) -> Route {
    Route {
        templated: true,
        ..ok(text)
    }
}

pub(crate) fn status(code: u16) -> Route {
    Route {
        status: code,
        body: Vec::new(),
        templated: false,
    }
}

/// Zip `files` into an in-memory archive, each under `folder/` when given.
pub(crate) fn zip_bytes(folder: Option<&str>, files: &[(&str, &[u8])]) -> Vec<u8> {
    use std::io::{Cursor, Write};
    use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

    let mut buf = Vec::new();
    {
        let mut zip = ZipWriter::new(Cursor::new(&mut buf));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        if let Some(folder) = folder {
            zip.add_directory(format!("{}/", folder), options).unwrap();
        }
        for (name, data) in files {
            let entry = match folder {
                Some(folder) => format!("{}/{}", folder, name),
                None => name.to_string(),
            };
            zip.start_file(entry, options).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap();
    }
    buf
}

pub(crate) fn init_test_logging() {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Keeps every progress update so tests can assert on them.
#[derive(Default)]
pub(crate) struct RecordingProgress {
    total: Mutex<Option<u64>>,
    position: Mutex<u64>,
    messages: Mutex<Vec<String>>,
    finished: Mutex<Option<String>>,
}

impl RecordingProgress {
    pub fn total(&self) -> Option<u64> {
        *self.total.lock().unwrap()
    }

    pub fn position(&self) -> u64 {
        *self.position.lock().unwrap()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub fn finished(&self) -> Option<String> {
        self.finished.lock().unwrap().clone()
    }
}

impl Progress for RecordingProgress {
    fn set_total(&self, total: u64) {
        *self.total.lock().unwrap() = Some(total);
    }

    fn inc(&self, delta: u64) {
        *self.position.lock().unwrap() += delta;
    }

    fn set_message(&self, msg: String) {
        self.messages.lock().unwrap().push(msg);
    }

    fn finish(&self, msg: String) {
        *self.finished.lock().unwrap() = Some(msg);
    }
}
