#![allow(dead_code)]

use async_trait::async_trait;
use mapview::prelude::*;
use std::io::Cursor;
use std::sync::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Geocoder answering from a fixed table, optionally after a delay.
#[derive(Default)]
pub struct StubGeocoder {
    answers: HashMap<String, (Vec<SearchResult>, u64)>,
    pub calls: Mutex<Vec<String>>,
}

impl StubGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(mut self, query: &str, results: Vec<SearchResult>) -> Self {
        self.answers.insert(query.to_string(), (results, 0));
        self
    }

    pub fn answer_after(mut self, query: &str, delay_ms: u64, results: Vec<SearchResult>) -> Self {
        self.answers.insert(query.to_string(), (results, delay_ms));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl GeocodeProvider for StubGeocoder {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        self.calls.lock().unwrap().push(query.to_string());
        let (results, delay) = self.answers.get(query).cloned().unwrap_or_default();
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        Ok(results)
    }
}

/// Static image provider producing a blank PNG of the requested size.
#[derive(Default)]
pub struct StubImages {
    pub requests: Mutex<Vec<SnapshotRequest>>,
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    let image = image::DynamicImage::new_rgba8(width, height);
    let mut bytes = Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, image::ImageOutputFormat::Png)
        .unwrap();
    bytes.into_inner()
}

#[async_trait]
impl StaticImageProvider for StubImages {
    async fn render(&self, request: &SnapshotRequest) -> Result<Vec<u8>> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(png(request.pixel_width, request.pixel_height))
    }
}

pub fn config() -> ControllerConfig {
    ControllerConfig::with_access_token("pk.test-token")
}

pub fn paris() -> SearchResult {
    SearchResult::new("Paris, France", 48.8566, 2.3522)
}

/// Controller over a headless engine; the returned engine clone observes it.
pub fn controller(
    geocoder: Arc<dyn GeocodeProvider>,
    images: Arc<dyn StaticImageProvider>,
) -> (MapViewController, HeadlessEngine) {
    let engine = HeadlessEngine::new();
    let controller =
        MapViewController::new(config(), Box::new(engine.clone()), geocoder, images).unwrap();
    (controller, engine)
}

pub fn container() -> Arc<HeadlessContainer> {
    Arc::new(HeadlessContainer::new("map", 1600, 900))
}

/// Minimal HTTP server replying to every request with the same response.
/// Returns its base URL and the request lines it has seen.
pub async fn serve(
    status: &'static str,
    content_type: &'static str,
    body: Vec<u8>,
) -> (String, Arc<Mutex<Vec<String>>>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let body = body.clone();
            let log = Arc::clone(&log);
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut buf = [0u8; 4096];
                loop {
                    let n = socket.read(&mut buf).await.unwrap_or(0);
                    if n == 0 {
                        break;
                    }
                    request.extend_from_slice(&buf[..n]);
                    if request.windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }
                let text = String::from_utf8_lossy(&request);
                if let Some(line) = text.lines().next() {
                    log.lock().unwrap().push(line.to_string());
                }

                let head = format!(
                    "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    status,
                    content_type,
                    body.len()
                );
                let _ = socket.write_all(head.as_bytes()).await;
                let _ = socket.write_all(&body).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (format!("http://{}", addr), seen)
}
