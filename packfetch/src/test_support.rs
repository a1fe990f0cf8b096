//! Shared test fixtures.
//!
//! [`TestServer`] is an in-process axum server for exercising the reqwest
//! clients. Routes map a request path to a queue of canned responses. Each
//! hit pops the next response; the last one repeats. Unknown paths get a 404.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Write;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::Response;
use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::catalog::{
    BoxFuture, CatalogClient, CatalogError, CatalogResult, RemoteFile, RemoteProject,
};
use crate::installer::{FetchError, FileFetcher};

/// A response the test server will send.
#[derive(Debug, Clone)]
pub struct CannedResponse {
    pub status: u16,
    pub headers: Vec<(&'static str, String)>,
    pub body: Vec<u8>,
    /// Send `body`, then abort the connection mid-stream.
    pub truncate: bool,
}

impl CannedResponse {
    pub fn json(status: u16, body: &str) -> Self {
        Self {
            status,
            headers: vec![("content-type", "application/json".into())],
            body: body.as_bytes().to_vec(),
            truncate: false,
        }
    }

    pub fn bytes(status: u16, body: &[u8]) -> Self {
        Self {
            status,
            headers: vec![("content-type", "application/octet-stream".into())],
            body: body.to_vec(),
            truncate: false,
        }
    }

    pub fn redirect(location: &str) -> Self {
        Self {
            status: 302,
            headers: vec![("location", location.into())],
            body: Vec::new(),
            truncate: false,
        }
    }

    pub fn truncated(body: &[u8]) -> Self {
        Self {
            truncate: true,
            ..Self::bytes(200, body)
        }
    }

    fn into_response(self) -> Response {
        let body = if self.truncate {
            let chunks: Vec<Result<Bytes, std::io::Error>> = vec![
                Ok(Bytes::from(self.body)),
                Err(std::io::Error::new(
                    std::io::ErrorKind::ConnectionReset,
                    "stream dropped",
                )),
            ];
            Body::from_stream(futures::stream::iter(chunks))
        } else {
            Body::from(self.body)
        };

        let mut response = Response::new(body);
        *response.status_mut() = StatusCode::from_u16(self.status).unwrap();
        for (name, value) in self.headers {
            response.headers_mut().insert(
                HeaderName::from_static(name),
                HeaderValue::from_str(&value).unwrap(),
            );
        }
        response
    }
}

/// A request the test server received.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub headers: HeaderMap,
}

#[derive(Clone, Default)]
struct ServerState {
    routes: Arc<Mutex<HashMap<String, Vec<CannedResponse>>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

async fn answer(State(state): State<ServerState>, request: Request) -> Response {
    let path = request.uri().path().to_string();
    state.requests.lock().unwrap().push(RecordedRequest {
        path: path.clone(),
        headers: request.headers().clone(),
    });

    let canned = {
        let mut routes = state.routes.lock().unwrap();
        match routes.get_mut(&path) {
            Some(queue) if queue.len() > 1 => queue.remove(0),
            Some(queue) if !queue.is_empty() => queue[0].clone(),
            _ => CannedResponse::json(404, r#"{"error":"not found"}"#),
        }
    };
    canned.into_response()
}

pub struct TestServer {
    addr: SocketAddr,
    state: ServerState,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a server with one response per path.
    pub async fn start(routes: Vec<(String, CannedResponse)>) -> Self {
        Self::start_sequences(routes.into_iter().map(|(p, r)| (p, vec![r])).collect()).await
    }

    /// Start a server where each path answers with a sequence of responses.
    pub async fn start_sequences(routes: Vec<(String, Vec<CannedResponse>)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = ServerState {
            routes: Arc::new(Mutex::new(routes.into_iter().collect())),
            ..ServerState::default()
        };

        let app = Router::new().fallback(answer).with_state(state.clone());
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    /// Requests received so far, in arrival order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    /// Number of requests received for `path`.
    pub fn hits(&self, path: &str) -> usize {
        self.requests().iter().filter(|r| r.path == path).count()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Write a zip at `path`. Entries with `None` content are directories.
pub fn write_zip(path: &Path, entries: &[(&str, Option<&[u8]>)]) {
    let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
    let options = zip::write::SimpleFileOptions::default();
    for (name, content) in entries {
        match content {
            Some(bytes) => {
                zip.start_file(*name, options).unwrap();
                zip.write_all(bytes).unwrap();
            }
            None => {
                zip.add_directory(*name, options).unwrap();
            }
        }
    }
    zip.finish().unwrap();
}

/// [`FileFetcher`] serving canned bodies keyed by URL.
///
/// A scripted failure writes a few bytes to the destination before erroring,
/// the way a dropped connection leaves a torn file.
#[derive(Default)]
pub struct ScriptedFetcher {
    scripts: Mutex<HashMap<String, (u32, Vec<u8>)>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn serve(self, url: &str, body: &[u8]) -> Self {
        self.serve_after_failures(url, 0, body)
    }

    pub fn serve_after_failures(self, url: &str, failures: u32, body: &[u8]) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(url.to_string(), (failures, body.to_vec()));
        self
    }

    pub fn calls(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|u| *u == url).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl FileFetcher for ScriptedFetcher {
    fn fetch<'a>(&'a self, url: &'a str, dest: &'a Path) -> BoxFuture<'a, Result<u64, FetchError>> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(url.to_string());
            let body = {
                let mut scripts = self.scripts.lock().unwrap();
                match scripts.get_mut(url) {
                    None => {
                        return Err(FetchError::Status {
                            status: 404,
                            url: url.to_string(),
                        })
                    }
                    Some((failures, _)) if *failures > 0 => {
                        *failures -= 1;
                        None
                    }
                    Some((_, body)) => Some(body.clone()),
                }
            };
            match body {
                Some(body) => {
                    std::fs::write(dest, &body).map_err(|e| FetchError::io(dest, e))?;
                    Ok(body.len() as u64)
                }
                None => {
                    std::fs::write(dest, b"partial").map_err(|e| FetchError::io(dest, e))?;
                    Err(FetchError::Request {
                        url: url.to_string(),
                        reason: "connection reset".to_string(),
                    })
                }
            }
        })
    }
}

/// Scripted [`CatalogClient`] with per-call counters.
#[derive(Default)]
pub struct MockCatalog {
    files: HashMap<(u32, u32), RemoteFile>,
    projects: HashMap<u32, RemoteProject>,
    download_urls: HashMap<(u32, u32), String>,
    broken_files: HashSet<(u32, u32)>,
    broken_projects: HashSet<u32>,
    project_delay: Option<Duration>,
    file_lookups: AtomicUsize,
    url_lookups: AtomicUsize,
    project_lookups: Mutex<HashMap<u32, usize>>,
}

impl MockCatalog {
    /// Register a file; `download_url` of `None` means distribution is disabled.
    pub fn with_file(
        mut self,
        project_id: u32,
        file_id: u32,
        file_name: &str,
        download_url: Option<&str>,
        fingerprint: u32,
    ) -> Self {
        self.files.insert(
            (project_id, file_id),
            RemoteFile {
                id: file_id,
                mod_id: project_id,
                file_name: file_name.to_string(),
                download_url: download_url.map(str::to_string),
                fingerprint,
                ..RemoteFile::default()
            },
        );
        self
    }

    pub fn with_project(mut self, project_id: u32, class_id: u32) -> Self {
        self.projects.insert(
            project_id,
            RemoteProject {
                id: project_id,
                class_id: Some(class_id),
                slug: format!("project-{}", project_id),
                name: format!("Project {}", project_id),
                latest_files: Vec::new(),
            },
        );
        self
    }

    /// Register a pack project whose `latestFiles` are `files`.
    pub fn with_latest_files(mut self, project_id: u32, files: Vec<RemoteFile>) -> Self {
        self.projects.insert(
            project_id,
            RemoteProject {
                id: project_id,
                class_id: None,
                slug: format!("pack-{}", project_id),
                name: format!("Pack {}", project_id),
                latest_files: files,
            },
        );
        self
    }

    pub fn with_download_url(mut self, project_id: u32, file_id: u32, url: &str) -> Self {
        self.download_urls
            .insert((project_id, file_id), url.to_string());
        self
    }

    /// Make file lookups for this pair fail with a server error.
    pub fn with_broken_file(mut self, project_id: u32, file_id: u32) -> Self {
        self.broken_files.insert((project_id, file_id));
        self
    }

    /// Make project lookups for this id fail with a server error.
    pub fn with_broken_project(mut self, project_id: u32) -> Self {
        self.broken_projects.insert(project_id);
        self
    }

    /// Delay every project lookup, widening the window for duplicate calls.
    pub fn with_project_delay(mut self, delay: Duration) -> Self {
        self.project_delay = Some(delay);
        self
    }

    pub fn file_lookups(&self) -> usize {
        self.file_lookups.load(Ordering::SeqCst)
    }

    pub fn url_lookups(&self) -> usize {
        self.url_lookups.load(Ordering::SeqCst)
    }

    pub fn project_lookups(&self, project_id: u32) -> usize {
        self.project_lookups
            .lock()
            .unwrap()
            .get(&project_id)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_project_lookups(&self) -> usize {
        self.project_lookups.lock().unwrap().values().sum()
    }
}

impl CatalogClient for MockCatalog {
    fn lookup_project(&self, project_id: u32) -> BoxFuture<'_, CatalogResult<RemoteProject>> {
        Box::pin(async move {
            *self
                .project_lookups
                .lock()
                .unwrap()
                .entry(project_id)
                .or_default() += 1;
            if let Some(delay) = self.project_delay {
                tokio::time::sleep(delay).await;
            }
            if self.broken_projects.contains(&project_id) {
                return Err(CatalogError::Status {
                    status: 500,
                    url: format!("mock://mods/{}", project_id),
                });
            }
            self.projects
                .get(&project_id)
                .cloned()
                .ok_or_else(|| CatalogError::NotFound {
                    what: format!("project {}", project_id),
                })
        })
    }

    fn lookup_file(
        &self,
        project_id: u32,
        file_id: u32,
    ) -> BoxFuture<'_, CatalogResult<RemoteFile>> {
        Box::pin(async move {
            self.file_lookups.fetch_add(1, Ordering::SeqCst);
            if self.broken_files.contains(&(project_id, file_id)) {
                return Err(CatalogError::Status {
                    status: 500,
                    url: format!("mock://mods/{}/files/{}", project_id, file_id),
                });
            }
            self.files
                .get(&(project_id, file_id))
                .cloned()
                .ok_or_else(|| CatalogError::NotFound {
                    what: format!("file {} of project {}", file_id, project_id),
                })
        })
    }

    fn resolve_download_url(
        &self,
        project_id: u32,
        file_id: u32,
    ) -> BoxFuture<'_, CatalogResult<Option<String>>> {
        Box::pin(async move {
            self.url_lookups.fetch_add(1, Ordering::SeqCst);
            Ok(self.download_urls.get(&(project_id, file_id)).cloned())
        })
    }
}
