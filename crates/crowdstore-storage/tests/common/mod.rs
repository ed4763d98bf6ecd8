//! In-process CouchDB stand-in for integration tests.
//!
//! Implements just enough of the CouchDB HTTP API for the asset store:
//! document PUT/GET/DELETE with revisions, standalone attachments, the
//! `_design/cloudcrowd` document, and the `files_by_job` view (evaluated
//! natively as `emit(doc.job, {rev: doc._rev})`).

#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use percent_encoding::percent_decode_str;
use reqwest::Url;
use serde_json::{Value, json};

use crowdstore_core::config::storage::CouchDbConfig;
use crowdstore_storage::CouchDbStore;

/// Database name used as the URL path prefix.
pub const DB: &str = "cloudcrowd";

#[derive(Debug, Clone)]
pub struct StoredDoc {
    pub rev: u64,
    pub job: Option<String>,
    pub attachments: BTreeMap<String, (String, Vec<u8>)>,
}

#[derive(Debug, Default)]
struct Inner {
    docs: BTreeMap<String, StoredDoc>,
    design: Option<(u64, Value)>,
    design_writes: usize,
    requests: usize,
    fail_deletes: HashSet<String>,
    fail_attachments: bool,
    design_race: Option<Option<Value>>,
}

/// Handle to a running fake database.
#[derive(Debug, Clone)]
pub struct FakeCouch {
    inner: Arc<Mutex<Inner>>,
    pub url: Url,
}

impl FakeCouch {
    /// Start a fake database on an ephemeral port.
    pub async fn spawn() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let inner = Arc::new(Mutex::new(Inner::default()));

        let app = Router::new().fallback(handle).with_state(inner.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            inner,
            url: Url::parse(&format!("http://{addr}/{DB}")).unwrap(),
        }
    }

    /// The database URL without a trailing slash.
    pub fn base(&self) -> String {
        self.url.as_str().trim_end_matches('/').to_string()
    }

    /// A store pointed at this database.
    pub fn store(&self) -> CouchDbStore {
        CouchDbStore::new(&CouchDbConfig::new(self.url.as_str())).unwrap()
    }

    pub fn doc_ids(&self) -> Vec<String> {
        self.inner.lock().unwrap().docs.keys().cloned().collect()
    }

    pub fn doc(&self, id: &str) -> Option<StoredDoc> {
        self.inner.lock().unwrap().docs.get(id).cloned()
    }

    pub fn requests(&self) -> usize {
        self.inner.lock().unwrap().requests
    }

    pub fn design_writes(&self) -> usize {
        self.inner.lock().unwrap().design_writes
    }

    pub fn design(&self) -> Option<Value> {
        self.inner.lock().unwrap().design.as_ref().map(|(_, body)| body.clone())
    }

    /// Install a design document directly, bypassing the HTTP API.
    pub fn put_design(&self, body: Value) {
        let mut db = self.inner.lock().unwrap();
        let rev = db.design.as_ref().map_or(1, |(rev, _)| rev + 1);
        db.design = Some((rev, body));
    }

    /// Make every DELETE of `id` answer 503.
    pub fn fail_delete(&self, id: &str) {
        self.inner.lock().unwrap().fail_deletes.insert(id.to_string());
    }

    /// Let a concurrent writer win the next design document PUT. The winner
    /// stores `winner`, or the rejected request's own body when `None`, and
    /// the request answers 409.
    pub fn race_design(&self, winner: Option<Value>) {
        self.inner.lock().unwrap().design_race = Some(winner);
    }

    /// Make every attachment upload answer 503.
    pub fn fail_attachments(&self) {
        self.inner.lock().unwrap().fail_attachments = true;
    }
}

/// A URL on which nothing is listening.
pub async fn unreachable_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/{DB}")
}

fn rev_string(rev: u64) -> String {
    format!("{rev}-fake")
}

fn parse_rev(raw: &str) -> Option<u64> {
    raw.strip_suffix("-fake")?.parse().ok()
}

fn decode(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

fn query_param(uri: &Uri, name: &str) -> Option<String> {
    uri.query()?.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        (k == name).then(|| decode(v))
    })
}

fn reply(status: StatusCode, body: Value) -> Response {
    (status, axum::Json(body)).into_response()
}

fn not_found() -> Response {
    reply(
        StatusCode::NOT_FOUND,
        json!({"error": "not_found", "reason": "missing"}),
    )
}

fn conflict() -> Response {
    reply(
        StatusCode::CONFLICT,
        json!({"error": "conflict", "reason": "Document update conflict."}),
    )
}

fn written(id: &str, rev: u64) -> Response {
    reply(
        StatusCode::CREATED,
        json!({"ok": true, "id": id, "rev": rev_string(rev)}),
    )
}

async fn handle(
    State(inner): State<Arc<Mutex<Inner>>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let mut db = inner.lock().unwrap();
    db.requests += 1;

    let Some(rest) = uri.path().strip_prefix(&format!("/{DB}/")) else {
        return not_found();
    };
    let segments: Vec<&str> = rest.split('/').collect();

    if segments[0] == "_design" {
        return design(&mut db, &method, &uri, &segments[1..], &body);
    }

    let id = decode(segments[0]);
    if segments.len() == 1 {
        document(&mut db, &method, &uri, &id, &body)
    } else {
        let name = segments[1..]
            .iter()
            .map(|s| decode(s))
            .collect::<Vec<_>>()
            .join("/");
        attachment(&mut db, &method, &uri, &headers, &id, &name, &body)
    }
}

fn design(db: &mut Inner, method: &Method, uri: &Uri, segments: &[&str], body: &Bytes) -> Response {
    if segments.first() != Some(&DB) {
        return not_found();
    }

    if segments.len() == 3 && segments[1] == "_view" && segments[2] == "files_by_job" {
        let installed = db
            .design
            .as_ref()
            .is_some_and(|(_, d)| d["views"]["files_by_job"]["map"].is_string());
        if !installed {
            return not_found();
        }
        let Some(key) = query_param(uri, "key") else {
            return reply(StatusCode::BAD_REQUEST, json!({"error": "bad_request"}));
        };
        let key: String = serde_json::from_str(&key).unwrap();
        let rows: Vec<Value> = db
            .docs
            .iter()
            .filter(|(_, doc)| doc.job.as_deref() == Some(key.as_str()))
            .map(|(id, doc)| json!({"id": id, "key": key, "value": {"rev": rev_string(doc.rev)}}))
            .collect();
        return reply(
            StatusCode::OK,
            json!({"total_rows": rows.len(), "offset": 0, "rows": rows}),
        );
    }

    if segments.len() != 1 {
        return not_found();
    }

    match *method {
        Method::GET => match &db.design {
            Some((rev, stored)) => {
                let mut doc = stored.clone();
                doc["_id"] = json!(format!("_design/{DB}"));
                doc["_rev"] = json!(rev_string(*rev));
                reply(StatusCode::OK, doc)
            }
            None => not_found(),
        },
        Method::PUT => {
            let mut incoming: Value = serde_json::from_slice(body).unwrap();
            let given = incoming
                .get("_rev")
                .and_then(Value::as_str)
                .and_then(parse_rev);
            let current = db.design.as_ref().map(|(rev, _)| *rev);
            if given != current {
                return conflict();
            }
            if let Some(obj) = incoming.as_object_mut() {
                obj.remove("_rev");
                obj.remove("_id");
            }
            let rev = current.map_or(1, |r| r + 1);
            if let Some(winner) = db.design_race.take() {
                db.design = Some((rev, winner.unwrap_or(incoming)));
                return conflict();
            }
            db.design = Some((rev, incoming));
            db.design_writes += 1;
            written(&format!("_design/{DB}"), rev)
        }
        _ => reply(StatusCode::METHOD_NOT_ALLOWED, json!({"error": "method_not_allowed"})),
    }
}

fn document(db: &mut Inner, method: &Method, uri: &Uri, id: &str, body: &Bytes) -> Response {
    match *method {
        Method::GET => match db.docs.get(id) {
            Some(doc) => reply(
                StatusCode::OK,
                json!({"_id": id, "_rev": rev_string(doc.rev), "job": doc.job}),
            ),
            None => not_found(),
        },
        Method::PUT => {
            let incoming: Value = serde_json::from_slice(body).unwrap();
            let given = incoming
                .get("_rev")
                .and_then(Value::as_str)
                .and_then(parse_rev);
            let job = incoming.get("job").and_then(Value::as_str).map(str::to_string);
            match db.docs.get_mut(id) {
                Some(doc) if given == Some(doc.rev) => {
                    doc.rev += 1;
                    doc.job = job;
                    let rev = doc.rev;
                    written(id, rev)
                }
                Some(_) => conflict(),
                None => {
                    db.docs.insert(
                        id.to_string(),
                        StoredDoc {
                            rev: 1,
                            job,
                            attachments: BTreeMap::new(),
                        },
                    );
                    written(id, 1)
                }
            }
        }
        Method::DELETE => {
            if db.fail_deletes.contains(id) {
                return reply(
                    StatusCode::SERVICE_UNAVAILABLE,
                    json!({"error": "unavailable", "reason": "node down"}),
                );
            }
            let given = query_param(uri, "rev").as_deref().and_then(parse_rev);
            match db.docs.get(id) {
                None => not_found(),
                Some(doc) if Some(doc.rev) != given => conflict(),
                Some(doc) => {
                    let rev = doc.rev + 1;
                    db.docs.remove(id);
                    reply(
                        StatusCode::OK,
                        json!({"ok": true, "id": id, "rev": rev_string(rev)}),
                    )
                }
            }
        }
        _ => reply(StatusCode::METHOD_NOT_ALLOWED, json!({"error": "method_not_allowed"})),
    }
}

fn attachment(
    db: &mut Inner,
    method: &Method,
    uri: &Uri,
    headers: &HeaderMap,
    id: &str,
    name: &str,
    body: &Bytes,
) -> Response {
    match *method {
        Method::GET => match db.docs.get(id).and_then(|d| d.attachments.get(name)) {
            Some((content_type, bytes)) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, content_type.clone())],
                bytes.clone(),
            )
                .into_response(),
            None => not_found(),
        },
        Method::PUT => {
            if db.fail_attachments {
                return reply(
                    StatusCode::SERVICE_UNAVAILABLE,
                    json!({"error": "unavailable", "reason": "node down"}),
                );
            }
            let declared_len = headers
                .get(header::CONTENT_LENGTH)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<usize>().ok());
            if declared_len != Some(body.len()) {
                return reply(StatusCode::BAD_REQUEST, json!({"error": "bad_content_length"}));
            }
            let content_type = headers
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("application/octet-stream")
                .to_string();
            let given = query_param(uri, "rev").as_deref().and_then(parse_rev);
            match db.docs.get_mut(id) {
                Some(doc) if Some(doc.rev) == given => {
                    doc.rev += 1;
                    doc.attachments
                        .insert(name.to_string(), (content_type, body.to_vec()));
                    let rev = doc.rev;
                    written(id, rev)
                }
                _ => conflict(),
            }
        }
        _ => reply(StatusCode::METHOD_NOT_ALLOWED, json!({"error": "method_not_allowed"})),
    }
}
