#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Mutex;

use serde_json::{json, Value};

use gradebook_core::client::{
    ApiClient, Payload, Transport, TransportError, TransportRequest, TransportResponse,
};

pub type Reply = Result<TransportResponse, TransportError>;

type Handler = Box<dyn Fn(&TransportRequest) -> Reply + Send + Sync>;

/// In-memory backend: records every request and answers through `handler`.
pub struct FakeBackend {
    calls: Mutex<Vec<TransportRequest>>,
    handler: Handler,
}

impl FakeBackend {
    pub fn new(handler: impl Fn(&TransportRequest) -> Reply + Send + Sync + 'static) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            handler: Box::new(handler),
        }
    }

    pub fn calls(&self) -> Vec<TransportRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.path).collect()
    }
}

impl Transport for FakeBackend {
    async fn send(&self, request: TransportRequest) -> Reply {
        self.calls.lock().unwrap().push(request.clone());
        (self.handler)(&request)
    }
}

pub fn client(handler: impl Fn(&TransportRequest) -> Reply + Send + Sync + 'static) -> ApiClient<FakeBackend> {
    ApiClient::with_transport(FakeBackend::new(handler))
}

pub fn ok(data: Value) -> Reply {
    Ok(TransportResponse::json(
        200,
        &json!({ "status": "success", "message": "ok", "data": data, "code": 200 }),
    ))
}

pub fn fail(message: &str, code: u16) -> Reply {
    Ok(TransportResponse::json(
        200,
        &json!({ "status": "error", "message": message, "data": null, "code": code }),
    ))
}

pub fn json_body(request: &TransportRequest) -> &Value {
    match &request.payload {
        Payload::Json(body) => body,
        Payload::Multipart(_) => panic!("expected a JSON payload for {}", request.path),
    }
}

pub fn fixture(name: &str) -> Value {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    let raw = std::fs::read_to_string(&path).expect("Failed to read fixture");
    serde_json::from_str(&raw).expect("Fixture is not valid JSON")
}

/// Rows of `fixture` whose fields equal every key of the request body.
pub fn filtered(fixture_name: &str, body: &Value) -> Value {
    let rows = fixture(fixture_name);
    let wanted = body.as_object().cloned().unwrap_or_default();
    let kept: Vec<Value> = rows
        .as_array()
        .expect("fixture must be a list")
        .iter()
        .filter(|row| wanted.iter().all(|(k, v)| row.get(k) == Some(v)))
        .cloned()
        .collect();
    Value::Array(kept)
}

/// Serves the fixtures for every read endpoint and accepts score writes in
/// [0, 100], rejecting others the way the backend does.
pub fn fixture_backend(request: &TransportRequest) -> Reply {
    match request.path.as_str() {
        "/Student_MetadataWriter/read" => ok(filtered("students.json", json_body(request))),
        "/Score_MetadataWriter/read" => ok(filtered("scores.json", json_body(request))),
        "/Test_MetadataWriter/read" => ok(filtered("exams.json", json_body(request))),
        "/Score_MetadataWriter/create" => {
            let body = json_body(request);
            let value = match &body["score_value"] {
                Value::String(s) => s.parse::<f64>().ok(),
                other => other.as_f64(),
            };
            match value {
                Some(v) if (0.0..=100.0).contains(&v) => {
                    let mut score = json!({
                        "score_uuid": "9a7e-new",
                        "f_student_uuid": body["f_student_uuid"],
                    });
                    let field = body["update_field"].as_str().unwrap_or("score_quiz1");
                    score[field] = body["score_value"].clone();
                    ok(score)
                }
                _ => Ok(TransportResponse::json(
                    200,
                    &json!({
                        "status": "error",
                        "message": "Score must be between 0 and 100",
                        "data": { "score_value": ["must be between 0 and 100"] },
                        "code": 422
                    }),
                )),
            }
        }
        other => panic!("unexpected call to {}", other),
    }
}
