use std::collections::HashMap;
use std::io::Read as _;
use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::time::Duration;

use serde_json::{Value, json};

pub const CLIENT_ID: &str = "stub-client-1234";
pub const TOKEN: &str = "stub-token";
pub const AUDIO_BYTES: &[u8] = b"ID3fake-mp3-bytes";

#[derive(Debug, Clone)]
pub struct StubCourse {
    pub lang: String,
    pub max_levels: u32,
    /// Level index → status; unlisted levels answer 200.
    pub level_status: HashMap<u32, u16>,
    /// Prompt value used for every word of this course.
    pub prompt: String,
}

#[derive(Debug, Clone)]
pub struct StubConfig {
    pub username: String,
    pub password: String,
    pub courses: HashMap<String, StubCourse>,
}

pub struct PlatformStub {
    pub base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl PlatformStub {
    pub fn spawn(config: StubConfig) -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start platform stub server");
        let addr = server.server_addr();
        let base_url = format!("http://{addr}");

        let requests = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&requests);
        let audio_base = base_url.clone();

        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let handle = thread::spawn(move || {
            loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }

                let mut request = match server.recv_timeout(Duration::from_millis(50)) {
                    Ok(Some(req)) => req,
                    Ok(None) => continue,
                    Err(_) => break,
                };

                let url = request.url().to_string();
                log.lock().expect("lock request log").push(url.clone());

                let authorized = request.headers().iter().any(|h| {
                    h.field.equiv("Authorization")
                        && h.value.as_str() == format!("Bearer {TOKEN}")
                });

                let mut body = String::new();
                if request.as_reader().read_to_string(&mut body).is_err() {
                    let _ = request.respond(
                        tiny_http::Response::from_string("invalid request body")
                            .with_status_code(400),
                    );
                    continue;
                }

                let path = url.split('?').next().unwrap_or(&url).to_owned();
                let query = url.split_once('?').map(|(_, q)| q).unwrap_or("");

                let (status, text, bytes) = if path == "/signin" {
                    (200, sign_in_page(), None)
                } else if path == "/v1.17/auth/access_token/" {
                    token_response(&config, &body)
                } else if let Some(rest) = path.strip_prefix("/course/") {
                    let id = rest.split('/').next().unwrap_or_default();
                    match config.courses.get(id) {
                        Some(course) => (200, course_page(course), None),
                        None => (404, "no such course".to_owned(), None),
                    }
                } else if path == "/v1.17/learning_sessions/preview/" {
                    if authorized {
                        level_response(&config, query, &audio_base)
                    } else {
                        (401, "missing bearer token".to_owned(), None)
                    }
                } else if path.starts_with("/audio/") {
                    (200, String::new(), Some(AUDIO_BYTES.to_vec()))
                } else {
                    (404, "not found".to_owned(), None)
                };

                let response = match bytes {
                    Some(bytes) => tiny_http::Response::from_data(bytes),
                    None => tiny_http::Response::from_string(text),
                };
                let _ = request.respond(response.with_status_code(status));
            }
        });

        Self {
            base_url,
            requests,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("lock request log").clone()
    }
}

impl Drop for PlatformStub {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn sign_in_page() -> String {
    format!(
        r#"<!doctype html>
<html>
  <head><title>Sign in</title></head>
  <body>
    <script>window.__SETTINGS__ = {{"STATIC_URL":"/static/","OAUTH_CLIENT_ID":"{CLIENT_ID}","LANG":"en"}};</script>
  </body>
</html>
"#
    )
}

fn token_response(config: &StubConfig, body: &str) -> (u16, String, Option<Vec<u8>>) {
    let Ok(parsed) = serde_json::from_str::<Value>(body) else {
        return (400, "invalid json".to_owned(), None);
    };
    let field = |name: &str| parsed.get(name).and_then(Value::as_str).unwrap_or("");

    if field("client_id") != CLIENT_ID || field("grant_type") != "password" {
        return (400, "bad client".to_owned(), None);
    }
    if field("username") != config.username || field("password") != config.password {
        return (401, r#"{"error":"invalid_grant"}"#.to_owned(), None);
    }

    let body = json!({ "access_token": { "access_token": TOKEN, "token_type": "Bearer" } });
    (200, body.to_string(), None)
}

fn course_page(course: &StubCourse) -> String {
    let levels: String = (1..=course.max_levels)
        .map(|n| format!(r#"<a class="level clearfix" href="{n}/">Level {n}</a>"#))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        r#"<!doctype html>
<html>
  <body>
    <div class="course-breadcrumb">
      <a href="/courses/english/">English</a>
      <a href="/courses/english/x/">{lang}</a>
    </div>
    <div class="levels clearfix">
{levels}
    </div>
  </body>
</html>
"#,
        lang = course.lang
    )
}

fn level_response(
    config: &StubConfig,
    query: &str,
    audio_base: &str,
) -> (u16, String, Option<Vec<u8>>) {
    let params: HashMap<&str, &str> = query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .collect();
    let course_id = params.get("course_id").copied().unwrap_or_default();
    let Some(index) = params.get("level_index").and_then(|v| v.parse::<u32>().ok()) else {
        return (400, "missing level_index".to_owned(), None);
    };
    let Some(course) = config.courses.get(course_id) else {
        return (404, "no such course".to_owned(), None);
    };

    let status = course.level_status.get(&index).copied().unwrap_or(200);
    if status != 200 {
        return (status, format!("level {index} unavailable"), None);
    }

    let body = json!({
        "course": {
            "id": course_id,
            "level_id": 7000 + index,
            "level_name": format!("Level {index}"),
        },
        "learnables": [
            {
                "difficulty": 0.5,
                "screens": {
                    "1": {
                        "template": "presentation",
                        "item": { "label": course.lang, "kind": "text", "value": course.prompt },
                        "definition": { "label": "English", "kind": "text", "value": format!("word {index}") },
                        "visible_info": [{ "label": "Part of speech", "kind": "text", "value": "noun" }],
                        "hidden_info": [{ "label": "Literal", "kind": "text", "value": "hidden" }],
                        "audio": { "label": "Audio", "kind": "audio", "value": [
                            { "normal": format!("{audio_base}/audio/{course_id}-{index}.mp3") }
                        ] }
                    }
                }
            },
            {
                "difficulty": 1,
                "screens": {
                    "1": {
                        "item": { "label": course.lang, "kind": "text", "value": format!("{}{}", course.prompt, course.prompt) },
                        "definition": { "label": "English", "kind": "text", "value": "second" }
                    }
                }
            }
        ]
    });
    (200, body.to_string(), None)
}
