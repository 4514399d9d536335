//! Mock storefront backend for testing
//!
//! A small HTTP server on a random local port that implements the REST
//! contract the gateway talks to, backed by in-memory tables:
//! - POST /api/auth/login, POST /api/auth/register
//! - GET/POST /api/products, PUT/DELETE /api/products/{id}, GET /api/products/{id}/image
//! - GET/POST /api/users, PUT/DELETE /api/users/{id}
//!
//! Every request is recorded so tests can assert on headers and bodies.

use std::collections::{BTreeMap, HashMap};
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use serde_json::{json, Value as JsonValue};

/// Token the mock hands out and accepts
pub const VALID_TOKEN: &str = "test-token";
/// Password accepted for every known user
pub const VALID_PASSWORD: &str = "secret";

/// A request as received by the mock
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    /// Header names lowercased
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    /// Text fields and file names of a multipart body
    pub fn multipart_fields(&self) -> HashMap<String, String> {
        let boundary = self
            .header("content-type")
            .and_then(|ct| ct.split("boundary=").nth(1))
            .map(|b| b.trim_matches('"').to_string())
            .unwrap_or_default();
        parse_multipart(&self.body, &boundary)
    }

    pub fn json(&self) -> JsonValue {
        serde_json::from_slice(&self.body).unwrap_or(JsonValue::Null)
    }
}

#[derive(Debug, Default)]
struct State {
    products: BTreeMap<i64, JsonValue>,
    images: HashMap<i64, Vec<u8>>,
    users: BTreeMap<i64, JsonValue>,
    next_id: i64,
    requests: Vec<RecordedRequest>,
}

/// Mock backend server; stops when dropped
pub struct MockBackend {
    port: u16,
    running: Arc<AtomicBool>,
    state: Arc<Mutex<State>>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

impl MockBackend {
    /// Start with two products and one regular user
    pub fn start() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        let running = Arc::new(AtomicBool::new(true));
        let state = Arc::new(Mutex::new(seed_state()));

        listener.set_nonblocking(true)?;

        let running_clone = running.clone();
        let state_clone = state.clone();
        let thread_handle = thread::spawn(move || {
            while running_clone.load(Ordering::SeqCst) {
                match listener.accept() {
                    Ok((stream, _)) => {
                        let state = state_clone.clone();
                        thread::spawn(move || handle_connection(stream, &state));
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(Duration::from_millis(5));
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            port,
            running,
            state,
            thread_handle: Some(thread_handle),
        })
    }

    /// Base URL including the `/api` prefix
    pub fn api_url(&self) -> String {
        format!("http://127.0.0.1:{}/api", self.port)
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.stop();
    }
}

fn seed_state() -> State {
    let mut state = State {
        next_id: 100,
        ..State::default()
    };
    state.products.insert(
        1,
        json!({
            "id": 1,
            "name": "Produit A",
            "price": 10,
            "expirationDate": "2030-01-01",
            "image": "a.png"
        }),
    );
    state.products.insert(
        2,
        json!({"id": 2, "name": "Fromage", "price": "4.50", "expirationDate": null}),
    );
    state.images.insert(1, vec![0x89, b'P', b'N', b'G']);
    state.users.insert(
        1,
        json!({
            "id": 1,
            "firstName": "Marie",
            "lastName": "Martin",
            "age": 25,
            "email": "marie.martin@example.com",
            "role": "User"
        }),
    );
    state
}

fn handle_connection(mut stream: TcpStream, state: &Arc<Mutex<State>>) {
    let _ = stream.set_nonblocking(false);
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));

    let Some(request) = read_request(&mut stream) else {
        send_response(&mut stream, 400, "Bad Request", "text/plain", b"Invalid request");
        return;
    };

    let (status, content_type, body) = {
        let mut state = state.lock().unwrap();
        state.requests.push(request.clone());
        route(&mut state, &request)
    };
    send_response(&mut stream, status, reason(status), content_type, &body);
}

fn read_request(stream: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            return None;
        }
        buffer.extend_from_slice(&chunk[..n]);
        if let Some(pos) = find(&buffer, b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
    let mut lines = head.lines();
    let request_line = lines.next()?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next()?.to_string();
    let path = parts.next()?.to_string();

    let headers: HashMap<String, String> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_lowercase(), v.trim().to_string()))
        .collect();

    let mut body = buffer[header_end..].to_vec();
    if let Some(len) = headers.get("content-length").and_then(|v| v.parse::<usize>().ok()) {
        while body.len() < len {
            let n = stream.read(&mut chunk).ok()?;
            if n == 0 {
                break;
            }
            body.extend_from_slice(&chunk[..n]);
        }
        body.truncate(len);
    } else if headers
        .get("transfer-encoding")
        .is_some_and(|v| v.eq_ignore_ascii_case("chunked"))
    {
        while find(&body, b"0\r\n\r\n").is_none() {
            let n = stream.read(&mut chunk).ok()?;
            if n == 0 {
                break;
            }
            body.extend_from_slice(&chunk[..n]);
        }
        body = decode_chunked(&body);
    }

    Some(RecordedRequest {
        method,
        path,
        headers,
        body,
    })
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn decode_chunked(mut raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    while let Some(line_end) = find(raw, b"\r\n") {
        let size_line = String::from_utf8_lossy(&raw[..line_end]);
        let size = usize::from_str_radix(size_line.split(';').next().unwrap_or("0").trim(), 16)
            .unwrap_or(0);
        if size == 0 {
            break;
        }
        let start = line_end + 2;
        let end = (start + size).min(raw.len());
        out.extend_from_slice(&raw[start..end]);
        raw = &raw[(end + 2).min(raw.len())..];
    }
    out
}

fn parse_multipart(body: &[u8], boundary: &str) -> HashMap<String, String> {
    let mut fields = HashMap::new();
    if boundary.is_empty() {
        return fields;
    }
    let text = String::from_utf8_lossy(body);
    let delimiter = format!("--{}", boundary);
    for part in text.split(delimiter.as_str()) {
        let Some((head, value)) = part.split_once("\r\n\r\n") else {
            continue;
        };
        let Some(name) = head
            .split("name=\"")
            .nth(1)
            .and_then(|rest| rest.split('"').next())
        else {
            continue;
        };
        let value = value.strip_suffix("\r\n").unwrap_or(value);
        match head.split("filename=\"").nth(1).and_then(|rest| rest.split('"').next()) {
            Some(file_name) => {
                fields.insert(name.to_string(), file_name.to_string());
                fields.insert(format!("{}.len", name), value.len().to_string());
            }
            None => {
                fields.insert(name.to_string(), value.to_string());
            }
        }
    }
    fields
}

type Reply = (u16, &'static str, Vec<u8>);

fn json_reply(status: u16, value: &JsonValue) -> Reply {
    (status, "application/json", value.to_string().into_bytes())
}

fn text_reply(status: u16, text: &str) -> Reply {
    (status, "text/plain", text.as_bytes().to_vec())
}

fn empty_reply() -> Reply {
    (200, "text/plain", Vec::new())
}

fn route(state: &mut State, request: &RecordedRequest) -> Reply {
    let path = request.path.split('?').next().unwrap_or("");
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

    match (request.method.as_str(), segments.as_slice()) {
        ("POST", ["api", "auth", "login"]) => login(state, request),
        ("POST", ["api", "auth", "register"]) => register(state, request),
        (_, ["api", "products", ..]) | (_, ["api", "users", ..])
            if request.header("authorization")
                != Some(format!("Bearer {}", VALID_TOKEN).as_str()) =>
        {
            text_reply(401, "Unauthorized")
        }
        ("GET", ["api", "products"]) => {
            json_reply(200, &JsonValue::Array(state.products.values().cloned().collect()))
        }
        ("POST", ["api", "products"]) => {
            let id = state.next_id;
            state.next_id += 1;
            save_product(state, id, request)
        }
        ("PUT", ["api", "products", id]) => match id.parse::<i64>() {
            Ok(id) if state.products.contains_key(&id) => save_product(state, id, request),
            _ => text_reply(404, "Product not found"),
        },
        ("DELETE", ["api", "products", id]) => match id.parse::<i64>() {
            Ok(id) if state.products.remove(&id).is_some() => {
                state.images.remove(&id);
                empty_reply()
            }
            _ => text_reply(404, "Product not found"),
        },
        ("GET", ["api", "products", id, "image"]) => {
            match id.parse::<i64>().ok().and_then(|id| state.images.get(&id)) {
                Some(bytes) => (200, "image/png", bytes.clone()),
                None => text_reply(404, "Image not found"),
            }
        }
        ("GET", ["api", "users"]) => {
            json_reply(200, &JsonValue::Array(state.users.values().cloned().collect()))
        }
        ("POST", ["api", "users"]) => {
            let id = state.next_id;
            state.next_id += 1;
            save_user(state, id, request)
        }
        ("PUT", ["api", "users", id]) => match id.parse::<i64>() {
            Ok(id) if state.users.contains_key(&id) => save_user(state, id, request),
            _ => text_reply(404, "User not found"),
        },
        ("DELETE", ["api", "users", id]) => match id.parse::<i64>() {
            Ok(id) if state.users.remove(&id).is_some() => empty_reply(),
            _ => text_reply(404, "User not found"),
        },
        _ => text_reply(404, "Endpoint not found"),
    }
}

fn login(state: &State, request: &RecordedRequest) -> Reply {
    let body = request.json();
    let email = body["email"].as_str().unwrap_or("");
    let known = state
        .users
        .values()
        .any(|u| u["email"].as_str() == Some(email))
        || email.starts_with("admin@");
    if known && body["password"].as_str() == Some(VALID_PASSWORD) {
        json_reply(200, &json!({ "token": VALID_TOKEN }))
    } else {
        text_reply(401, "Invalid credentials")
    }
}

fn register(state: &mut State, request: &RecordedRequest) -> Reply {
    let body = request.json();
    let email = body["email"].as_str().unwrap_or("").to_string();
    if email.is_empty() {
        return text_reply(400, "Email is required");
    }
    if state.users.values().any(|u| u["email"].as_str() == Some(email.as_str())) {
        return text_reply(409, "Email already in use");
    }
    let id = state.next_id;
    state.next_id += 1;
    state.users.insert(
        id,
        json!({"id": id, "name": body["name"], "age": body["age"], "email": email, "role": "User"}),
    );
    text_reply(201, "User registered")
}

fn save_product(state: &mut State, id: i64, request: &RecordedRequest) -> Reply {
    let fields = request.multipart_fields();
    let Some(name) = fields.get("name").filter(|n| !n.is_empty()) else {
        return text_reply(400, "Name is required");
    };
    let expiration = fields
        .get("expirationDate")
        .filter(|d| !d.is_empty())
        .cloned();
    let mut product = json!({
        "id": id,
        "name": name,
        "price": fields.get("price").cloned().unwrap_or_default(),
        "expirationDate": expiration,
    });
    if let Some(file_name) = fields.get("image") {
        product["image"] = json!(file_name);
        state.images.insert(id, vec![0u8; 4]);
    } else if let Some(existing) = state.products.get(&id).and_then(|p| p.get("image")) {
        product["image"] = existing.clone();
    }
    state.products.insert(id, product.clone());
    json_reply(200, &product)
}

fn save_user(state: &mut State, id: i64, request: &RecordedRequest) -> Reply {
    let mut user = request.json();
    if !user.is_object() || user["email"].as_str().unwrap_or("").is_empty() {
        return text_reply(400, "Email is required");
    }
    user["id"] = json!(id);
    state.users.insert(id, user);
    // Updates answer with an empty body
    if request.method == "PUT" {
        empty_reply()
    } else {
        json_reply(201, &state.users[&id])
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        409 => "Conflict",
        _ => "Unknown",
    }
}

fn send_response(
    stream: &mut TcpStream,
    status: u16,
    status_text: &str,
    content_type: &str,
    body: &[u8],
) {
    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        status_text,
        content_type,
        body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
    let _ = stream.flush();
}
