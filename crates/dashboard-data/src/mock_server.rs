//! In-process stand-in for the procedure API, used by tests.
//!
//! Routes are matched on the last path segment (the procedure name). Unknown
//! procedures answer 404. Request bodies are recorded per procedure.

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Canned reply for one procedure.
#[derive(Debug, Clone)]
pub struct MockReply {
    pub status: u16,
    pub status_text: &'static str,
    pub body: String,
    pub delay_ms: u64,
}

impl MockReply {
    pub fn ok(body: &str) -> Self {
        Self::status(200, "OK", body)
    }

    pub fn status(status: u16, status_text: &'static str, body: &str) -> Self {
        Self {
            status,
            status_text,
            body: body.to_string(),
            delay_ms: 0,
        }
    }

    pub fn delayed(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }
}

type Routes = Arc<HashMap<String, MockReply>>;
type Bodies = Arc<Mutex<HashMap<String, String>>>;

pub struct MockProcedureServer {
    port: u16,
    running: Arc<AtomicBool>,
    bodies: Bodies,
    thread_handle: Option<thread::JoinHandle<()>>,
}

impl MockProcedureServer {
    /// Start on a random port with the given `(procedure, reply)` routes.
    pub fn start(routes: Vec<(&str, MockReply)>) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        listener.set_nonblocking(true)?;

        let routes: Routes = Arc::new(
            routes
                .into_iter()
                .map(|(name, reply)| (name.to_string(), reply))
                .collect(),
        );
        let bodies: Bodies = Arc::default();
        let running = Arc::new(AtomicBool::new(true));

        let thread_handle = {
            let running = running.clone();
            let bodies = bodies.clone();
            thread::spawn(move || {
                while running.load(Ordering::SeqCst) {
                    match listener.accept() {
                        Ok((stream, _)) => {
                            let routes = routes.clone();
                            let bodies = bodies.clone();
                            thread::spawn(move || handle_connection(stream, &routes, &bodies));
                        }
                        Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                            thread::sleep(Duration::from_millis(5));
                        }
                        Err(_) => break,
                    }
                }
            })
        };

        Ok(Self {
            port,
            running,
            bodies,
            thread_handle: Some(thread_handle),
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Body of the most recent request to `procedure`.
    pub fn last_body(&self, procedure: &str) -> Option<String> {
        self.bodies.lock().ok()?.get(procedure).cloned()
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockProcedureServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn handle_connection(stream: TcpStream, routes: &Routes, bodies: &Bodies) {
    let _ = stream.set_nonblocking(false);
    let mut reader = BufReader::new(match stream.try_clone() {
        Ok(s) => s,
        Err(_) => return,
    });

    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }
    let path = request_line.split_whitespace().nth(1).unwrap_or("/");
    let procedure = path
        .split('?')
        .next()
        .unwrap_or(path)
        .rsplit('/')
        .next()
        .unwrap_or("")
        .to_string();

    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
    }

    let mut body = vec![0u8; content_length];
    if reader.read_exact(&mut body).is_err() {
        return;
    }
    if let Ok(mut map) = bodies.lock() {
        map.insert(procedure.clone(), String::from_utf8_lossy(&body).into_owned());
    }

    let mut stream = stream;
    match routes.get(&procedure) {
        Some(reply) => {
            if reply.delay_ms > 0 {
                thread::sleep(Duration::from_millis(reply.delay_ms));
            }
            send_response(&mut stream, reply.status, reply.status_text, &reply.body);
        }
        None => send_response(&mut stream, 404, "Not Found", r#"{"error":"unknown procedure"}"#),
    }
}

fn send_response(stream: &mut TcpStream, status: u16, status_text: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        status_text,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}
