//! A canned-response HTTP server on localhost, one reply per connection.

use std::{
    io::{BufRead, BufReader, Read, Write},
    net::{TcpListener, TcpStream},
    sync::mpsc::{self, Receiver},
    thread,
};

pub struct Reply {
    status: u16,
    headers: Vec<(String, String)>,
    body: String,
}

impl Reply {
    pub fn new(status: u16, body: impl Into<String>) -> Reply {
        Reply {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<String>) -> Reply {
        Reply::new(200, body)
    }

    pub fn too_many_requests() -> Reply {
        Reply::new(429, "Retry later")
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Reply {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut text = format!(
            "HTTP/1.1 {} Stub\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n",
            self.status,
            self.body.len()
        );
        for (name, value) in &self.headers {
            text.push_str(&format!("{}: {}\r\n", name, value));
        }
        text.push_str("\r\n");
        text.push_str(&self.body);
        text.into_bytes()
    }
}

pub struct StubServer {
    pub base_url: String,
    requests: Receiver<String>,
}

impl StubServer {
    /// Serves `replies` in order, then stops accepting
    pub fn start(replies: Vec<Reply>) -> StubServer {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind to a free port");
        let base_url = format!("http://{}", listener.local_addr().expect("local addr"));
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            for reply in replies {
                let Ok((mut stream, _)) = listener.accept() else {
                    return;
                };
                let request = read_request(&mut stream);
                if tx.send(request).is_err() {
                    return;
                }
                let _ = stream.write_all(&reply.to_bytes());
                let _ = stream.flush();
            }
        });

        StubServer {
            base_url,
            requests: rx,
        }
    }

    /// Every request received so far, head and body
    pub fn requests(&self) -> Vec<String> {
        self.requests.try_iter().collect()
    }
}

fn read_request(stream: &mut TcpStream) -> String {
    let mut reader = BufReader::new(stream);
    let mut request = String::new();
    let mut content_length = 0;

    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
        request.push_str(&line);
        if line == "\r\n" {
            break;
        }
    }

    let mut body = vec![0; content_length];
    if reader.read_exact(&mut body).is_ok() {
        request.push_str(&String::from_utf8_lossy(&body));
    }

    request
}

pub fn search_page(count: Option<&str>) -> String {
    let heading = match count {
        Some(count) => format!(r#"<h3 class="heading">{} Found</h3>"#, count),
        None => String::from(r#"<p>No results found.</p>"#),
    };
    format!(
        r#"<!DOCTYPE html><html><body><div id="main" class="works-search region">{}</div></body></html>"#,
        heading
    )
}

pub fn login_page(token: &str) -> String {
    format!(
        r#"<html><body><div id="main"><form id="new_user" action="/users/login" method="post">
        <input type="hidden" name="authenticity_token" value="{}" autocomplete="off" />
        <input type="text" name="user[login]" /><input type="password" name="user[password]" />
        </form></div></body></html>"#,
        token
    )
}
