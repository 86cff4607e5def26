//! We use this mocking module in unit tests to stand in for the PSU's web server on loopback.

use std::{
    io::{BufRead, BufReader, Read, Write},
    net::{TcpListener, TcpStream},
    thread::{self, JoinHandle},
};

/// A form post as received by [`MockHttp`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    /// E.g. `POST /home.cgi HTTP/1.1`
    pub request_line: String,
    pub body: String,
}

/// Answers a fixed sequence of requests, one connection each, then stops listening.
pub struct MockHttp {
    port: u16,
    server: JoinHandle<Vec<RecordedRequest>>,
}

impl MockHttp {
    /// Serve `responses` as `(status, body)` pairs, in order.
    pub fn serve(responses: &[(u16, &str)]) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let responses: Vec<(u16, String)> = responses
            .iter()
            .map(|(status, body)| (*status, body.to_string()))
            .collect();

        let server = thread::spawn(move || {
            responses
                .into_iter()
                .map(|(status, body)| {
                    let (stream, _) = listener.accept().unwrap();
                    answer(stream, status, &body)
                })
                .collect()
        });
        Self { port, server }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Wait until every response has been served and return the requests received.
    pub fn requests(self) -> Vec<RecordedRequest> {
        self.server.join().unwrap()
    }
}

fn answer(stream: TcpStream, status: u16, body: &str) -> RecordedRequest {
    let mut reader = BufReader::new(stream.try_clone().unwrap());
    let mut request_line = String::new();
    reader.read_line(&mut request_line).unwrap();

    let mut content_length = 0;
    loop {
        let mut header = String::new();
        reader.read_line(&mut header).unwrap();
        let header = header.trim_end();
        if header.is_empty() {
            break;
        }
        if let Some((name, value)) = header.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap();
            }
        }
    }
    let mut request_body = vec![0u8; content_length];
    reader.read_exact(&mut request_body).unwrap();

    let reason = if status == 200 { "OK" } else { "Error" };
    let mut stream = stream;
    write!(
        stream,
        "HTTP/1.1 {status} {reason}\r\nContent-Type: text/html\r\nContent-Length: {}\r\n\
         Connection: close\r\n\r\n{body}",
        body.len()
    )
    .unwrap();
    stream.flush().unwrap();

    RecordedRequest {
        request_line: request_line.trim_end().to_string(),
        body: String::from_utf8(request_body).unwrap(),
    }
}
