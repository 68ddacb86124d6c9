//! Offline fixtures: a tiny HTTP server standing in for the archive index,
//! plus builders for synthetic archives and source lines.

use std::{
    collections::HashMap,
    io::{Cursor, Write},
    sync::{Arc, Mutex},
};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};
use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

use crate::schema::RAW_FIELDS;

/// Serves fixed bodies by path and records every requested path.
pub struct TestServer {
    base: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl TestServer {
    pub async fn start(routes: Vec<(String, Vec<u8>)>) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let base = format!("http://{}", listener.local_addr()?);
        let routes: Arc<HashMap<String, Vec<u8>>> = Arc::new(routes.into_iter().collect());
        let requests = Arc::new(Mutex::new(Vec::new()));

        let log = Arc::clone(&requests);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let routes = Arc::clone(&routes);
                let log = Arc::clone(&log);
                tokio::spawn(async move {
                    let _ = serve(stream, &routes, &log).await;
                });
            }
        });

        Ok(Self { base, requests })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of archive downloads served so far.
    pub fn archive_requests(&self) -> usize {
        self.requests()
            .iter()
            .filter(|p| p.ends_with(".zip"))
            .count()
    }
}

async fn serve(
    mut stream: TcpStream,
    routes: &HashMap<String, Vec<u8>>,
    log: &Mutex<Vec<String>>,
) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let request = String::from_utf8_lossy(&buf);
    let path = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();
    log.lock().unwrap().push(path.clone());

    let (status, body) = match routes.get(&path) {
        Some(body) => ("200 OK", body.clone()),
        None => ("404 Not Found", b"not found".to_vec()),
    };
    let head = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        body.len()
    );
    stream.write_all(head.as_bytes()).await?;
    stream.write_all(&body).await?;
    stream.shutdown().await
}

/// Build an in-memory zip with the given `(name, content)` entries.
pub fn zip_bytes(entries: &[(&str, &[u8])]) -> zip::result::ZipResult<Vec<u8>> {
    let mut buf = Vec::new();
    {
        let mut zip = ZipWriter::new(Cursor::new(&mut buf));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        for (name, content) in entries {
            zip.start_file(*name, options)?;
            zip.write_all(content)?;
        }
        zip.finish()?;
    }
    Ok(buf)
}

/// One source line with the given accident id and date; `values` sets other
/// fields by dataset column index (the region column is 0, so the raw field
/// index is `column - 1`). Everything else is left empty.
pub fn source_line(id: &str, values: &[(usize, &str)]) -> String {
    let mut fields = vec![String::new(); RAW_FIELDS];
    fields[0] = id.to_string();
    fields[3] = "2020-01-05".to_string();
    for (column, value) in values {
        fields[column - 1] = value.to_string();
    }
    fields.join(";")
}
