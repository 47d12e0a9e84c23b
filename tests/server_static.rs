use std::error::Error;
use std::fs;

use liveserve::serve;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

type TestResult = Result<(), Box<dyn Error>>;

async fn raw_get(addr: std::net::SocketAddr, path: &str) -> Result<String, Box<dyn Error>> {
    let mut stream = TcpStream::connect(addr).await?;
    let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await?;

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await?;
    Ok(String::from_utf8_lossy(&response).into_owned())
}

#[tokio::test]
async fn serves_files_from_the_output_directory() -> TestResult {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("index.html"), "<h1>docs</h1>")?;
    fs::write(dir.path().join("guide.html"), "<p>guide</p>")?;

    let listener = serve::bind("127.0.0.1", 0).await?;
    let addr = listener.local_addr()?;
    let root = dir.path().to_path_buf();
    tokio::spawn(async move {
        let _ = serve::serve(listener, root).await;
    });

    let response = raw_get(addr, "/guide.html").await?;
    assert!(response.starts_with("HTTP/1.1 200"));
    assert!(response.contains("<p>guide</p>"));

    // Directory request falls back to index.html.
    let response = raw_get(addr, "/").await?;
    assert!(response.starts_with("HTTP/1.1 200"));
    assert!(response.contains("<h1>docs</h1>"));

    Ok(())
}

#[tokio::test]
async fn missing_file_returns_404() -> TestResult {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("index.html"), "<h1>docs</h1>")?;

    let listener = serve::bind("127.0.0.1", 0).await?;
    let addr = listener.local_addr()?;
    let root = dir.path().to_path_buf();
    tokio::spawn(async move {
        let _ = serve::serve(listener, root).await;
    });

    let response = raw_get(addr, "/nope.html").await?;
    assert!(response.starts_with("HTTP/1.1 404"));

    Ok(())
}

#[tokio::test]
async fn bind_fails_when_port_is_taken() -> TestResult {
    // Occupy a port, then ask the server to bind it.
    let taken = std::net::TcpListener::bind("127.0.0.1:0")?;
    let port = taken.local_addr()?.port();

    let result = serve::bind("127.0.0.1", port).await;
    assert!(result.is_err());

    Ok(())
}

#[tokio::test]
async fn bind_rejects_a_malformed_host() -> TestResult {
    let result = serve::bind("not a host", 8000).await;
    assert!(result.is_err());

    Ok(())
}
