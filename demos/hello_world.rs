//! Minimal server demo: binds to `127.0.0.1:8080` and answers every request
//! with a plain-text greeting.
//!
//! Run with `cargo run --example hello_world`.

use httpcore::http::{Response, StatusCode, Version};
use httpcore::server::{Server, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let config = ServerConfig::new("127.0.0.1:8080");
    let server = Server::bind(config).await?;
    println!("listening on http://{}", server.local_addr());

    server
        .run(|request, session| async move {
            let body = format!(
                "hello from session {} (request #{})\nyou asked for {} {}\n",
                session.id,
                session.reuse_count + 1,
                request.method(),
                String::from_utf8_lossy(request.path()),
            );
            Response::new(Version::Http11, StatusCode::OK)
                .header("Content-Type", "text/plain; charset=utf-8")
                .body(body.into_bytes())
        })
        .await?;

    Ok(())
}
