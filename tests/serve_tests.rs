use taxfiling_admin::{
    config::Config,
    db::Database,
    server::{self, AppState},
};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    sync::oneshot,
};

#[tokio::test]
async fn serves_over_tcp_and_shuts_down_gracefully() {
    let db = Database::connect("sqlite::memory:").expect("in-memory url parses");
    let app = server::app_router(AppState::new(Config::default(), db)).expect("router builds");

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let handle = tokio::spawn(server::serve(listener, app, async move {
        let _ = stop_rx.await;
    }));

    let mut stream = TcpStream::connect(addr).await.expect("connect");
    stream
        .write_all(b"GET /api/health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .expect("write request");
    let mut raw = String::new();
    stream.read_to_string(&mut raw).await.expect("read response");

    assert!(raw.starts_with("HTTP/1.1 200 OK"), "unexpected response: {raw}");
    assert!(raw.ends_with(r#"{"message":"Admin panel API is running","status":"healthy"}"#));

    stop_tx.send(()).expect("server still running");
    handle
        .await
        .expect("server task panicked")
        .expect("server returned an error");
}
