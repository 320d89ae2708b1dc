use super::*;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use std::time::Instant;

use axum::{
    extract::{
        ws::{Message as WsMessage, WebSocket, WebSocketUpgrade},
        State,
    },
    routing::get,
    Router,
};
use shared::protocol::ToastLevel;
use tokio::net::TcpListener;

#[derive(Clone, Default)]
struct ConnStats {
    total: Arc<AtomicUsize>,
    live: Arc<AtomicUsize>,
    max_live: Arc<AtomicUsize>,
}

impl ConnStats {
    fn enter(&self) {
        self.total.fetch_add(1, Ordering::SeqCst);
        let live = self.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_live.fetch_max(live, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

async fn spawn_ws_server<F, Fut>(handler: F) -> (String, ConnStats)
where
    F: Fn(WebSocket, ConnStats) -> Fut + Clone + Send + Sync + 'static,
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    let stats = ConnStats::default();
    let state = (handler, stats.clone());
    let app = Router::new()
        .route(
            "/ws",
            get(
                |upgrade: WebSocketUpgrade, State((handler, stats)): State<(F, ConnStats)>| async move {
                    upgrade.on_upgrade(move |socket| async move {
                        stats.enter();
                        handler(socket, stats.clone()).await;
                        stats.leave();
                    })
                },
            ),
        )
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}"), stats)
}

async fn next_event(rx: &mut tokio::sync::broadcast::Receiver<ChannelEvent>) -> ChannelEvent {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for channel event")
        .expect("channel closed")
}

#[tokio::test]
async fn delivers_events_in_order_after_connect() {
    let (server_url, _stats) = spawn_ws_server(|mut socket: WebSocket, _stats| async move {
        let frames = [
            r#"{"event":"status","data":{"next_run_at":"2026-08-06T10:00:00+00:00","interval_minutes":60}}"#,
            r#"{"event":"toast","data":{"type":"ok","message":"sent"}}"#,
            r#"{"event":"new_image","data":{}}"#,
        ];
        for frame in frames {
            let _ = socket.send(WsMessage::Text(frame.to_string())).await;
        }
        while socket.recv().await.is_some() {}
    })
    .await;

    let channel = LiveChannel::new();
    let mut rx = channel.subscribe();
    channel.start(&server_url).await.expect("start");

    assert_eq!(next_event(&mut rx).await, ChannelEvent::Connected);
    assert!(matches!(
        next_event(&mut rx).await,
        ChannelEvent::Event(LiveEvent::Status { next_run_at: Some(_), interval_minutes: Some(60) })
    ));
    assert_eq!(
        next_event(&mut rx).await,
        ChannelEvent::Event(LiveEvent::Toast {
            level: ToastLevel::Ok,
            message: "sent".into(),
        })
    );
    assert_eq!(
        next_event(&mut rx).await,
        ChannelEvent::Event(LiveEvent::NewImage { record: None })
    );

    channel.shutdown().await;
}

#[tokio::test]
async fn malformed_frames_are_dropped_without_killing_the_channel() {
    let (server_url, _stats) = spawn_ws_server(|mut socket: WebSocket, _stats| async move {
        let frames = [
            "not json at all",
            r#"{"event":"presence","data":{}}"#,
            r#"{"event":"toast","data":{"message":"still alive"}}"#,
        ];
        for frame in frames {
            let _ = socket.send(WsMessage::Text(frame.to_string())).await;
        }
        while socket.recv().await.is_some() {}
    })
    .await;

    let channel = LiveChannel::new();
    let mut rx = channel.subscribe();
    channel.start(&server_url).await.expect("start");

    assert_eq!(next_event(&mut rx).await, ChannelEvent::Connected);
    // The two malformed frames are skipped; the next delivery is the valid
    // toast.
    assert_eq!(
        next_event(&mut rx).await,
        ChannelEvent::Event(LiveEvent::Toast {
            level: ToastLevel::Ok,
            message: "still alive".into(),
        })
    );

    channel.shutdown().await;
}

#[tokio::test]
async fn reconnects_after_the_fixed_delay_without_leaking_connections() {
    let (server_url, stats) = spawn_ws_server(|mut socket: WebSocket, _stats| async move {
        // Drop the connection immediately to force a reconnect cycle.
        let _ = socket.send(WsMessage::Close(None)).await;
        while socket.recv().await.is_some() {}
    })
    .await;

    let channel = LiveChannel::new();
    let mut rx = channel.subscribe();
    channel.start(&server_url).await.expect("start");

    let mut connected_at = Vec::new();
    while connected_at.len() < 3 {
        if next_event(&mut rx).await == ChannelEvent::Connected {
            connected_at.push(Instant::now());
        }
    }

    for pair in connected_at.windows(2) {
        let gap = pair[1] - pair[0];
        assert!(
            gap >= RECONNECT_DELAY - Duration::from_millis(100),
            "reconnected after {gap:?}, expected at least {RECONNECT_DELAY:?}"
        );
    }
    assert_eq!(stats.max_live.load(Ordering::SeqCst), 1);
    assert!(stats.total.load(Ordering::SeqCst) >= 3);

    channel.shutdown().await;
}

#[tokio::test]
async fn shutdown_stops_the_reconnect_loop() {
    let (server_url, stats) = spawn_ws_server(|mut socket: WebSocket, _stats| async move {
        let _ = socket.send(WsMessage::Close(None)).await;
        while socket.recv().await.is_some() {}
    })
    .await;

    let channel = LiveChannel::new();
    let mut rx = channel.subscribe();
    channel.start(&server_url).await.expect("start");
    assert_eq!(next_event(&mut rx).await, ChannelEvent::Connected);

    channel.shutdown().await;
    tokio::time::sleep(RECONNECT_DELAY * 3).await;
    let total_after_shutdown = stats.total.load(Ordering::SeqCst);
    tokio::time::sleep(RECONNECT_DELAY * 2).await;
    assert_eq!(stats.total.load(Ordering::SeqCst), total_after_shutdown);
}

#[test]
fn derives_ws_urls_from_http_bases() {
    assert_eq!(
        ws_url_for("http://localhost:8080").expect("ws url"),
        "ws://localhost:8080/ws"
    );
    assert_eq!(
        ws_url_for("https://dash.example.org/").expect("wss url"),
        "wss://dash.example.org/ws"
    );
    assert!(matches!(
        ws_url_for("ftp://dash.example.org"),
        Err(ClientError::InvalidServerUrl(_))
    ));
}
