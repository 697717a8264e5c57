//! Ticket feed tests against an in-process websocket server.

use std::future::Future;
use std::sync::{Arc, Mutex};
use futures::{SinkExt, StreamExt};
use helpdesk_agent::{FeedError, FeedMessage, TicketFeed, UpdateType};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

/// Accepts one websocket client and hands it to `script`. Returns the URL.
async fn serve_once<F, Fut>(script: F) -> String
where
    F:   FnOnce(WebSocketStream<TcpStream>) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.unwrap();
        let ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
        script(ws).await;
    });
    format!("ws://{}", addr)
}

async fn send_all(ws: &mut WebSocketStream<TcpStream>, frames: &[&str]) {
    for frame in frames {
        ws.send(Message::Text(frame.to_string())).await.unwrap();
    }
}

#[tokio::test]
async fn clean_close_ends_stream_without_error() {
    let url = serve_once(|mut ws| async move {
        send_all(&mut ws, &[
            r#"{"ticketId":"t-1","updateType":"created"}"#,
            "t-2",
        ]).await;
        ws.close(None).await.unwrap();
        while ws.next().await.is_some() {}
    }).await;

    let items: Vec<_> = TicketFeed::connect(&url).await.unwrap()
        .into_stream()
        .collect()
        .await;

    assert_eq!(items.len(), 2);
    match items[0].as_ref().unwrap() {
        FeedMessage::Update(event) => {
            assert_eq!(event.ticket_id.as_deref(), Some("t-1"));
            assert_eq!(event.update_type, Some(UpdateType::Created));
        }
        other => panic!("expected update, got {:?}", other),
    }
    assert_eq!(items[1].as_ref().unwrap(), &FeedMessage::Raw("t-2".to_string()));
}

#[tokio::test]
async fn abrupt_disconnect_yields_one_transport_error() {
    let url = serve_once(|mut ws| async move {
        send_all(&mut ws, &[r#"{"ticketId":"t-1","updateType":"updated"}"#]).await;
        // Dropping the socket skips the closing handshake.
        drop(ws);
    }).await;

    let items: Vec<_> = TicketFeed::connect(&url).await.unwrap()
        .into_stream()
        .collect()
        .await;

    assert_eq!(items.len(), 2);
    assert!(items[0].is_ok());
    match &items[1] {
        Err(e @ FeedError::Transport(_)) => assert!(!e.to_string().is_empty()),
        other => panic!("expected transport error, got {:?}", other),
    }
}

#[tokio::test]
async fn malformed_json_frame_ends_stream_with_decode_error() {
    let url = serve_once(|mut ws| async move {
        send_all(&mut ws, &[r#"{"ticketId": "#, "never-read"]).await;
        let _ = ws.close(None).await;
    }).await;

    let items: Vec<_> = TicketFeed::connect(&url).await.unwrap()
        .into_stream()
        .collect()
        .await;

    assert_eq!(items.len(), 1);
    assert!(matches!(items[0], Err(FeedError::Decode(_))));
}

#[tokio::test]
async fn observer_sees_every_message_in_order() {
    let url = serve_once(|mut ws| async move {
        send_all(&mut ws, &["a", "b", "c"]).await;
        ws.close(None).await.unwrap();
        while ws.next().await.is_some() {}
    }).await;

    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&seen);

    let count = TicketFeed::connect(&url).await.unwrap()
        .with_observer(Arc::new(move |msg: &FeedMessage| {
            recorder.lock().unwrap().push(msg.ticket_id().unwrap_or_default().to_string());
        }))
        .listen()
        .await
        .unwrap();

    assert_eq!(count, 3);
    assert_eq!(*seen.lock().unwrap(), vec!["a", "b", "c"]);
}

#[tokio::test]
async fn unreachable_endpoint_is_connect_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let url = format!("ws://{}", addr);
    match TicketFeed::connect(&url).await {
        Err(FeedError::Connect { url: failed, .. }) => assert_eq!(failed, url),
        Err(other) => panic!("expected connect error, got {:?}", other),
        Ok(_) => panic!("connection should fail"),
    }
}
