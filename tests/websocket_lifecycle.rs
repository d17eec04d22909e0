//! End-to-end WebSocket lifecycle over a real TCP socket.
//!
//! The router is served on an ephemeral port and a tungstenite client
//! connects to it, so the upgrade, join and leave paths run exactly as in
//! production.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use dining_orders::adapters::auth::MockSessionValidator;
use dining_orders::adapters::http::{build_app, AppState, HttpSettings};
use dining_orders::adapters::memory::{InMemoryOrderRepository, InMemoryPaymentRepository};
use dining_orders::adapters::stripe::MockPaymentProvider;
use dining_orders::adapters::websocket::{BroadcastHub, MessageType};
use dining_orders::domain::foundation::OrderId;
use dining_orders::ports::OrderRepository;

const WAIT: Duration = Duration::from_secs(5);

struct Server {
    addr: SocketAddr,
    hub: Arc<BroadcastHub>,
    order_id: OrderId,
}

async fn serve() -> Server {
    let repo = Arc::new(InMemoryOrderRepository::new());
    let restaurant = repo.add_restaurant("Noodle House").await;
    let table = repo.add_table(restaurant, "usd").await;
    let order_id = repo.create_order_for_table(&table, "usd").await.unwrap().id;

    let hub = Arc::new(BroadcastHub::new());
    let state = AppState::new(
        repo,
        Arc::new(InMemoryPaymentRepository::new()),
        Arc::new(MockPaymentProvider::new()),
    )
    .with_hub(hub.clone());
    let app = build_app(
        state,
        Arc::new(MockSessionValidator::new()),
        &HttpSettings::default(),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Server {
        addr,
        hub,
        order_id,
    }
}

impl Server {
    fn ws_url(&self) -> String {
        format!("ws://{}/api/v1/orders/{}/ws", self.addr, self.order_id)
    }
}

/// Polls `check` until it holds or the deadline passes.
async fn eventually<F, Fut>(mut check: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    tokio::time::timeout(WAIT, async {
        while !check().await {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

#[tokio::test]
async fn connection_joins_and_leaves_the_hub() {
    let server = serve().await;
    let hub = server.hub.clone();
    let order_id = server.order_id;

    let (client, _) = tokio_tungstenite::connect_async(server.ws_url())
        .await
        .unwrap();

    eventually(|| {
        let hub = hub.clone();
        async move { hub.subscriber_count(&order_id).await == 1 }
    })
    .await;
    assert_eq!(hub.active_orders().await, vec![order_id]);

    drop(client);

    eventually(|| {
        let hub = hub.clone();
        async move { hub.subscriber_count(&order_id).await == 0 }
    })
    .await;
    assert!(hub.active_orders().await.is_empty());
    assert_eq!(hub.total_connections().await, 0);
}

#[tokio::test]
async fn broadcast_reaches_a_connected_client() {
    let server = serve().await;
    let hub = server.hub.clone();
    let order_id = server.order_id;

    let (mut client, _) = tokio_tungstenite::connect_async(server.ws_url())
        .await
        .unwrap();
    eventually(|| {
        let hub = hub.clone();
        async move { hub.subscriber_count(&order_id).await == 1 }
    })
    .await;

    let delivered = hub
        .broadcast(&order_id, MessageType::UpdateOrder, &json!({"status": "locked"}))
        .await;
    assert_eq!(delivered, 1);

    let frame = tokio::time::timeout(WAIT, client.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    let frame: Value = serde_json::from_str(frame.to_text().unwrap()).unwrap();
    assert_eq!(
        frame,
        json!({"type": "update_order", "data": {"status": "locked"}})
    );
}

#[tokio::test]
async fn upgrade_for_unknown_order_is_refused() {
    let server = serve().await;
    let url = format!("ws://{}/api/v1/orders/{}/ws", server.addr, OrderId::new());

    let result = tokio_tungstenite::connect_async(url).await;

    assert!(result.is_err());
    assert!(server.hub.active_orders().await.is_empty());
}
