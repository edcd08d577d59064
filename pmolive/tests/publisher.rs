mod common;

use common::{MockTransport, ScriptedSource};
use pmolive::{
    FETCH_FAILED, PollingPublisher, RegistryEvent, SnapshotCapture, SubscriberRegistry,
    Termination,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::TryRecvError;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

const INTERVAL: Duration = Duration::from_secs(5);

struct Session {
    registry: Arc<SubscriberRegistry>,
    cancel: CancellationToken,
    handle: tokio::task::JoinHandle<pmolive::SessionOutcome>,
    id: pmolive::SubscriberId,
}

async fn start_session(
    source: Arc<ScriptedSource>,
    transport: Arc<MockTransport>,
) -> Session {
    let registry = Arc::new(SubscriberRegistry::new());
    let id = registry.admit(transport).await.unwrap();
    let cancel = CancellationToken::new();
    let publisher = PollingPublisher::new(
        registry.clone(),
        id,
        SnapshotCapture::new(source),
        INTERVAL,
        cancel.clone(),
    );
    Session {
        registry,
        cancel,
        handle: tokio::spawn(publisher.run()),
        id,
    }
}

#[tokio::test(start_paused = true)]
async fn playing_track_is_delivered() {
    let (transport, mut rx) = MockTransport::new();
    let session = start_session(
        ScriptedSource::playing("Song A", "Artist X", 1_000, 200_000),
        transport,
    )
    .await;

    let json = rx.recv().await.unwrap().json();
    assert_eq!(json["is_playing"], true);
    assert_eq!(json["track"]["name"], "Song A");
    assert_eq!(json["track"]["artists"], serde_json::json!(["Artist X"]));
    assert_eq!(json["track"]["progress_ms"], 1_000);
    assert_eq!(json["track"]["duration_ms"], 200_000);
    assert_eq!(
        json["track"]["artist_images"],
        serde_json::json!([{"name": "Artist X", "image": "https://img/artist-x"}])
    );

    session.cancel.cancel();
    assert_eq!(
        session.handle.await.unwrap().reason,
        Termination::Disconnected
    );
}

#[tokio::test(start_paused = true)]
async fn nothing_playing_keeps_the_session_alive() {
    let (transport, mut rx) = MockTransport::new();
    let session = start_session(ScriptedSource::nothing_playing(), transport).await;

    for _ in 0..3 {
        let json = rx.recv().await.unwrap().json();
        assert_eq!(json["is_playing"], false);
        assert!(!json["message"].as_str().unwrap().is_empty());
        assert!(json.get("error").is_none());
    }
    assert!(!session.handle.is_finished());
    assert!(session.registry.contains(&session.id).await);

    session.cancel.cancel();
    session.handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn failing_source_degrades_every_interval() {
    let source = ScriptedSource::failing("connection refused");
    let (transport, mut rx) = MockTransport::new();
    let session = start_session(source.clone(), transport).await;

    let mut deliveries = Vec::new();
    for _ in 0..4 {
        deliveries.push(rx.recv().await.unwrap());
    }

    for delivery in &deliveries {
        let json = delivery.json();
        assert_eq!(json["is_playing"], false);
        assert_eq!(json["message"], FETCH_FAILED);
        assert!(json["error"].as_str().unwrap().contains("connection refused"));
    }
    for pair in deliveries.windows(2) {
        assert_eq!(pair[1].at - pair[0].at, INTERVAL);
    }
    assert!(!session.handle.is_finished());

    session.cancel.cancel();
    let outcome = session.handle.await.unwrap();
    assert_eq!(outcome.reason, Termination::Disconnected);
    assert_eq!(outcome.deliveries, 4);
    assert_eq!(source.queries(), 4);
}

#[tokio::test(start_paused = true)]
async fn disconnect_mid_sleep_evicts_exactly_once() {
    let (transport, mut rx) = MockTransport::new();
    let session = start_session(ScriptedSource::nothing_playing(), transport).await;
    let mut events = session.registry.subscribe_events();

    rx.recv().await.unwrap();
    tokio::time::sleep(Duration::from_secs(2)).await;

    let cancelled_at = Instant::now();
    session.cancel.cancel();
    let outcome = session.handle.await.unwrap();

    assert!(cancelled_at.elapsed() < INTERVAL);
    assert_eq!(outcome.reason, Termination::Disconnected);
    assert_eq!(outcome.deliveries, 1);
    assert_eq!(events.try_recv().unwrap(), RegistryEvent::Evicted(session.id));
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
    assert!(session.registry.is_empty().await);
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn disconnect_interrupts_a_pending_delivery() {
    let registry = Arc::new(SubscriberRegistry::with_delivery_timeout(Duration::from_secs(
        3_600,
    )));
    let (stalled, _rx) = MockTransport::stalled();
    let id = registry.admit(stalled.clone()).await.unwrap();
    let cancel = CancellationToken::new();
    let publisher = PollingPublisher::new(
        registry.clone(),
        id,
        SnapshotCapture::new(ScriptedSource::nothing_playing()),
        INTERVAL,
        cancel.clone(),
    );
    let handle = tokio::spawn(publisher.run());

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(stalled.attempts(), 1);
    let cancelled_at = Instant::now();
    cancel.cancel();

    let outcome = tokio::time::timeout(Duration::from_secs(60), handle)
        .await
        .expect("session ends without waiting for the write")
        .unwrap();
    assert_eq!(cancelled_at.elapsed(), Duration::ZERO);
    assert_eq!(outcome.reason, Termination::Disconnected);
    assert_eq!(outcome.deliveries, 0);
    assert!(!registry.contains(&id).await);
}

#[tokio::test(start_paused = true)]
async fn delivery_failure_ends_the_session() {
    let (transport, mut rx) = MockTransport::failing_after(2);
    let session = start_session(ScriptedSource::nothing_playing(), transport.clone()).await;
    let mut events = session.registry.subscribe_events();

    let outcome = session.handle.await.unwrap();
    assert_eq!(outcome.reason, Termination::DeliveryFailed);
    assert_eq!(outcome.deliveries, 2);
    assert_eq!(transport.attempts(), 3);

    assert_eq!(rx.recv().await.unwrap().payload, rx.recv().await.unwrap().payload);
    assert_eq!(events.try_recv().unwrap(), RegistryEvent::Evicted(session.id));
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
    assert!(session.registry.is_empty().await);
}

#[tokio::test(start_paused = true)]
async fn cancelling_one_session_leaves_the_other_running() {
    let registry = Arc::new(SubscriberRegistry::new());
    let source = ScriptedSource::nothing_playing();

    let mut sessions = Vec::new();
    for _ in 0..2 {
        let (transport, rx) = MockTransport::new();
        let id = registry.admit(transport).await.unwrap();
        let cancel = CancellationToken::new();
        let publisher = PollingPublisher::new(
            registry.clone(),
            id,
            SnapshotCapture::new(source.clone()),
            INTERVAL,
            cancel.clone(),
        );
        sessions.push((id, cancel, rx, tokio::spawn(publisher.run())));
    }

    let (first_id, first_cancel, _, first_handle) = sessions.remove(0);
    let (second_id, second_cancel, mut second_rx, second_handle) = sessions.remove(0);

    first_cancel.cancel();
    assert_eq!(first_handle.await.unwrap().subscriber, first_id);

    for _ in 0..3 {
        second_rx.recv().await.unwrap();
    }
    assert!(registry.contains(&second_id).await);
    assert!(!registry.contains(&first_id).await);

    second_cancel.cancel();
    second_handle.await.unwrap();
}
