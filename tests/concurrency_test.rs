mod common;

use std::sync::Arc;
use std::time::Duration;
use common::{GatedProvider, CAR_PROBLEM};
use hintstep_lib::{ErrorKind, HintEscalationEngine, HintLevel};

fn gated_engine() -> (Arc<GatedProvider>, HintEscalationEngine<Arc<GatedProvider>>) {
    let provider = Arc::new(GatedProvider::new());
    let engine = HintEscalationEngine::new(provider.clone(), CAR_PROBLEM, None).unwrap();
    (provider, engine)
}

#[tokio::test]
async fn test_overlapping_request_is_rejected() {
    let (provider, engine) = gated_engine();

    let (first, second) = tokio::join!(engine.next_hint(), async {
        provider.entered.notified().await;
        assert!(engine.is_busy());
        let second = engine.next_hint().await;
        provider.release.notify_one();
        second
    });

    let first = first.unwrap().unwrap();
    assert_eq!(first.level, HintLevel::First);
    assert_eq!(second.unwrap_err().kind, ErrorKind::Busy);

    assert_eq!(engine.current_level(), 2);
    assert_eq!(provider.calls(), 1);
    assert!(!engine.is_busy());
    assert_eq!(engine.metrics().snapshot().busy_rejections, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_rejection_from_another_task() {
    let (provider, engine) = gated_engine();
    let engine = Arc::new(engine);

    let background = engine.clone();
    let handle = tokio::spawn(async move { background.next_hint().await });

    provider.entered.notified().await;
    let err = engine.next_hint().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Busy);
    assert_eq!(engine.current_level(), 1);

    provider.release.notify_one();
    let hint = handle.await.unwrap().unwrap().unwrap();
    assert_eq!(hint.hint, "gated hint 1");
    assert_eq!(engine.current_level(), 2);
}

#[tokio::test]
async fn test_cancelled_request_leaves_state_untouched() {
    let (provider, engine) = gated_engine();

    let timed_out = tokio::time::timeout(Duration::from_millis(20), engine.next_hint()).await;
    assert!(timed_out.is_err());

    assert!(!engine.is_busy());
    assert_eq!(engine.current_level(), 1);
    assert!(engine.delivered_hints().is_empty());

    provider.release.notify_one();
    let hint = engine.next_hint().await.unwrap().unwrap();
    assert_eq!(hint.level, HintLevel::First);
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn test_reset_during_flight_discards_late_result() {
    let (provider, engine) = gated_engine();

    let (first, _) = tokio::join!(engine.next_hint(), async {
        provider.entered.notified().await;
        engine.reset();
        provider.release.notify_one();
    });

    let err = first.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Superseded);
    assert_eq!(err.level, Some(HintLevel::First));
    assert_eq!(engine.current_level(), 1);
    assert!(engine.delivered_hints().is_empty());

    provider.release.notify_one();
    let hint = engine.next_hint().await.unwrap().unwrap();
    assert_eq!(hint.level, HintLevel::First);
    assert_eq!(provider.calls(), 2);
}
