//! Integration tests for the event-iter crate.
//!
//! Every scenario runs against both source shapes:
//! - Ordering and channel filtering
//! - Error delivery and exhaustion
//! - Concurrent pulls and termination
//! - Consumer abort
//! - Listener cleanup on every exit path


use std::sync::Arc;
use std::time::Duration;

use event_iter::{
    adapt_with_config, from_emitter, AdapterConfig, AdapterError, AdapterState, EmitterSource,
    IterResult, LocalEmitter,
};
use futures::future::join_all;
use futures::StreamExt;
use rstest::rstest;
use test_helpers::{done, yielded, Fixture, Variant, CHANNEL};

#[rstest]
#[case::emitter(Variant::Emitter)]
#[case::target(Variant::Target)]
#[tokio::test]
async fn test_only_target_channel_is_yielded(#[case] variant: Variant) {
    let fx = Fixture::new(variant);

    fx.fire(CHANNEL, "bar");
    fx.fire("bar", "24");
    fx.fire(CHANNEL, "42");

    assert_eq!(fx.advance().await, yielded("bar"));
    assert_eq!(fx.advance().await, yielded("42"));
    assert_eq!(fx.buffered_len(), 0);
}

#[rstest]
#[case::emitter(Variant::Emitter)]
#[case::target(Variant::Target)]
#[tokio::test]
async fn test_error_is_delivered_once_then_exhausts(#[case] variant: Variant) {
    let fx = Fixture::new(variant);

    fx.fire_error("kaboom");

    assert_eq!(fx.advance().await, Err("kaboom".to_string()));
    for _ in 0..3 {
        assert_eq!(fx.advance().await, done());
    }
}

#[rstest]
#[case::emitter(Variant::Emitter)]
#[case::target(Variant::Target)]
#[tokio::test]
async fn test_payload_before_error_reaches_waiting_consumer(#[case] variant: Variant) {
    let fx = Fixture::new(variant);

    let first = fx.advance();
    fx.fire(CHANNEL, "42");
    fx.fire_error("kaboom");

    assert_eq!(first.await, yielded("42"));
    assert_eq!(fx.advance().await, Err("kaboom".to_string()));
    assert_eq!(fx.advance().await, done());
}

#[rstest]
#[case::emitter(Variant::Emitter)]
#[case::target(Variant::Target)]
#[tokio::test]
async fn test_error_discards_backlog(#[case] variant: Variant) {
    let fx = Fixture::new(variant);

    fx.fire(CHANNEL, "stale");
    fx.fire_error("kaboom");

    assert_eq!(fx.buffered_len(), 0);
    assert_eq!(fx.advance().await, Err("kaboom".to_string()));
    assert_eq!(fx.advance().await, done());
}

#[rstest]
#[case::emitter(Variant::Emitter)]
#[case::target(Variant::Target)]
#[tokio::test]
async fn test_error_fails_every_pending_request(#[case] variant: Variant) {
    let fx = Fixture::new(variant);

    let pulls = vec![fx.advance(), fx.advance()];
    fx.fire_error("kaboom");

    let results = join_all(pulls).await;
    assert_eq!(
        results,
        vec![Err("kaboom".to_string()), Err("kaboom".to_string())]
    );

    // Every pending pull already saw the error
    assert_eq!(fx.advance().await, done());
}

#[rstest]
#[case::emitter(Variant::Emitter)]
#[case::target(Variant::Target)]
#[tokio::test]
async fn test_concurrent_pulls_resolve_in_issuance_order(#[case] variant: Variant) {
    let fx = Fixture::new(variant);

    let pulls = vec![fx.advance(), fx.advance(), fx.advance()];
    fx.fire(CHANNEL, "v1");
    fx.fire(CHANNEL, "v2");
    let terminated = fx.terminate().await;
    assert!(terminated.is_done());
    assert_eq!(terminated.value(), None);

    let results = join_all(pulls).await;
    assert_eq!(results, vec![yielded("v1"), yielded("v2"), done()]);
}

#[rstest]
#[case::emitter(Variant::Emitter)]
#[case::target(Variant::Target)]
#[tokio::test]
async fn test_abort_without_error_fails_synchronously(#[case] variant: Variant) {
    let fx = Fixture::new(variant);
    fx.fire(CHANNEL, "kept");

    let result = fx.abort(None);
    match result {
        Err(AdapterError::InvalidArgument { name, received }) => {
            assert_eq!(name, "err");
            assert_eq!(received, "None");
        }
        other => panic!("Expected InvalidArgument, got {:?}", other),
    }

    assert_eq!(fx.state(), AdapterState::Active);
    assert_eq!(fx.buffered_len(), 1);
    assert_eq!(fx.advance().await, yielded("kept"));
}

#[rstest]
#[case::emitter(Variant::Emitter)]
#[case::target(Variant::Target)]
#[tokio::test]
async fn test_abort_rejects_pending_request(#[case] variant: Variant) {
    let fx = Fixture::new(variant);

    let pending = fx.advance();
    fx.abort(Some("stop")).unwrap();

    assert_eq!(pending.await, Err("stop".to_string()));
    assert_eq!(fx.advance().await, done());
    assert_eq!(fx.state(), AdapterState::Errored);
}

#[rstest]
#[case::emitter(Variant::Emitter)]
#[case::target(Variant::Target)]
#[tokio::test]
async fn test_terminate_is_idempotent(#[case] variant: Variant) {
    let fx = Fixture::new(variant);

    assert!(fx.terminate().await.is_done());
    assert!(fx.terminate().await.is_done());
    assert_eq!(fx.state(), AdapterState::Done);

    fx.fire(CHANNEL, "late");
    assert_eq!(fx.advance().await, done());
}

#[rstest]
#[case::emitter(Variant::Emitter)]
#[case::target(Variant::Target)]
fn test_error_listener_registered_on_construction(#[case] variant: Variant) {
    let fx = Fixture::new(variant);

    assert_eq!(fx.listener_count("error"), 1);
    assert_eq!(fx.listener_count(CHANNEL), 1);
}

/// Ways a consumer can stop using an adapter
#[derive(Debug, Clone, Copy)]
enum Exit {
    Terminate,
    SourceError,
    Abort,
    Drop,
}

#[rstest]
fn test_listener_cleanup_on_every_exit(
    #[values(Variant::Emitter, Variant::Target)] variant: Variant,
    #[values(Exit::Terminate, Exit::SourceError, Exit::Abort, Exit::Drop)] exit: Exit,
) {
    let fx = Fixture::new(variant);
    fx.fire(CHANNEL, "pending");

    let source = match exit {
        Exit::Terminate => {
            let _ = fx.terminate();
            fx.drop_events()
        }
        Exit::SourceError => {
            fx.fire_error("kaboom");
            assert_eq!(fx.listener_count(CHANNEL), 0);
            fx.drop_events()
        }
        Exit::Abort => {
            fx.abort(Some("stop")).unwrap();
            assert_eq!(fx.listener_count(CHANNEL), 0);
            fx.drop_events()
        }
        Exit::Drop => fx.drop_events(),
    };

    assert_eq!(source.listener_count(CHANNEL), 0);
    assert_eq!(source.listener_count("error"), 0);
}

#[rstest]
#[case::emitter(Variant::Emitter)]
#[case::target(Variant::Target)]
#[tokio::test]
async fn test_unbounded_buffering_keeps_every_payload(#[case] variant: Variant) {
    let fx = Fixture::new(variant);
    let values: Vec<String> = (0..1000).map(|i| i.to_string()).collect();

    for value in &values {
        fx.fire(CHANNEL, value);
    }
    assert_eq!(fx.buffered_len(), values.len());

    for value in &values {
        assert_eq!(fx.advance().await, yielded(value));
    }
}

#[rstest]
#[case::emitter(Variant::Emitter)]
#[case::target(Variant::Target)]
#[tokio::test]
async fn test_dropped_pull_does_not_lose_payload(#[case] variant: Variant) {
    let fx = Fixture::new(variant);

    let abandoned = fx.advance();
    drop(abandoned);
    fx.fire(CHANNEL, "saved");

    assert_eq!(fx.advance().await, yielded("saved"));
}

#[tokio::test]
async fn test_emitter_keeps_full_argument_list() {
    let emitter = Arc::new(LocalEmitter::<i64, String>::new());
    let events = from_emitter(Arc::clone(&emitter), "foo");

    emitter.emit("foo", &[1, 2, 3]);
    emitter.emit("foo", &[]);

    assert_eq!(events.advance().await, Ok(IterResult::yielded(vec![1, 2, 3])));
    assert_eq!(events.advance().await, Ok(IterResult::yielded(vec![])));
}

#[tokio::test]
async fn test_stream_with_break_releases_listeners() {
    let emitter = Arc::new(LocalEmitter::<u32, String>::new());
    let mut events = from_emitter(Arc::clone(&emitter), "tick");

    let producer = Arc::clone(&emitter);
    let handle = tokio::spawn(async move {
        for i in 0..5u32 {
            tokio::time::sleep(Duration::from_millis(5)).await;
            producer.emit("tick", &[i]);
        }
    });

    let mut seen = Vec::new();
    while let Some(item) = events.next().await {
        let args = item.unwrap();
        seen.push(args[0]);
        if seen.len() == 3 {
            break;
        }
    }
    drop(events);
    handle.await.unwrap();

    assert_eq!(seen, vec![0, 1, 2]);
    assert_eq!(emitter.listener_count("tick"), 0);
    assert_eq!(emitter.listener_count("error"), 0);
}

#[derive(Debug, PartialEq)]
enum AppError {
    Source(String),
    TooLarge(u32),
}

impl From<String> for AppError {
    fn from(err: String) -> Self {
        AppError::Source(err)
    }
}

#[tokio::test]
async fn test_consume_terminates_when_consumer_fails() {
    let emitter = Arc::new(LocalEmitter::<u32, String>::new());
    let events = from_emitter(Arc::clone(&emitter), "n");

    for n in [1, 2, 50, 3] {
        emitter.emit("n", &[n]);
    }

    let mut total = 0;
    let result = events
        .consume(|args| {
            if args[0] > 10 {
                return Err(AppError::TooLarge(args[0]));
            }
            total += args[0];
            Ok(())
        })
        .await;

    assert_eq!(result, Err(AppError::TooLarge(50)));
    assert_eq!(total, 3);
    assert_eq!(emitter.listener_count("n"), 0);
    assert_eq!(emitter.listener_count("error"), 0);
}

#[tokio::test]
async fn test_consume_converts_source_error() {
    let emitter = Arc::new(LocalEmitter::<u32, String>::new());
    let events = from_emitter(Arc::clone(&emitter), "n");

    emitter.emit_error("error", &"offline".to_string()).unwrap();

    let result = events.consume(|_| Ok::<(), AppError>(())).await;
    assert_eq!(result, Err(AppError::Source("offline".to_string())));
}

#[tokio::test]
async fn test_consume_returns_ok_after_termination() {
    let emitter = Arc::new(LocalEmitter::<u32, String>::new());
    let events = from_emitter(Arc::clone(&emitter), "n");
    emitter.emit("n", &[1]);

    let _ = events.terminate();
    let result = events.consume(|_| Ok::<(), AppError>(())).await;
    assert_eq!(result, Ok(()));
}

#[tokio::test]
async fn test_custom_error_channel() {
    let emitter = Arc::new(LocalEmitter::<u32, String>::new());
    let config = AdapterConfig::new().with_error_channel("failure");
    let events = adapt_with_config(EmitterSource::new(Arc::clone(&emitter)), "n", config).unwrap();

    assert_eq!(emitter.listener_count("failure"), 1);
    assert_eq!(emitter.listener_count("error"), 0);

    emitter.emit_error("failure", &"fatal".to_string()).unwrap();
    assert_eq!(events.advance().await, Err("fatal".to_string()));
    assert_eq!(emitter.listener_count("failure"), 0);
}

#[tokio::test]
async fn test_stats_track_delivery() {
    let emitter = Arc::new(LocalEmitter::<u32, String>::new());
    let events = from_emitter(Arc::clone(&emitter), "n");

    emitter.emit("n", &[1]);
    emitter.emit("n", &[2]);
    emitter.emit("n", &[3]);
    let _ = events.advance().await;
    let _ = events.terminate();

    let stats = events.stats();
    assert_eq!(stats.payloads_received, 3);
    assert_eq!(stats.payloads_delivered, 1);
    assert_eq!(stats.payloads_discarded, 2);
}
