//! Basic usage example
//!
//! A background task pushes sensor readings through an emitter-style source
//! while the main task pulls them one at a time:
//! 1. Adapt the "reading" channel before anything fires
//! 2. Pull readings as a `Stream`, including ones that arrived early
//! 3. Stop on the first error fired on the "error" channel
//!
//! Run with `EVENT_ITER_LOG_MODE=debug` to see the adapter's own tracing.

use std::sync::Arc;
use std::time::Duration;

use event_iter::logging::init_logging_from_env;
use event_iter::{from_emitter, AdapterState, LocalEmitter};
use futures::StreamExt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging_from_env()?;

    println!("event-iter - Basic Usage Example");
    println!("================================");

    let sensor = Arc::new(LocalEmitter::<f64, String>::new());
    let mut readings = from_emitter(Arc::clone(&sensor), "reading");

    // Two readings arrive before anyone asks for them
    sensor.emit("reading", &[20.5, 0.4]);
    sensor.emit("reading", &[20.7, 0.4]);
    println!("Buffered before first pull: {}", readings.buffered_len());

    let producer = Arc::clone(&sensor);
    let handle = tokio::spawn(async move {
        for step in 0..3 {
            tokio::time::sleep(Duration::from_millis(50)).await;
            producer.emit("reading", &[21.0 + step as f64 * 0.25, 0.5]);
            // Unrelated traffic on another channel is never seen by the adapter
            producer.emit("calibration", &[1.0]);
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
        let _ = producer.emit_error("error", &"sensor disconnected".to_string());
    });

    let mut count = 0;
    while let Some(item) = readings.next().await {
        match item {
            Ok(args) => {
                count += 1;
                println!("Reading #{count}: {:.2}C (±{:.1})", args[0], args[1]);
            }
            Err(err) => {
                println!("Source failed: {err}");
            }
        }
    }

    handle.await?;

    println!();
    println!("State: {:?}", readings.state());
    println!("Stats: {}", readings.stats());
    println!(
        "Listeners left on source: reading={} error={}",
        sensor.listener_count("reading"),
        sensor.listener_count("error")
    );
    assert_eq!(readings.state(), AdapterState::Errored);

    Ok(())
}
