//! Target-style source example
//!
//! Shows the synchronous side of the adapter: a thread dispatches click events
//! on a target-style source while the main thread walks them with a plain
//! `for` loop, then breaks out early. Breaking drops the adapter, which
//! removes its listeners from the target.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use event_iter::logging::{init_logging, LoggingMode};
use event_iter::{from_target, LocalEventTarget};

#[derive(Debug, Clone)]
struct Click {
    x: i32,
    y: i32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(LoggingMode::Development)?;

    println!("event-iter - Event Target Example");
    println!("=================================");

    let button = Arc::new(LocalEventTarget::<Click>::new());
    let clicks = from_target(Arc::clone(&button), "click");

    let dispatcher = Arc::clone(&button);
    let handle = thread::spawn(move || {
        for i in 0..10 {
            thread::sleep(Duration::from_millis(20));
            let notified = dispatcher.dispatch_event("click", &Click { x: i * 10, y: i * 5 });
            if notified == 0 {
                println!("  (click {i} had no listener)");
            }
        }
    });

    for item in clicks {
        let event = match item {
            Ok(mut args) => args.remove(0),
            Err(err) => {
                println!("Target reported an error: {err:?}");
                break;
            }
        };

        println!("Click at ({}, {})", event.x, event.y);
        if event.x >= 30 {
            println!("Seen enough clicks, stopping");
            break;
        }
    }

    println!(
        "Listeners left on target: click={} error={}",
        button.listener_count("click"),
        button.listener_count("error")
    );

    handle
        .join()
        .map_err(|_| "dispatcher thread panicked")?;

    Ok(())
}
