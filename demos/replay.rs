//! # Replay Example
//!
//! Shows a settings pipe with one inline reader and one queued reader:
//! - the late reader gets the last value replayed,
//! - dropping the pipe releases both subscriptions.
//!
//! ## Run
//! ```bash
//! RUST_LOG=pipecast=debug cargo run --example replay
//! ```

use pipecast::{Bus, Dispatch, DispatchQueue, Pipe};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Debug)]
struct Settings {
    volume: u8,
    muted: bool,
}

fn show(tag: &str, s: Option<Settings>) {
    match s {
        Some(s) => println!("[{tag}] volume={} muted={}", s.volume, s.muted),
        None => println!("[{tag}] <cleared>"),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let pipe: Pipe<Settings> = Pipe::new();
    let topic = pipe.topic().clone();

    let inline = pipe
        .source()
        .read(Dispatch::Inline, false, |s| show("inline", s))
        .ok_or("pipe invalidated")?;

    pipe.sink().write(Some(Settings {
        volume: 7,
        muted: false,
    }));

    let queue = DispatchQueue::spawn("ui");
    let _queued = pipe
        .source()
        .read(Dispatch::Queue(queue.clone()), true, |s| show("queued", s))
        .ok_or("pipe invalidated")?;

    pipe.sink().write(Some(Settings {
        volume: 0,
        muted: true,
    }));
    queue.flush().await;

    inline.cancel();
    pipe.sink().write(None);
    queue.flush().await;

    println!("subscribers before drop: {}", Bus::global().subscriber_count(&topic));
    let sink = pipe.sink().clone();
    drop(pipe);
    println!("subscribers after drop:  {}", Bus::global().subscriber_count(&topic));
    println!("write after drop accepted: {}", sink.write(None));

    queue.close();
    Ok(())
}
