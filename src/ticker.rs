use anyhow::{bail, Context, Result};
use crossbeam_channel::{select, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickEvent {
    Tick { sequence: u64 },
}

/// Handle to the background tick thread. Stopping or dropping it ends the
/// thread and joins it.
#[derive(Debug)]
pub struct Ticker {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    pub fn stop(self) {
        // Drop does the work
    }

    fn shutdown(&mut self) {
        // Disconnecting the stop channel wakes the select below
        self.stop.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Emit a `TickEvent` on `sender` every `interval` until stopped or until the
/// receiving side goes away.
pub fn spawn_ticker(interval: Duration, sender: Sender<TickEvent>) -> Result<Ticker> {
    if interval.is_zero() {
        bail!("Tick interval must be greater than zero");
    }

    let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(0);

    let handle = thread::Builder::new()
        .name("clock-ticker".to_string())
        .spawn(move || {
            info!("Clock ticker started with interval {:?}", interval);
            let ticks = crossbeam_channel::tick(interval);
            let mut sequence = 0u64;

            loop {
                select! {
                    recv(ticks) -> _ => {
                        sequence += 1;
                        if sender.send(TickEvent::Tick { sequence }).is_err() {
                            debug!("Tick receiver dropped, stopping ticker");
                            break;
                        }
                    }
                    recv(stop_rx) -> _ => break,
                }
            }

            info!("Clock ticker stopped after {} ticks", sequence);
        })
        .context("Failed to spawn clock ticker thread")?;

    Ok(Ticker {
        stop: Some(stop_tx),
        handle: Some(handle),
    })
}
