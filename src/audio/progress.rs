use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, trace};

use crate::audio::controller::{SharedTransport, Transport};
use crate::audio::engine::EngineProbe;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressUpdate {
    pub position: Duration,
    /// 0-100.
    pub percent: f32,
}

/// Every event carries the transport generation it was sampled under, so
/// the controller can tell it apart from one sampled before a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Tick {
        generation: u64,
        update: ProgressUpdate,
    },
    /// The controller thinks it is playing but the engine has run dry.
    Finished { generation: u64 },
}

impl ProgressEvent {
    pub fn generation(&self) -> u64 {
        match self {
            Self::Tick { generation, .. } | Self::Finished { generation } => *generation,
        }
    }
}

/// Background sampler of the playback position. Reads the transport the
/// controller publishes and the engine probe, and sends what it sees down a
/// channel that the UI drains every frame.
pub struct ProgressPoller {
    transport: SharedTransport,
    probe: Arc<dyn EngineProbe>,
    interval: Duration,
    events: Sender<ProgressEvent>,
}

impl ProgressPoller {
    /// Start the sampling thread. `notify` runs after every event sent, so
    /// the UI can schedule a repaint. The thread exits once the receiver is
    /// dropped.
    pub fn spawn<F>(
        transport: SharedTransport,
        probe: Arc<dyn EngineProbe>,
        interval: Duration,
        notify: F,
    ) -> (JoinHandle<()>, Receiver<ProgressEvent>)
    where
        F: Fn() + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let poller = Self {
            transport,
            probe,
            interval,
            events: tx,
        };

        let handle = thread::spawn(move || poller.run(notify));
        (handle, rx)
    }

    fn run(self, notify: impl Fn()) {
        loop {
            thread::sleep(self.interval);

            let Ok(transport) = self.transport.lock().map(|t| *t) else {
                debug!("transport lock poisoned, skipping cycle");
                continue;
            };

            let Some(event) = sample(&transport, self.probe.as_ref()) else {
                continue;
            };

            trace!(?event, "progress");
            if self.events.send(event).is_err() {
                break;
            }
            notify();
        }
    }
}

/// One sampling cycle. `None` means nothing should be published.
pub fn sample(transport: &Transport, probe: &dyn EngineProbe) -> Option<ProgressEvent> {
    if !transport.playing {
        return None;
    }

    let status = probe.status()?;
    if !status.busy {
        return Some(ProgressEvent::Finished {
            generation: transport.generation,
        });
    }

    let total = transport.duration.as_secs_f32();
    if total <= 0.0 {
        return None;
    }

    let percent = (status.elapsed.as_secs_f32() / total * 100.0).clamp(0.0, 100.0);
    Some(ProgressEvent::Tick {
        generation: transport.generation,
        update: ProgressUpdate {
            position: status.elapsed,
            percent,
        },
    })
}
