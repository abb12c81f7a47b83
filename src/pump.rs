// Copyright 2026 Daniel Pelikan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Command pump: streams the current command to the peripheral.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, Instant};
use tracing::{debug, error, info};

use crate::command::{Command, CommandSlot};
use crate::error::Result;

/// Spacing between consecutive command writes.
pub const SEND_INTERVAL: Duration = Duration::from_millis(10);

/// Destination for command bytes.
pub trait CommandSink: Send + Sync {
    /// Write one command byte without waiting for an acknowledgement.
    fn write_command(&self, byte: u8) -> impl Future<Output = Result<()>> + Send;
}

/// Fixed-cadence sender of the current command.
pub struct CommandPump<S> {
    sink: S,
    slot: Arc<CommandSlot>,
}

impl<S: CommandSink> CommandPump<S> {
    pub fn new(sink: S, slot: Arc<CommandSlot>) -> Self {
        Self { sink, slot }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Send the current command every [`SEND_INTERVAL`] until a write fails.
    ///
    /// Never returns `Ok`; the first failed write ends the loop.
    pub async fn run(&self) -> Result<()> {
        info!("Command pump started ({:?} interval)", SEND_INTERVAL);
        let mut last: Option<Command> = None;
        let mut sent: u64 = 0;

        loop {
            let started = Instant::now();

            let command = self.slot.get();
            if last != Some(command) {
                debug!("Now sending '{}' (0x{:02x})", command, command.as_byte());
                last = Some(command);
            }

            if let Err(e) = self.sink.write_command(command.as_byte()).await {
                error!("Write failed after {} commands: {}", sent, e);
                return Err(e);
            }
            sent += 1;

            // Next write starts no sooner than one interval after this one did
            time::sleep_until(started + SEND_INTERVAL).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BridgeError;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        writes: Mutex<Vec<(Instant, u8)>>,
        fail_after: Option<usize>,
    }

    impl CommandSink for RecordingSink {
        fn write_command(&self, byte: u8) -> impl Future<Output = Result<()>> + Send {
            let mut writes = self.writes.lock();
            let result = match self.fail_after {
                Some(limit) if writes.len() >= limit => {
                    Err(BridgeError::Transmit("link lost".to_string()))
                }
                _ => {
                    writes.push((Instant::now(), byte));
                    Ok(())
                }
            };
            std::future::ready(result)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_sends_neutral_at_cadence() {
        let pump = CommandPump::new(RecordingSink::default(), CommandSlot::new());

        tokio::select! {
            _ = pump.run() => panic!("pump stopped"),
            _ = time::sleep(Duration::from_millis(105)) => {}
        }

        let writes = pump.sink().writes.lock();
        assert!(writes.len() >= 10, "only {} writes", writes.len());
        assert!(writes.iter().all(|(_, byte)| *byte == 110));
        for pair in writes.windows(2) {
            assert!(pair[1].0 - pair[0].0 >= SEND_INTERVAL);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_sends_latest_command() {
        let slot = CommandSlot::new();
        let pump = CommandPump::new(RecordingSink::default(), slot.clone());

        let drive = async {
            time::sleep(Duration::from_millis(25)).await;
            slot.set(Command::SelectUp);
            time::sleep(Duration::from_millis(30)).await;
        };

        tokio::select! {
            _ = pump.run() => panic!("pump stopped"),
            _ = drive => {}
        }

        let writes = pump.sink().writes.lock();
        assert_eq!(writes.first().map(|w| w.1), Some(b'n'));
        assert_eq!(writes.last().map(|w| w.1), Some(b'u'));
        assert!(writes.iter().all(|(_, byte)| *byte == b'n' || *byte == b'u'));
    }

    /// Sink whose writes alternately take 15 ms and 3 ms.
    #[derive(Default)]
    struct UnevenSink {
        starts: Mutex<Vec<Instant>>,
    }

    impl CommandSink for UnevenSink {
        fn write_command(&self, _byte: u8) -> impl Future<Output = Result<()>> + Send {
            let latency = {
                let mut starts = self.starts.lock();
                starts.push(Instant::now());
                if starts.len() % 2 == 1 {
                    Duration::from_millis(15)
                } else {
                    Duration::from_millis(3)
                }
            };
            async move {
                time::sleep(latency).await;
                Ok(())
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_uneven_write_latency_keeps_spacing() {
        let pump = CommandPump::new(UnevenSink::default(), CommandSlot::new());

        tokio::select! {
            _ = pump.run() => panic!("pump stopped"),
            _ = time::sleep(Duration::from_millis(300)) => {}
        }

        let starts = pump.sink().starts.lock();
        assert!(starts.len() >= 10, "only {} writes", starts.len());
        let min_gap = starts
            .windows(2)
            .map(|pair| pair[1] - pair[0])
            .min()
            .unwrap();
        assert!(min_gap >= SEND_INTERVAL, "writes only {:?} apart", min_gap);
    }

    #[tokio::test(start_paused = true)]
    async fn test_write_failure_ends_loop() {
        let sink = RecordingSink {
            fail_after: Some(3),
            ..Default::default()
        };
        let pump = CommandPump::new(sink, CommandSlot::new());

        let err = pump.run().await.unwrap_err();
        assert!(err.is_session_failure());
        assert_eq!(pump.sink().writes.lock().len(), 3);
    }
}
