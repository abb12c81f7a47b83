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

//! Input watcher: turns key transitions into the current command.

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::keys::Key;
use crate::command::{Command, CommandSlot};

/// Events delivered by an input backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// A key went down (auto-repeat is reported as another press).
    Pressed(Key),
    /// A key went up.
    Released(Key),
    /// The user asked to quit (Ctrl+C while the terminal is in raw mode).
    Interrupt,
}

/// Why the watcher stopped consuming events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherExit {
    Interrupted,
    /// Every backend sender was dropped.
    SourceClosed,
}

/// Single consumer of input events; the only writer of the command slot.
pub struct InputWatcher {
    slot: Arc<CommandSlot>,
}

impl InputWatcher {
    pub fn new(slot: Arc<CommandSlot>) -> Self {
        Self { slot }
    }

    /// Apply one event to the slot.
    ///
    /// Returns the command now in the slot.
    pub fn apply(&self, event: InputEvent) -> Command {
        match event {
            InputEvent::Pressed(key) => {
                if let Some(command) = Command::from_key(&key) {
                    let previous = self.slot.set(command);
                    if previous != command {
                        debug!("{:?} pressed: {} -> {}", key, previous, command);
                    }
                }
            }
            InputEvent::Released(key) => {
                // Any release clears the command, even if another mapped key
                // is still held.
                let previous = self.slot.set(Command::Neutral);
                if previous != Command::Neutral {
                    debug!("{:?} released: {} -> n", key, previous);
                }
            }
            InputEvent::Interrupt => {}
        }
        self.slot.get()
    }

    /// Consume events until interrupted or the backend goes away.
    pub async fn run(self, mut events: mpsc::UnboundedReceiver<InputEvent>) -> WatcherExit {
        while let Some(event) = events.recv().await {
            if event == InputEvent::Interrupt {
                info!("Interrupt key received");
                return WatcherExit::Interrupted;
            }
            self.apply(event);
        }
        debug!("Input source closed");
        WatcherExit::SourceClosed
    }
}
