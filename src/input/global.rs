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

//! Global keyboard hook using rdev (X11).

use rdev::{EventType, Key as RKey};
use std::thread;
use tokio::sync::mpsc;
use tracing::{debug, error, info, trace};

use super::keys::Key;
use super::source::InputSource;
use super::watcher::InputEvent;
use crate::error::{BridgeError, Result};

/// Keyboard source fed by the OS input layer rather than the terminal.
///
/// Sees key presses and releases no matter which window has focus.
pub struct GlobalSource;

impl GlobalSource {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GlobalSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Tracks Ctrl so Ctrl+C can still stop the bridge while the terminal is raw.
#[derive(Debug, Default)]
struct HookState {
    ctrl_held: bool,
}

impl HookState {
    fn translate(&mut self, event_type: EventType) -> Option<InputEvent> {
        match event_type {
            EventType::KeyPress(key) => {
                if matches!(key, RKey::ControlLeft | RKey::ControlRight) {
                    self.ctrl_held = true;
                }
                if self.ctrl_held && key == RKey::KeyC {
                    return Some(InputEvent::Interrupt);
                }
                Some(InputEvent::Pressed(Key::from_rdev(key)))
            }
            EventType::KeyRelease(key) => {
                if matches!(key, RKey::ControlLeft | RKey::ControlRight) {
                    self.ctrl_held = false;
                }
                Some(InputEvent::Released(Key::from_rdev(key)))
            }
            _ => None,
        }
    }
}

impl InputSource for GlobalSource {
    fn backend_name(&self) -> &'static str {
        "global (rdev)"
    }

    fn reads_terminal(&self) -> bool {
        false
    }

    fn spawn(self: Box<Self>, events: mpsc::UnboundedSender<InputEvent>) -> Result<()> {
        thread::Builder::new()
            .name("keyboard-hook".to_string())
            .spawn(move || {
                info!("Global keyboard hook started");
                let mut state = HookState::default();
                let tx = events.clone();
                let result = rdev::listen(move |event| {
                    if let Some(input) = state.translate(event.event_type) {
                        trace!("Hook event: {:?}", input);
                        let _ = tx.send(input);
                    }
                });
                // listen() only returns on failure
                if let Err(e) = result {
                    error!("Global keyboard hook failed: {:?}", e);
                }
                debug!("Global keyboard hook thread exiting");
                drop(events);
            })
            .map_err(|e| BridgeError::Input(format!("failed to spawn hook thread: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_and_release() {
        let mut state = HookState::default();
        assert_eq!(
            state.translate(EventType::KeyPress(RKey::KeyW)),
            Some(InputEvent::Pressed(Key::Char('w')))
        );
        assert_eq!(
            state.translate(EventType::KeyRelease(RKey::UpArrow)),
            Some(InputEvent::Released(Key::Up))
        );
        assert_eq!(state.translate(EventType::MouseMove { x: 1.0, y: 2.0 }), None);
    }

    #[test]
    fn test_ctrl_c_interrupts() {
        let mut state = HookState::default();
        state.translate(EventType::KeyPress(RKey::ControlLeft));
        assert_eq!(
            state.translate(EventType::KeyPress(RKey::KeyC)),
            Some(InputEvent::Interrupt)
        );

        state.translate(EventType::KeyRelease(RKey::ControlLeft));
        assert_eq!(
            state.translate(EventType::KeyPress(RKey::KeyC)),
            Some(InputEvent::Pressed(Key::Char('c')))
        );
    }
}
