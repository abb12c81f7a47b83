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

//! Terminal key events and raw-mode handling using crossterm.

use crossterm::event::{
    self, Event, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use crossterm::terminal;
use crossterm::tty::IsTty;
use std::io;
use std::thread;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::keys::Key;
use super::source::InputSource;
use super::watcher::InputEvent;
use crate::error::{BridgeError, Result};

/// Keyboard source reading key events from the controlling terminal.
pub struct TerminalSource;

impl TerminalSource {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TerminalSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a terminal key event to an input event.
fn translate(key_event: KeyEvent) -> InputEvent {
    let key = Key::from_crossterm(key_event.code);
    match key_event.kind {
        KeyEventKind::Press
            if key_event.modifiers.contains(KeyModifiers::CONTROL)
                && matches!(key, Key::Char('c') | Key::Char('C')) =>
        {
            InputEvent::Interrupt
        }
        KeyEventKind::Press | KeyEventKind::Repeat => InputEvent::Pressed(key),
        KeyEventKind::Release => InputEvent::Released(key),
    }
}

impl InputSource for TerminalSource {
    fn backend_name(&self) -> &'static str {
        "terminal (crossterm)"
    }

    fn reads_terminal(&self) -> bool {
        true
    }

    fn spawn(self: Box<Self>, events: mpsc::UnboundedSender<InputEvent>) -> Result<()> {
        thread::Builder::new()
            .name("terminal-keys".to_string())
            .spawn(move || loop {
                match event::read() {
                    Ok(Event::Key(key_event)) => {
                        if events.send(translate(key_event)).is_err() {
                            debug!("Watcher gone, terminal reader exiting");
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        error!("Terminal read error: {}", e);
                        break;
                    }
                }
            })
            .map_err(|e| BridgeError::Input(format!("failed to spawn terminal reader: {}", e)))?;

        Ok(())
    }
}

/// Whether to turn on key release reporting.
///
/// Without release events a held command never returns to neutral, so a
/// terminal that cannot report them is refused outright.
fn release_reporting(requested: bool, supported: io::Result<bool>) -> Result<bool> {
    if !requested {
        return Ok(false);
    }
    match supported {
        Ok(true) => Ok(true),
        Ok(false) => Err(BridgeError::Input(
            "terminal cannot report key releases; use a terminal with keyboard \
             enhancement support or the global backend"
                .to_string(),
        )),
        Err(e) => Err(BridgeError::Input(format!(
            "could not query key release support: {}",
            e
        ))),
    }
}

/// Read and discard every event already queued on stdin.
fn drain_pending<P, R>(mut poll: P, mut read: R) -> usize
where
    P: FnMut() -> io::Result<bool>,
    R: FnMut() -> io::Result<Event>,
{
    let mut dropped = 0;
    while let Ok(true) = poll() {
        if read().is_err() {
            break;
        }
        dropped += 1;
    }
    dropped
}

/// Raw terminal mode for the lifetime of the guard.
///
/// Echo and line buffering are off while held. Everything is restored on
/// drop, best effort.
pub struct TerminalGuard {
    raw: bool,
    enhanced: bool,
    /// Nobody reads stdin, so keystrokes pile up until exit.
    drain_input: bool,
}

impl TerminalGuard {
    /// Put the terminal into raw mode.
    ///
    /// With `report_key_releases`, also ask the terminal to report key
    /// release events, failing if it cannot. Does nothing when stdin is not
    /// a terminal.
    pub fn acquire(report_key_releases: bool) -> Result<Self> {
        if !io::stdin().is_tty() {
            debug!("stdin is not a terminal, leaving terminal mode alone");
            return Ok(Self {
                raw: false,
                enhanced: false,
                drain_input: false,
            });
        }

        terminal::enable_raw_mode()?;
        // Dropped on the error paths below, which restores the terminal
        let mut guard = Self {
            raw: true,
            enhanced: false,
            drain_input: !report_key_releases,
        };

        let supported = if report_key_releases {
            terminal::supports_keyboard_enhancement()
        } else {
            Ok(false)
        };
        if release_reporting(report_key_releases, supported)? {
            execute!(
                io::stdout(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            guard.enhanced = true;
            debug!("Key release reporting enabled");
        }

        info!("Terminal in raw mode");
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if self.drain_input {
            let dropped = drain_pending(|| event::poll(Duration::ZERO), event::read);
            if dropped > 0 {
                debug!("Discarded {} pending terminal events", dropped);
            }
        }
        if self.enhanced {
            let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
        }
        if self.raw {
            if let Err(e) = terminal::disable_raw_mode() {
                warn!("Failed to restore terminal mode: {}", e);
            } else {
                debug!("Terminal mode restored");
            }
        }
    }
}
