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

//! Keyboard source abstraction and factory.

use std::env;
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::terminal::TerminalSource;
use super::watcher::InputEvent;
use crate::error::Result;

#[cfg(feature = "x11")]
use super::global::GlobalSource;

/// Trait for keyboard event backends.
///
/// A backend runs on its own OS thread for the life of the process and
/// pushes every key transition into the channel.
pub trait InputSource: Send {
    /// Get the backend name (e.g., "global (rdev)").
    fn backend_name(&self) -> &'static str;

    /// Whether key events are read from the controlling terminal.
    ///
    /// Such backends need the terminal to report key releases.
    fn reads_terminal(&self) -> bool;

    /// Start the listener thread.
    fn spawn(self: Box<Self>, events: mpsc::UnboundedSender<InputEvent>) -> Result<()>;
}

/// Detected display server type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayServer {
    X11,
    Wayland,
    Unknown,
}

impl DisplayServer {
    /// Detect the current display server.
    pub fn detect() -> Self {
        Self::from_vars(
            env::var("XDG_SESSION_TYPE").ok().as_deref(),
            env::var_os("WAYLAND_DISPLAY").is_some(),
            env::var_os("DISPLAY").is_some(),
        )
    }

    fn from_vars(session_type: Option<&str>, wayland_display: bool, x_display: bool) -> Self {
        if let Some(session_type) = session_type {
            match session_type.to_lowercase().as_str() {
                "x11" => return DisplayServer::X11,
                "wayland" => return DisplayServer::Wayland,
                _ => {}
            }
        }

        if wayland_display {
            return DisplayServer::Wayland;
        }

        if x_display {
            return DisplayServer::X11;
        }

        DisplayServer::Unknown
    }
}

/// Create input source with a preference.
///
/// - "auto": global hook on X11, terminal events otherwise
/// - "global": force the global hook
/// - "terminal": force terminal key events
pub fn create_source_with_preference(preference: &str) -> Result<Box<dyn InputSource>> {
    let use_global = match preference.to_lowercase().as_str() {
        "global" => true,
        "terminal" => false,
        "auto" => {
            let display_server = DisplayServer::detect();
            info!("Display server: {:?}", display_server);
            display_server == DisplayServer::X11 && cfg!(feature = "x11")
        }
        other => {
            warn!("Unknown input backend '{}', using auto", other);
            return create_source_with_preference("auto");
        }
    };

    if use_global {
        #[cfg(feature = "x11")]
        {
            info!("Using global keyboard hook");
            Ok(Box::new(GlobalSource::new()))
        }
        #[cfg(not(feature = "x11"))]
        {
            Err(crate::error::BridgeError::Input(
                "global keyboard hook not compiled in".to_string(),
            ))
        }
    } else {
        info!("Using terminal key events");
        Ok(Box::new(TerminalSource::new()))
    }
}
