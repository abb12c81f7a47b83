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

//! Keybridge: stream held-key commands to a BLE peripheral.

use anyhow::{anyhow, Result};
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tracing::{info, warn};

use keybridge::bluetooth::{PeripheralLink, PeripheralTarget};
use keybridge::config::Config;
use keybridge::input::{self, InputWatcher, TerminalGuard, WatcherExit};
use keybridge::{logging, BridgeError, CommandPump, CommandSlot};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    info!("Starting keybridge v{}...", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = Config::load()?;
    info!("Configuration loaded");

    let target = PeripheralTarget {
        address: config.peripheral.address()?,
        name: config.peripheral.name.clone(),
        scan_timeout: config.peripheral.scan_timeout(),
    };

    // Initialize keyboard source
    let source = input::create_source_with_preference(&config.input.backend)?;
    info!("Input backend: {}", source.backend_name());

    // Restored when main returns, on every path
    let _terminal = TerminalGuard::acquire(source.reads_terminal())?;

    let slot = CommandSlot::new();
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    source.spawn(event_tx)?;
    let mut watcher = tokio::spawn(InputWatcher::new(slot.clone()).run(event_rx));

    // Connect, unless the user gives up first
    let link = tokio::select! {
        link = PeripheralLink::connect(&target) => {
            link.map_err(link_error)?
        }
        exit = &mut watcher => {
            return watcher_result(exit);
        }
        _ = shutdown_signal() => {
            info!("Stopped before connecting");
            return Ok(());
        }
    };

    info!("Ready. Hold W/S, Up/Down or Enter to drive; Ctrl+C to quit.");

    let pump = CommandPump::new(link, slot);
    let outcome = tokio::select! {
        result = pump.run() => result.map_err(link_error),
        exit = &mut watcher => watcher_result(exit),
        _ = shutdown_signal() => Ok(()),
    };

    pump.sink().disconnect().await;

    info!("keybridge stopped");
    outcome
}

/// Attach the phase a Bluetooth failure happened in.
fn link_error(err: BridgeError) -> anyhow::Error {
    let phase = if err.is_connect_failure() {
        "failed to connect to peripheral"
    } else if err.is_session_failure() {
        "session with peripheral failed"
    } else {
        "bridge failed"
    };
    anyhow::Error::new(err).context(phase)
}

fn watcher_result(exit: std::result::Result<WatcherExit, tokio::task::JoinError>) -> Result<()> {
    match exit {
        Ok(WatcherExit::Interrupted) => Ok(()),
        Ok(WatcherExit::SourceClosed) => Err(anyhow!("keyboard listener stopped")),
        Err(e) => Err(anyhow!("input watcher task failed: {}", e)),
    }
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(e) => {
            warn!("Cannot listen for SIGTERM: {}", e);
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = terminate.recv() => {}
    }
    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_link_error_names_the_phase() {
        let err = link_error(BridgeError::PeripheralNotFound {
            target: "Ameen ESP32".to_string(),
            timeout: Duration::from_secs(15),
        });
        assert_eq!(err.to_string(), "failed to connect to peripheral");
        assert!(format!("{:#}", err).contains("'Ameen ESP32' not found"));

        let err = link_error(BridgeError::Transmit("link dropped".to_string()));
        assert_eq!(err.to_string(), "session with peripheral failed");
        assert!(err.downcast_ref::<BridgeError>().is_some());
    }

    #[test]
    fn test_watcher_exit() {
        assert!(watcher_result(Ok(WatcherExit::Interrupted)).is_ok());
        let err = watcher_result(Ok(WatcherExit::SourceClosed)).unwrap_err();
        assert_eq!(err.to_string(), "keyboard listener stopped");
    }
}
