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

//! Error types for the bridge.

use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised while setting up or running the bridge.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// No usable Bluetooth adapter on this host.
    #[error("no Bluetooth adapter available: {0}")]
    NoAdapter(#[source] bluer::Error),

    /// Discovery ended without seeing the configured peripheral.
    #[error("peripheral '{target}' not found within {timeout:?}")]
    PeripheralNotFound { target: String, timeout: Duration },

    /// The peripheral was found but the link could not be established.
    #[error("failed to connect to {address}: {source}")]
    Connect {
        address: bluer::Address,
        #[source]
        source: bluer::Error,
    },

    #[error("service {0} not exposed by peripheral")]
    ServiceNotFound(Uuid),

    #[error("characteristic {0} not exposed by peripheral")]
    CharacteristicNotFound(Uuid),

    /// Any other BlueZ failure during setup.
    #[error("Bluetooth error: {0}")]
    Bluetooth(#[from] bluer::Error),

    /// A command write failed after the session was established.
    #[error("command write failed: {0}")]
    Transmit(String),

    /// The keyboard listener could not be started or died.
    #[error("input listener failed: {0}")]
    Input(String),

    #[error("terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}

impl BridgeError {
    /// True for failures that happen before the session is up.
    pub fn is_connect_failure(&self) -> bool {
        matches!(
            self,
            BridgeError::NoAdapter(_)
                | BridgeError::PeripheralNotFound { .. }
                | BridgeError::Connect { .. }
                | BridgeError::ServiceNotFound(_)
                | BridgeError::CharacteristicNotFound(_)
                | BridgeError::Bluetooth(_)
        )
    }

    /// True for failures of an established session.
    pub fn is_session_failure(&self) -> bool {
        matches!(self, BridgeError::Transmit(_))
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_classes_are_disjoint() {
        let not_found = BridgeError::PeripheralNotFound {
            target: "Ameen ESP32".to_string(),
            timeout: Duration::from_secs(15),
        };
        assert!(not_found.is_connect_failure());
        assert!(!not_found.is_session_failure());

        let transmit = BridgeError::Transmit("link dropped".to_string());
        assert!(transmit.is_session_failure());
        assert!(!transmit.is_connect_failure());

        let input = BridgeError::Input("no display".to_string());
        assert!(!input.is_connect_failure());
        assert!(!input.is_session_failure());
    }

    #[test]
    fn test_messages() {
        let err = BridgeError::CharacteristicNotFound(Uuid::nil());
        assert_eq!(
            err.to_string(),
            "characteristic 00000000-0000-0000-0000-000000000000 not exposed by peripheral"
        );
    }
}
