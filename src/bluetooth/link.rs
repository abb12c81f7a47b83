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

//! BLE link to the controlled peripheral.

use bluer::gatt::remote::{Characteristic, CharacteristicWriteRequest};
use bluer::gatt::WriteOp;
use bluer::{Adapter, AdapterEvent, Address, Device};
use futures::{pin_mut, StreamExt};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info, warn};

use super::ble_constants::{COMMAND_CHAR_UUID, SERVICE_UUID};
use crate::error::{BridgeError, Result};
use crate::pump::CommandSink;

/// How long to wait for GATT services after connecting.
const SERVICES_RESOLVE_TIMEOUT: Duration = Duration::from_secs(10);

/// Poll interval while waiting for services.
const SERVICES_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Which peripheral to look for.
#[derive(Debug, Clone)]
pub struct PeripheralTarget {
    /// Exact address; when set the name is ignored.
    pub address: Option<Address>,
    /// Advertised name.
    pub name: String,
    /// Discovery deadline.
    pub scan_timeout: Duration,
}

impl PeripheralTarget {
    /// Whether a discovered device is the one we want.
    pub fn matches(&self, address: Address, name: Option<&str>) -> bool {
        match self.address {
            Some(wanted) => wanted == address,
            None => name == Some(self.name.as_str()),
        }
    }
}

impl fmt::Display for PeripheralTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.address {
            Some(address) => write!(f, "{}", address),
            None => write!(f, "{}", self.name),
        }
    }
}

/// An open session with the peripheral's command characteristic.
pub struct PeripheralLink {
    _session: bluer::Session,
    device: Device,
    command_char: Characteristic,
}

impl PeripheralLink {
    /// Find, connect to and resolve the command characteristic of `target`.
    pub async fn connect(target: &PeripheralTarget) -> Result<Self> {
        info!("Initializing BLE client...");

        // Create BlueZ session
        let session = bluer::Session::new().await?;
        debug!("BlueZ session created");

        // Get the default adapter
        let adapter = session
            .default_adapter()
            .await
            .map_err(BridgeError::NoAdapter)?;
        info!("Using Bluetooth adapter: {}", adapter.name());

        // Ensure adapter is powered on
        if !adapter.is_powered().await? {
            info!("Powering on Bluetooth adapter...");
            adapter.set_powered(true).await?;
        }

        let device = Self::discover(&adapter, target).await?;
        let address = device.address();

        if device.is_connected().await? {
            info!("Already connected to {}", address);
        } else {
            info!("Connecting to {}...", address);
            device
                .connect()
                .await
                .map_err(|source| BridgeError::Connect { address, source })?;
        }
        info!("Connected to {}", address);

        Self::wait_for_services(&device).await?;
        let command_char = Self::find_command_characteristic(&device).await?;

        Ok(Self {
            _session: session,
            device,
            command_char,
        })
    }

    /// Scan until the target shows up or the scan timeout passes.
    async fn discover(adapter: &Adapter, target: &PeripheralTarget) -> Result<Device> {
        info!(
            "Scanning for '{}' (timeout {:?})...",
            target, target.scan_timeout
        );

        // Discovery stops when the event stream is dropped
        match timeout(target.scan_timeout, Self::scan(adapter, target)).await {
            Ok(Ok(Some(device))) => Ok(device),
            Ok(Err(e)) => Err(e),
            Ok(Ok(None)) | Err(_) => Err(BridgeError::PeripheralNotFound {
                target: target.to_string(),
                timeout: target.scan_timeout,
            }),
        }
    }

    async fn scan(adapter: &Adapter, target: &PeripheralTarget) -> Result<Option<Device>> {
        let events = adapter.discover_devices_with_changes().await?;
        pin_mut!(events);

        while let Some(event) = events.next().await {
            let AdapterEvent::DeviceAdded(address) = event else {
                continue;
            };

            let device = adapter.device(address)?;
            let name = device.name().await.ok().flatten();
            if target.matches(address, name.as_deref()) {
                info!(
                    "Found peripheral {} ({})",
                    address,
                    name.as_deref().unwrap_or("unnamed")
                );
                return Ok(Some(device));
            }
        }

        Ok(None)
    }

    async fn wait_for_services(device: &Device) -> Result<()> {
        let deadline = Instant::now() + SERVICES_RESOLVE_TIMEOUT;
        while !device.is_services_resolved().await? {
            if Instant::now() >= deadline {
                warn!("Services not resolved after {:?}, trying anyway", SERVICES_RESOLVE_TIMEOUT);
                return Ok(());
            }
            sleep(SERVICES_POLL_INTERVAL).await;
        }
        debug!("GATT services resolved");
        Ok(())
    }

    async fn find_command_characteristic(device: &Device) -> Result<Characteristic> {
        for service in device.services().await? {
            if service.uuid().await? != SERVICE_UUID {
                continue;
            }
            debug!("Found service {}", SERVICE_UUID);

            for characteristic in service.characteristics().await? {
                if characteristic.uuid().await? != COMMAND_CHAR_UUID {
                    continue;
                }

                let flags = characteristic.flags().await?;
                if !flags.write_without_response {
                    warn!(
                        "Characteristic {} does not advertise write-without-response",
                        COMMAND_CHAR_UUID
                    );
                }
                info!("Command characteristic ready: {}", COMMAND_CHAR_UUID);
                return Ok(characteristic);
            }

            return Err(BridgeError::CharacteristicNotFound(COMMAND_CHAR_UUID));
        }

        Err(BridgeError::ServiceNotFound(SERVICE_UUID))
    }

    /// Address of the connected peripheral.
    pub fn address(&self) -> Address {
        self.device.address()
    }

    /// Disconnect from the peripheral, best effort.
    pub async fn disconnect(&self) {
        match self.device.disconnect().await {
            Ok(()) => info!("Disconnected from {}", self.address()),
            Err(e) => warn!("Disconnect from {} failed: {}", self.address(), e),
        }
    }
}

impl CommandSink for PeripheralLink {
    fn write_command(&self, byte: u8) -> impl Future<Output = Result<()>> + Send {
        async move {
            let request = CharacteristicWriteRequest {
                op_type: WriteOp::Command,
                ..Default::default()
            };
            self.command_char
                .write_ext(&[byte], &request)
                .await
                .map_err(|e| BridgeError::Transmit(e.to_string()))
        }
    }
}
