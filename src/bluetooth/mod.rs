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

//! Bluetooth communication module.
//!
//! Handles the BLE GATT client link to the controlled peripheral.

mod ble_constants;
mod link;

pub use ble_constants::{COMMAND_CHAR_UUID, DEFAULT_PERIPHERAL_NAME, SERVICE_UUID};
pub use link::{PeripheralLink, PeripheralTarget};
