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

//! Keyboard-to-BLE teleoperation bridge.
//!
//! An input watcher keeps the current command up to date from key
//! transitions; the command pump writes it to the peripheral every 10 ms.

pub mod bluetooth;
pub mod command;
pub mod config;
pub mod error;
pub mod input;
pub mod logging;
pub mod pump;

pub use command::{Command, CommandSlot};
pub use error::{BridgeError, Result};
pub use pump::{CommandPump, CommandSink, SEND_INTERVAL};
