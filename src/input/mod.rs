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

//! Keyboard input module.
//!
//! Backends report key transitions over a channel; the watcher turns them
//! into the current command.

#[cfg(feature = "x11")]
mod global;
mod keys;
mod source;
mod terminal;
mod watcher;

#[cfg(feature = "x11")]
pub use global::GlobalSource;
pub use keys::Key;
pub use source::{create_source_with_preference, DisplayServer, InputSource};
pub use terminal::{TerminalGuard, TerminalSource};
pub use watcher::{InputEvent, InputWatcher, WatcherExit};
