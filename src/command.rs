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

//! Command alphabet and the shared current-command slot.
//!
//! Every message on the wire is a single ASCII byte from the alphabet below.

use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

use crate::input::Key;

/// A control intent sent to the peripheral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Command {
    Forward,
    Backward,
    SelectUp,
    SelectDown,
    Confirm,
    #[default]
    Neutral,
}

impl Command {
    /// Single-character wire code.
    pub const fn code(self) -> char {
        match self {
            Command::Forward => 'w',
            Command::Backward => 's',
            Command::SelectUp => 'u',
            Command::SelectDown => 'd',
            Command::Confirm => 'e',
            Command::Neutral => 'n',
        }
    }

    /// The byte written to the peripheral (ASCII ordinal of the code).
    pub const fn as_byte(self) -> u8 {
        self.code() as u8
    }

    /// Command bound to a pressed key, if any.
    pub fn from_key(key: &Key) -> Option<Self> {
        match key {
            Key::Char('w') => Some(Command::Forward),
            Key::Char('s') => Some(Command::Backward),
            Key::Up => Some(Command::SelectUp),
            Key::Down => Some(Command::SelectDown),
            Key::Enter => Some(Command::Confirm),
            _ => None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Latest-value-wins holder for the current command.
///
/// Written only by the input watcher, read by the command pump.
#[derive(Debug, Default)]
pub struct CommandSlot {
    current: RwLock<Command>,
}

impl CommandSlot {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn get(&self) -> Command {
        *self.current.read()
    }

    /// Store a command, returning the one it replaced.
    pub fn set(&self, command: Command) -> Command {
        std::mem::replace(&mut *self.current.write(), command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_bytes() {
        assert_eq!(Command::Forward.as_byte(), 119);
        assert_eq!(Command::Backward.as_byte(), 115);
        assert_eq!(Command::SelectUp.as_byte(), 117);
        assert_eq!(Command::SelectDown.as_byte(), 100);
        assert_eq!(Command::Confirm.as_byte(), 101);
        assert_eq!(Command::Neutral.as_byte(), 110);
    }

    #[test]
    fn test_key_map() {
        assert_eq!(Command::from_key(&Key::Char('w')), Some(Command::Forward));
        assert_eq!(Command::from_key(&Key::Char('s')), Some(Command::Backward));
        assert_eq!(Command::from_key(&Key::Up), Some(Command::SelectUp));
        assert_eq!(Command::from_key(&Key::Down), Some(Command::SelectDown));
        assert_eq!(Command::from_key(&Key::Enter), Some(Command::Confirm));

        // Only the lowercase letters are bound
        assert_eq!(Command::from_key(&Key::Char('W')), None);
        assert_eq!(Command::from_key(&Key::Char('x')), None);
        assert_eq!(Command::from_key(&Key::Left), None);
        assert_eq!(Command::from_key(&Key::Other), None);
    }

    #[test]
    fn test_slot_starts_neutral() {
        let slot = CommandSlot::new();
        assert_eq!(slot.get(), Command::Neutral);
        assert_eq!(slot.set(Command::Forward), Command::Neutral);
        assert_eq!(slot.get(), Command::Forward);
    }

    #[test]
    fn test_display() {
        assert_eq!(Command::Confirm.to_string(), "e");
        assert_eq!(Command::default().to_string(), "n");
    }
}
