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

//! Backend-neutral key identities.

use crossterm::event::KeyCode;

/// A key as seen by the watcher, independent of the backend that reported it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// A printable character.
    Char(char),
    Up,
    Down,
    Left,
    Right,
    Enter,
    Escape,
    /// Anything the bridge has no name for.
    Other,
}

impl Key {
    /// Convert a key reported by the global hook.
    ///
    /// The hook reports physical keys, so letters come through lowercase
    /// regardless of Shift or Caps Lock.
    #[cfg(feature = "x11")]
    pub fn from_rdev(key: rdev::Key) -> Self {
        use rdev::Key as RKey;
        match key {
            RKey::KeyA => Key::Char('a'),
            RKey::KeyB => Key::Char('b'),
            RKey::KeyC => Key::Char('c'),
            RKey::KeyD => Key::Char('d'),
            RKey::KeyE => Key::Char('e'),
            RKey::KeyF => Key::Char('f'),
            RKey::KeyG => Key::Char('g'),
            RKey::KeyH => Key::Char('h'),
            RKey::KeyI => Key::Char('i'),
            RKey::KeyJ => Key::Char('j'),
            RKey::KeyK => Key::Char('k'),
            RKey::KeyL => Key::Char('l'),
            RKey::KeyM => Key::Char('m'),
            RKey::KeyN => Key::Char('n'),
            RKey::KeyO => Key::Char('o'),
            RKey::KeyP => Key::Char('p'),
            RKey::KeyQ => Key::Char('q'),
            RKey::KeyR => Key::Char('r'),
            RKey::KeyS => Key::Char('s'),
            RKey::KeyT => Key::Char('t'),
            RKey::KeyU => Key::Char('u'),
            RKey::KeyV => Key::Char('v'),
            RKey::KeyW => Key::Char('w'),
            RKey::KeyX => Key::Char('x'),
            RKey::KeyY => Key::Char('y'),
            RKey::KeyZ => Key::Char('z'),
            RKey::Space => Key::Char(' '),
            RKey::UpArrow => Key::Up,
            RKey::DownArrow => Key::Down,
            RKey::LeftArrow => Key::Left,
            RKey::RightArrow => Key::Right,
            RKey::Return | RKey::KpReturn => Key::Enter,
            RKey::Escape => Key::Escape,
            _ => Key::Other,
        }
    }

    /// Convert a key reported by the terminal.
    pub fn from_crossterm(code: KeyCode) -> Self {
        match code {
            KeyCode::Char(c) => Key::Char(c),
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            KeyCode::Left => Key::Left,
            KeyCode::Right => Key::Right,
            KeyCode::Enter => Key::Enter,
            KeyCode::Esc => Key::Escape,
            _ => Key::Other,
        }
    }
}
