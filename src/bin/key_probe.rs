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

//! Test utility for keyboard input, no Bluetooth involved.
//!
//! Usage: cargo run --bin key_probe -- [auto|global|terminal]

use anyhow::Result;
use keybridge::input::{create_source_with_preference, InputEvent, InputWatcher, TerminalGuard};
use keybridge::{logging, CommandSlot};
use std::env;
use tokio::sync::mpsc;

fn main() -> Result<()> {
    // Initialize logging
    logging::init();

    let args: Vec<String> = env::args().collect();
    let backend = args.get(1).map(|s| s.as_str()).unwrap_or("auto");

    let source = create_source_with_preference(backend)?;
    println!("Using backend: {}", source.backend_name());

    let _terminal = TerminalGuard::acquire(source.reads_terminal())?;
    // Raw mode: every line needs its own carriage return
    print!("Press keys to see the command they produce. Ctrl+C to quit.\r\n");

    let slot = CommandSlot::new();
    let watcher = InputWatcher::new(slot.clone());
    let (tx, mut rx) = mpsc::unbounded_channel();
    source.spawn(tx)?;

    while let Some(event) = rx.blocking_recv() {
        if event == InputEvent::Interrupt {
            break;
        }
        let command = watcher.apply(event);
        print!(
            "{:<28} -> '{}' (byte {})\r\n",
            format!("{:?}", event),
            command,
            command.as_byte()
        );
    }

    print!("Done!\r\n");
    Ok(())
}
