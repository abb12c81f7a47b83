//! End-to-end tests: key events -> watcher -> slot -> pump -> sink.

use keybridge::input::{InputEvent, InputWatcher, Key, WatcherExit};
use keybridge::{CommandPump, CommandSink, CommandSlot, Result, SEND_INTERVAL};
use parking_lot::Mutex;
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{sleep, Instant};

#[derive(Default)]
struct RecordingSink {
    writes: Mutex<Vec<(Instant, u8)>>,
}

impl CommandSink for RecordingSink {
    fn write_command(&self, byte: u8) -> impl Future<Output = Result<()>> + Send {
        self.writes.lock().push((Instant::now(), byte));
        std::future::ready(Ok(()))
    }
}

enum Step {
    Wait(u64),
    Emit(InputEvent),
}

use Step::{Emit, Wait};

/// Run the bridge against a recording sink while replaying `steps`.
async fn run_scenario(steps: &[Step]) -> Vec<(Instant, u8)> {
    let slot = CommandSlot::new();
    let (tx, rx) = mpsc::unbounded_channel();
    let watcher = tokio::spawn(InputWatcher::new(slot.clone()).run(rx));
    let pump = CommandPump::new(RecordingSink::default(), slot);

    let script = async {
        for step in steps {
            match step {
                Wait(ms) => sleep(Duration::from_millis(*ms)).await,
                Emit(event) => tx.send(*event).unwrap(),
            }
        }
        sleep(Duration::from_millis(25)).await;
    };

    tokio::select! {
        _ = pump.run() => panic!("pump stopped"),
        _ = script => {}
    }

    drop(tx);
    assert_eq!(watcher.await.unwrap(), WatcherExit::SourceClosed);

    let writes = pump.sink().writes.lock().clone();
    writes
}

fn transitions(writes: &[(Instant, u8)]) -> Vec<u8> {
    let mut bytes: Vec<u8> = writes.iter().map(|(_, byte)| *byte).collect();
    bytes.dedup();
    bytes
}

#[tokio::test(start_paused = true)]
async fn test_no_key_sends_neutral() {
    let writes = run_scenario(&[Wait(100)]).await;
    assert!(writes.len() >= 10);
    assert!(writes.iter().all(|(_, byte)| *byte == 110));
}

#[tokio::test(start_paused = true)]
async fn test_hold_and_release_w() {
    let writes = run_scenario(&[
        Wait(35),
        Emit(InputEvent::Pressed(Key::Char('w'))),
        Wait(50),
        Emit(InputEvent::Released(Key::Char('w'))),
        Wait(30),
    ])
    .await;

    assert_eq!(transitions(&writes), vec![110, 119, 110]);
    let held = writes.iter().filter(|(_, byte)| *byte == 119).count();
    assert!((4..=6).contains(&held), "sent 'w' {} times", held);
}

#[tokio::test(start_paused = true)]
async fn test_up_arrow_sends_u_until_release() {
    let writes = run_scenario(&[
        Wait(15),
        Emit(InputEvent::Pressed(Key::Up)),
        Wait(40),
        Emit(InputEvent::Released(Key::Up)),
    ])
    .await;

    assert_eq!(transitions(&writes), vec![110, 117, 110]);
}

#[tokio::test(start_paused = true)]
async fn test_unmapped_key_changes_nothing() {
    let writes = run_scenario(&[
        Wait(15),
        Emit(InputEvent::Pressed(Key::Char('x'))),
        Wait(30),
        Emit(InputEvent::Pressed(Key::Char('s'))),
        Wait(30),
        Emit(InputEvent::Pressed(Key::Char('x'))),
        Wait(30),
    ])
    .await;

    assert_eq!(transitions(&writes), vec![110, 115]);
}

#[tokio::test(start_paused = true)]
async fn test_release_of_unrelated_key_clears_held_command() {
    let writes = run_scenario(&[
        Wait(15),
        Emit(InputEvent::Pressed(Key::Char('w'))),
        Wait(30),
        Emit(InputEvent::Pressed(Key::Char('x'))),
        Wait(30),
        // 'w' stays down
        Emit(InputEvent::Released(Key::Char('x'))),
        Wait(30),
    ])
    .await;

    assert_eq!(transitions(&writes), vec![110, 119, 110]);
}

#[tokio::test(start_paused = true)]
async fn test_selector_and_confirm_sequence() {
    let writes = run_scenario(&[
        Wait(15),
        Emit(InputEvent::Pressed(Key::Down)),
        Wait(20),
        Emit(InputEvent::Released(Key::Down)),
        Wait(20),
        Emit(InputEvent::Pressed(Key::Enter)),
        Wait(20),
        Emit(InputEvent::Released(Key::Enter)),
    ])
    .await;

    assert_eq!(transitions(&writes), vec![b'n', b'd', b'n', b'e', b'n']);
}

#[tokio::test(start_paused = true)]
async fn test_writes_never_closer_than_interval() {
    let writes = run_scenario(&[
        Wait(12),
        Emit(InputEvent::Pressed(Key::Char('w'))),
        Wait(3),
        Emit(InputEvent::Released(Key::Char('w'))),
        Wait(80),
    ])
    .await;

    for pair in writes.windows(2) {
        assert!(pair[1].0 - pair[0].0 >= SEND_INTERVAL);
    }
}
