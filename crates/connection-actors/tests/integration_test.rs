//! Integration tests for the session actor
//!
//! These tests drive the full path UI command → SessionActor → SerialLink →
//! mock device → read loop → transcript, through the real channels.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use std::sync::Arc;
use std::time::Duration;

use actor_protocol::{ConnectionState, SystemEvent, UiCommand};
use actor_runtime::{spawn_actor, ChannelManager};
use connection_actors::mock::MockTransportFactory;
use connection_actors::{forward_event, LinkConfig, SessionActor, Transcript};
use core_types::{Direction, PortDescriptor, TranscriptDisplay, TranscriptEvent};
use futures::stream::StreamExt;
use futures_channel::mpsc;
use tokio::task::JoinHandle;

const PORT: &str = "/dev/ttyMOCK0";

struct Harness {
    manager: ChannelManager,
    events: mpsc::UnboundedReceiver<SystemEvent>,
    factory: MockTransportFactory,
    transcript: Transcript,
    task: JoinHandle<()>,
}

fn start() -> Harness {
    let factory = MockTransportFactory::with_ports(&[PORT]);
    let (mut manager, handles) = ChannelManager::new();
    let events = manager.take_event_receiver().expect("receiver available");
    let transcript = Transcript::with_events(handles.event_tx.clone());

    let actor = SessionActor::new(
        Arc::new(factory.clone()),
        LinkConfig::default(),
        transcript.clone(),
        handles.event_tx.clone(),
    );
    let task = spawn_actor(actor, handles.session_rx, handles.event_tx);

    Harness {
        manager,
        events,
        factory,
        transcript,
        task,
    }
}

/// Receive events until one matches, failing after a (virtual) second.
async fn wait_for(
    events: &mut mpsc::UnboundedReceiver<SystemEvent>,
    mut pred: impl FnMut(&SystemEvent) -> bool,
) -> SystemEvent {
    tokio::time::timeout(Duration::from_secs(1), async {
        loop {
            let event = events.next().await.expect("event channel open");
            if pred(&event) {
                return event;
            }
        }
    })
    .await
    .expect("expected event did not arrive")
}

fn is_status(event: &SystemEvent, text: &str) -> bool {
    matches!(event, SystemEvent::StatusUpdate { message, .. } if message == text)
}

fn connect_cmd(port: &str) -> UiCommand {
    UiCommand::Connect {
        port: PortDescriptor::new(port),
        baud: 115200,
    }
}

#[tokio::test(start_paused = true)]
async fn test_connect_invalid_port_stays_disconnected() {
    let mut h = start();

    h.manager.send_command(connect_cmd("/dev/ttyNOPE")).unwrap();

    let event = wait_for(&mut h.events, |e| {
        matches!(e, SystemEvent::StatusUpdate { message, .. } if message.starts_with("Connection failed"))
    })
    .await;
    match event {
        SystemEvent::StatusUpdate { message, .. } => assert!(message.contains("No such file")),
        _ => unreachable!(),
    }
    assert_eq!(h.factory.open_handles(), 0);

    // Still usable afterwards
    h.manager.send_command(connect_cmd(PORT)).unwrap();
    wait_for(&mut h.events, |e| {
        matches!(
            e,
            SystemEvent::StateChanged {
                state: ConnectionState::Connected
            }
        )
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn test_send_while_disconnected_is_surfaced() {
    let mut h = start();

    h.manager
        .send_command(UiCommand::SendScript {
            source: "print('hi')".into(),
            force: false,
        })
        .unwrap();

    wait_for(&mut h.events, |e| is_status(e, "Not connected to serial port")).await;
    assert!(h.factory.written().is_empty());
    assert!(h.transcript.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_transcript_keeps_per_direction_order() {
    let mut h = start();
    h.manager.send_command(connect_cmd(PORT)).unwrap();
    wait_for(&mut h.events, |e| is_status(e, "Connected to /dev/ttyMOCK0")).await;

    for i in 1..=3 {
        h.manager
            .send_command(UiCommand::SendScript {
                source: format!("print({})", i),
                force: false,
            })
            .unwrap();
    }
    h.factory.inject_rx(b"1\n2\n");

    tokio::time::sleep(Duration::from_millis(100)).await;

    let events = h.transcript.snapshot();
    let sent: Vec<_> = events
        .iter()
        .filter(|e| e.direction == Direction::Sent)
        .map(|e| e.text.as_str())
        .collect();
    let received: Vec<_> = events
        .iter()
        .filter(|e| e.direction == Direction::Received)
        .map(|e| e.text.as_str())
        .collect();

    assert_eq!(sent, vec!["$print(1)$", "$print(2)$", "$print(3)$"]);
    assert_eq!(received, vec!["1", "2"]);
    assert!(events.windows(2).all(|w| w[0].seq < w[1].seq));
    assert_eq!(
        h.factory.written_text(),
        vec!["$print(1)$", "$print(2)$", "$print(3)$"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_collision_then_forced_send() {
    let mut h = start();
    h.manager.send_command(connect_cmd(PORT)).unwrap();
    wait_for(&mut h.events, |e| is_status(e, "Connected to /dev/ttyMOCK0")).await;

    let script = "price = \"$4\"\nprint(price) -- show it".to_string();
    h.manager
        .send_command(UiCommand::SendScript {
            source: script.clone(),
            force: false,
        })
        .unwrap();

    let warning = wait_for(&mut h.events, |e| {
        matches!(e, SystemEvent::CollisionWarning { .. })
    })
    .await;
    let source = match warning {
        SystemEvent::CollisionWarning { source, .. } => source,
        _ => unreachable!(),
    };
    assert!(h.factory.written().is_empty());

    // Operator confirms
    h.manager
        .send_command(UiCommand::SendScript {
            source,
            force: true,
        })
        .unwrap();
    wait_for(&mut h.events, |e| is_status(e, "Code sent successfully")).await;

    assert_eq!(
        h.factory.written_text(),
        vec!["$price = \"$4\" print(price)$"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_read_errors_do_not_stop_the_loop() {
    let mut h = start();
    h.manager.send_command(connect_cmd(PORT)).unwrap();
    wait_for(&mut h.events, |e| is_status(e, "Connected to /dev/ttyMOCK0")).await;

    h.factory.inject_read_error("Input/output error");
    h.factory.inject_rx(b"alive\n");

    let event = wait_for(&mut h.events, |e| {
        matches!(e, SystemEvent::TranscriptAppended { event } if event.direction == Direction::Received)
    })
    .await;
    match event {
        SystemEvent::TranscriptAppended { event } => assert_eq!(event.text, "alive"),
        _ => unreachable!(),
    }

    let texts: Vec<_> = h.transcript.snapshot().into_iter().map(|e| e.text).collect();
    assert_eq!(texts, vec!["Read error: IO Error: Input/output error", "alive"]);
}

#[tokio::test(start_paused = true)]
async fn test_display_follows_transcript_events() {
    #[derive(Default)]
    struct Console(Vec<String>);

    impl TranscriptDisplay for Console {
        fn render_transcript_append(&mut self, event: &TranscriptEvent) {
            self.0.push(format!("{} {}", event.direction.label(), event.text));
        }

        fn render_transcript_cleared(&mut self) {
            self.0.clear();
        }
    }

    let mut h = start();
    h.manager.send_command(connect_cmd(PORT)).unwrap();
    h.manager
        .send_command(UiCommand::SendMessage {
            text: "node.heap()".into(),
        })
        .unwrap();
    h.manager.send_command(UiCommand::ClearTranscript).unwrap();
    h.manager
        .send_command(UiCommand::SendMessage {
            text: "node.info()".into(),
        })
        .unwrap();

    let mut console = Console::default();
    let mut sent = 0;
    tokio::time::timeout(Duration::from_secs(1), async {
        while sent < 2 {
            let event = h.events.next().await.unwrap();
            if is_status(&event, "Message sent") {
                sent += 1;
            }
            forward_event(&mut console, &event);
        }
    })
    .await
    .unwrap();

    assert_eq!(console.0, vec!["SENT node.info()"]);
}

#[tokio::test(start_paused = true)]
async fn test_closing_inbox_disconnects() {
    let mut h = start();
    h.manager.send_command(connect_cmd(PORT)).unwrap();
    wait_for(&mut h.events, |e| is_status(e, "Connected to /dev/ttyMOCK0")).await;
    assert_eq!(h.factory.open_handles(), 1);

    h.manager.close();
    h.task.await.unwrap();

    assert_eq!(h.factory.open_handles(), 0);
    wait_for(&mut h.events, |e| {
        matches!(
            e,
            SystemEvent::StateChanged {
                state: ConnectionState::Disconnected
            }
        )
    })
    .await;
}
