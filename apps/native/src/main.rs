mod cli;
mod console;

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use actor_protocol::{StatusLevel, SystemEvent, UiCommand};
use actor_runtime::{spawn_actor, ChannelManager};
use connection_actors::{forward_event, LinkConfig, SessionActor, Transcript};
use core_types::{PortDescriptor, PortEnumerator};
use framing::{collisions, compact, frame, SCRIPT_DELIMITER};
use futures::channel::mpsc::UnboundedReceiver;
use futures::stream::StreamExt;
use highlight::{spawn_debounced, HighlightScheduler};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use transport_native::NativeTransportFactory;

use crate::cli::Cli;
use crate::console::{parse_input, AnsiPreview, EditBuffer, Input, TranscriptPrinter, HELP};

/// Script awaiting operator confirmation after a collision warning.
type PendingScript = Arc<Mutex<Option<String>>>;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so stdout carries only the transcript
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(cli).await {
        error!("scriptlink failed: {}", e);
        eprintln!("scriptlink: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let factory = NativeTransportFactory::new();

    if cli.list_ports {
        let ports = factory.list_available_ports()?;
        if ports.is_empty() {
            println!("No serial ports found");
        }
        for port in ports {
            println!("{}", port);
        }
        return Ok(());
    }

    let (mut manager, handles) = ChannelManager::new();
    let events = manager
        .take_event_receiver()
        .ok_or("event receiver already taken")?;
    let transcript = Transcript::with_events(handles.event_tx.clone());
    let config = LinkConfig::default();
    let session = SessionActor::new(
        Arc::new(factory),
        config,
        transcript,
        handles.event_tx.clone(),
    );
    let session_task = spawn_actor(session, handles.session_rx, handles.event_tx);

    let pending: PendingScript = Arc::default();
    let printer_task = tokio::spawn(print_events(events, Arc::clone(&pending)));

    let buffer = EditBuffer::default();
    let (highlight_tx, highlight_task) = spawn_debounced(
        Arc::new(HighlightScheduler::new()),
        Duration::from_millis(cli.idle_ms),
        buffer.clone(),
        AnsiPreview::new(buffer.clone(), std::io::stdout()),
    );

    let connect = |port: Option<String>| UiCommand::Connect {
        port: PortDescriptor::new(port.or_else(|| cli.port.clone()).unwrap_or_default()),
        baud: cli.baud,
    };

    if cli.port.is_some() {
        submit(&manager, connect(None));
    }
    info!("scriptlink started");
    println!("scriptlink ready. Type :help for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_input(&line) {
            Input::Empty => {}
            Input::Quit => break,
            Input::Help => println!("{}", HELP),
            Input::Connect(port) => submit(&manager, connect(port)),
            Input::Disconnect => submit(&manager, UiCommand::Disconnect),
            Input::Toggle => submit(
                &manager,
                UiCommand::ToggleConnection {
                    port: PortDescriptor::new(cli.port.clone().unwrap_or_default()),
                    baud: cli.baud,
                },
            ),
            Input::Ports => submit(&manager, UiCommand::RefreshPorts),
            Input::Clear => submit(&manager, UiCommand::ClearTranscript),
            Input::Message(text) => submit(&manager, UiCommand::SendMessage { text }),
            Input::Send(path) => {
                if let Some(source) = read_script(&path).await {
                    submit(
                        &manager,
                        UiCommand::SendScript {
                            source,
                            force: false,
                        },
                    );
                }
            }
            Input::Confirm => {
                let source = pending
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .take();
                match source {
                    Some(source) => submit(&manager, UiCommand::SendScript { source, force: true }),
                    None => println!("Nothing waiting for confirmation"),
                }
            }
            Input::Preview(path) => {
                if let Some(source) = read_script(&path).await {
                    preview(&source);
                }
            }
            Input::Highlight(path) => {
                if let Some(source) = read_script(&path).await {
                    buffer.replace(source);
                    if highlight_tx.unbounded_send(()).is_err() {
                        debug!("highlighter stopped");
                    }
                }
            }
            Input::Unknown(text) => println!("Unknown command: {} (try :help)", text),
        }
    }

    // Closing the inbox makes the session disconnect and stop
    manager.close();
    drop(manager);
    if let Err(e) = session_task.await {
        error!("session task failed: {}", e);
    }
    drop(highlight_tx);
    let _ = highlight_task.await;
    let _ = printer_task.await;
    info!("scriptlink stopped");
    Ok(())
}

fn submit(manager: &ChannelManager, cmd: UiCommand) {
    if let Err(e) = manager.send_command(cmd) {
        eprintln!("● {}", e);
    }
}

async fn read_script(path: &str) -> Option<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(source) => Some(source),
        Err(e) => {
            eprintln!("● Cannot read {}: {}", path, e);
            None
        }
    }
}

fn preview(source: &str) {
    let found = collisions(source, SCRIPT_DELIMITER);
    if found > 0 {
        println!("⚠ {} '$' character(s) in script; :send will ask for confirmation", found);
    }
    match frame(&compact(source), SCRIPT_DELIMITER, true) {
        Ok(wire) => println!("{}", wire.to_text()),
        Err(warning) => println!("⚠ {}", warning),
    }
}

async fn print_events(mut events: UnboundedReceiver<SystemEvent>, pending: PendingScript) {
    let mut printer = TranscriptPrinter::new(std::io::stdout());

    while let Some(event) = events.next().await {
        if forward_event(&mut printer, &event) {
            continue;
        }
        match event {
            SystemEvent::StateChanged { state } => debug!("link state: {:?}", state),
            SystemEvent::StatusUpdate { message, level } => {
                let marker = match level {
                    StatusLevel::Info => "●",
                    StatusLevel::Warning => "⚠",
                    StatusLevel::Error => "✖",
                };
                println!("{} {}", marker, message);
            }
            SystemEvent::Error { message } => {
                error!("{}", message);
                println!("✖ {}", message);
            }
            SystemEvent::CollisionWarning { message, source } => {
                println!("⚠ {}", message);
                println!("  Type :yes to send it anyway.");
                *pending.lock().unwrap_or_else(PoisonError::into_inner) = Some(source);
            }
            SystemEvent::PortsListed { ports } => {
                for port in ports {
                    println!("  {}", port);
                }
            }
            SystemEvent::TranscriptAppended { .. } | SystemEvent::TranscriptCleared => {}
        }
    }
}
