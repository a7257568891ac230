use std::future::Future;

use actor_protocol::{ActorError, SystemEvent};
use futures::stream::StreamExt;
use futures_channel::mpsc;

use crate::channels::EventSender;
use crate::{actor_debug, actor_warn};

/// Actor trait for implementing message-driven components
///
/// Actors are independent, stateful components that communicate through
/// message passing. Each actor has its own message queue and processes
/// messages sequentially.
///
/// # Lifecycle
///
/// 1. **init()** - Called once before message processing starts
/// 2. **handle()** - Called for each received message
/// 3. **shutdown()** - Called when the inbox closes
///
/// Futures are required to be `Send` so actors can run on a multi-threaded
/// tokio runtime. Implementors may still write `async fn`.
///
/// # Example
///
/// ```ignore
/// struct MyActor {
///     event_tx: EventSender,
/// }
///
/// impl Actor for MyActor {
///     type Message = MyMessage;
///
///     fn name(&self) -> &'static str {
///         "MyActor"
///     }
///
///     async fn handle(&mut self, msg: Self::Message) -> Result<(), ActorError> {
///         // Process message
///         Ok(())
///     }
/// }
/// ```
pub trait Actor: Send + Sized + 'static {
    /// Message type this actor processes
    type Message: Send + 'static;

    /// Actor name (used for logging and debugging)
    fn name(&self) -> &'static str;

    /// Initialize the actor before processing messages
    fn init(&mut self) -> impl Future<Output = Result<(), ActorError>> + Send {
        async { Ok(()) }
    }

    /// Handle a single message
    fn handle(
        &mut self,
        msg: Self::Message,
    ) -> impl Future<Output = Result<(), ActorError>> + Send;

    /// Clean up before shutdown
    ///
    /// Called when the actor is stopping. Use this to close connections
    /// and release resources.
    fn shutdown(&mut self) -> impl Future<Output = ()> + Send {
        async {}
    }

    /// Main actor run loop (provided by runtime)
    ///
    /// Consumes the actor and runs it until `rx` closes. Errors from
    /// `handle` are reported as [`SystemEvent::Error`] and processing
    /// continues with the next message.
    fn run(
        mut self,
        mut rx: mpsc::Receiver<Self::Message>,
        event_tx: EventSender,
    ) -> impl Future<Output = ()> + Send {
        async move {
            if let Err(e) = self.init().await {
                let _ = event_tx.unbounded_send(SystemEvent::Error {
                    message: format!("{} init failed: {}", self.name(), e),
                });
                return;
            }

            actor_debug!("{} started", self.name());

            while let Some(msg) = rx.next().await {
                if let Err(e) = self.handle(msg).await {
                    actor_warn!("{} error: {}", self.name(), e);
                    let _ = event_tx.unbounded_send(SystemEvent::Error {
                        message: format!("{} error: {}", self.name(), e),
                    });
                }
            }

            self.shutdown().await;

            actor_debug!("{} stopped", self.name());
        }
    }
}

/// Spawn an actor on the current tokio runtime
pub fn spawn_actor<A>(
    actor: A,
    rx: mpsc::Receiver<A::Message>,
    event_tx: EventSender,
) -> tokio::task::JoinHandle<()>
where
    A: Actor,
{
    tokio::spawn(actor.run(rx, event_tx))
}
