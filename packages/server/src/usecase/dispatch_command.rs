//! UseCase: command dispatch
//!
//! Maps command names to handlers. A handler runs synchronously on the
//! connection task that received the command, so it must return quickly.
//! Handler errors and panics are contained here and never reach the
//! connection's read loop.

use std::{
    any::Any,
    collections::HashMap,
    fmt,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};

use crate::domain::{Command, HandlerError};

/// Zero-argument callback bound to a command name.
#[cfg_attr(test, mockall::automock)]
pub trait CommandHandler: Send + Sync {
    fn handle(&self) -> Result<(), HandlerError>;
}

/// Adapts a closure into a [`CommandHandler`].
pub struct FnHandler<F>(F);

impl<F> FnHandler<F>
where
    F: Fn() -> Result<(), HandlerError> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> CommandHandler for FnHandler<F>
where
    F: Fn() -> Result<(), HandlerError> + Send + Sync,
{
    fn handle(&self) -> Result<(), HandlerError> {
        (self.0)()
    }
}

/// Result of dispatching one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A handler was registered and completed
    Handled,
    /// No handler is registered under this name
    Unmatched,
    /// The handler returned an error or panicked
    Failed(HandlerError),
}

/// Command name to handler registry.
///
/// Names are matched exactly, including case and surrounding whitespace.
/// Registering a name twice replaces the earlier handler.
#[derive(Clone, Default)]
pub struct Dispatcher {
    handlers: HashMap<String, Arc<dyn CommandHandler>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `name`, returning the handler it replaced.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        handler: Arc<dyn CommandHandler>,
    ) -> Option<Arc<dyn CommandHandler>> {
        let name = name.into();
        let replaced = self.handlers.insert(name.clone(), handler);
        if replaced.is_some() {
            tracing::debug!("Replaced handler for command {:?}", name);
        }
        replaced
    }

    /// Register a closure under `name`.
    pub fn register_fn<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn() -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        self.register(name, Arc::new(FnHandler::new(f)));
    }

    /// Register a closure under every wire spelling of `command`.
    pub fn register_command<F>(&mut self, command: Command, f: F)
    where
        F: Fn() -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        let handler: Arc<dyn CommandHandler> = Arc::new(FnHandler::new(f));
        for name in command.wire_names() {
            self.register(*name, handler.clone());
        }
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Invoke the handler registered under the exact text `name`.
    ///
    /// Unknown names are not an error: the controller vocabulary may grow
    /// ahead of the kiosk.
    pub fn dispatch(&self, name: &str) -> DispatchOutcome {
        let Some(handler) = self.handlers.get(name) else {
            tracing::debug!("No handler registered for command {:?}", name);
            return DispatchOutcome::Unmatched;
        };

        match panic::catch_unwind(AssertUnwindSafe(|| handler.handle())) {
            Ok(Ok(())) => DispatchOutcome::Handled,
            Ok(Err(e)) => {
                tracing::warn!("Handler for command {:?} failed: {}", name, e);
                DispatchOutcome::Failed(e)
            }
            Err(payload) => {
                let e = HandlerError::new(format!("panicked: {}", panic_message(&*payload)));
                tracing::error!("Handler for command {:?} {}", name, e);
                DispatchOutcome::Failed(e)
            }
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.handlers.keys().collect();
        names.sort();
        f.debug_struct("Dispatcher").field("commands", &names).finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic payload"
    }
}
