//! Command server lifecycle.

use std::{
    net::SocketAddr,
    sync::{Arc, Mutex, OnceLock, PoisonError},
};

use kiosk_shared::time::{Clock, SystemClock};
use tokio::{net::TcpListener, task::JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::{config::ServerConfig, usecase::Dispatcher};

use super::{
    ChannelError,
    client::ClientFacade,
    listener::{ConnectionContext, accept_loop},
    state::{ChannelState, ChannelStatus},
};

/// TCP command server
///
/// Serves one controller at a time, feeds its commands to a [`Dispatcher`]
/// and publishes the latest command through a [`ClientFacade`]. A newly
/// accepted controller replaces the current one.
///
/// # Example
///
/// ```ignore
/// let server = CommandServer::new(ServerConfig::default());
/// let mut dispatcher = Dispatcher::new();
/// let shutdown = server.shutdown_handle();
/// dispatcher.register_command(Command::Exit, move || {
///     shutdown.stop();
///     Ok(())
/// });
/// server.start(dispatcher).await?;
/// let client = server.client();
/// ```
pub struct CommandServer {
    config: ServerConfig,
    state: Arc<ChannelState>,
    cancel: CancellationToken,
    accept_task: Mutex<Option<JoinHandle<()>>>,
    local_addr: OnceLock<SocketAddr>,
}

impl CommandServer {
    pub fn new(config: ServerConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a server whose connection timestamps come from `clock`.
    pub fn with_clock(config: ServerConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            state: Arc::new(ChannelState::new(clock)),
            cancel: CancellationToken::new(),
            accept_task: Mutex::new(None),
            local_addr: OnceLock::new(),
        }
    }

    pub fn client(&self) -> ClientFacade {
        ClientFacade::new(Arc::clone(&self.state))
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            cancel: self.cancel.clone(),
            state: Arc::clone(&self.state),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn status(&self) -> ChannelStatus {
        self.state.status()
    }

    /// Address actually bound, once started.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr.get().copied()
    }

    /// Bind the listening socket and start accepting controllers.
    ///
    /// The dispatcher is frozen from here on.
    ///
    /// # Errors
    ///
    /// * [`ChannelError::Bind`] if the address is unavailable; `start` may be
    ///   retried afterwards
    /// * [`ChannelError::AlreadyStarted`] on a second call
    /// * [`ChannelError::Stopped`] after [`stop`](Self::stop)
    pub async fn start(&self, dispatcher: Dispatcher) -> Result<SocketAddr, ChannelError> {
        if self.cancel.is_cancelled() {
            return Err(ChannelError::Stopped);
        }
        if !self.state.try_mark_started() {
            return Err(ChannelError::AlreadyStarted);
        }

        let (listener, local_addr) = match self.bind().await {
            Ok(bound) => bound,
            Err(e) => {
                self.state.clear_started();
                return Err(e);
            }
        };

        self.state.set_running(true);
        tracing::info!("Command server listening on {}", local_addr);
        tracing::debug!("Registered commands: {:?}", dispatcher);

        let ctx = ConnectionContext {
            state: Arc::clone(&self.state),
            dispatcher: Arc::new(dispatcher),
            max_line_length: self.config.max_line_length,
            ack_prefix: Arc::from(self.config.ack_prefix.as_str()),
        };
        let task = tokio::spawn(accept_loop(listener, ctx, self.cancel.clone()));

        *self
            .accept_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(task);
        let _ = self.local_addr.set(local_addr);

        Ok(local_addr)
    }

    async fn bind(&self) -> Result<(TcpListener, SocketAddr), ChannelError> {
        let bind_addr = self.config.bind_addr();
        let bind_error = |source: std::io::Error| ChannelError::Bind {
            addr: bind_addr.clone(),
            source,
        };
        let listener = TcpListener::bind(&bind_addr).await.map_err(bind_error)?;
        let local_addr = listener.local_addr().map_err(bind_error)?;
        Ok((listener, local_addr))
    }

    /// Stop accepting and close every connection. Idempotent.
    pub fn stop(&self) {
        self.shutdown_handle().stop();
    }

    /// Wait until the accept loop and all connection tasks have exited.
    ///
    /// Returns immediately if the server was never started or has already
    /// been waited on.
    pub async fn wait(&self) {
        let task = self
            .accept_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = task
            && let Err(e) = task.await
        {
            tracing::error!("Accept loop failed: {}", e);
        }
    }
}

impl Drop for CommandServer {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Stop-only handle, cheap to clone into command handlers.
#[derive(Clone)]
pub struct ShutdownHandle {
    cancel: CancellationToken,
    state: Arc<ChannelState>,
}

impl ShutdownHandle {
    pub fn stop(&self) {
        if !self.cancel.is_cancelled() {
            tracing::info!("Stopping command server");
        }
        self.state.set_running(false);
        self.cancel.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
