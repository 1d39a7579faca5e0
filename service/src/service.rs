//! Watch → notify orchestration and the service lifecycle.

use std::sync::Arc;

use dirmail_directory_watcher::{DirectoryWatcher, EventStream, FileCreatedEvent, WatchConfig};
use dirmail_notifier::{MailConfig, MailTransport, Notifier};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::{DispatchConfig, ServiceConfig};
use crate::error::{Result, ServiceError};

/// Lifecycle state of a [`WatchService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    /// Nothing registered.
    Stopped,

    /// Validating configuration and registering the watch.
    Starting,

    /// Dispatching events.
    Running,

    /// Releasing the watch.
    Stopping,
}

/// The running dispatch loop.
struct Dispatcher {
    task: JoinHandle<()>,
    shutdown: CancellationToken,
}

/// Subscribes the notifier to the directory watcher.
///
/// A failed notification is logged and dropped; it never stops the watch.
pub struct WatchService {
    /// What to watch.
    watch: WatchConfig,

    /// Where and what to send.
    mail: MailConfig,

    /// Dispatch tuning.
    dispatch: DispatchConfig,

    /// Transport override; SMTP when `None`.
    transport: Option<Arc<dyn MailTransport>>,

    /// OS registration, held while running.
    watcher: Option<DirectoryWatcher>,

    /// Event dispatch loop, alive while running.
    dispatcher: Option<Dispatcher>,

    /// Current lifecycle state.
    state: ServiceState,
}

impl WatchService {
    /// Create a stopped service.
    pub fn new(config: &ServiceConfig) -> Self {
        Self {
            watch: config.directory_watcher.clone(),
            mail: config.mail_config.clone(),
            dispatch: config.service.clone(),
            transport: None,
            watcher: None,
            dispatcher: None,
            state: ServiceState::Stopped,
        }
    }

    /// Send notifications through `transport` instead of SMTP.
    pub fn with_transport(mut self, transport: Arc<dyn MailTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ServiceState {
        self.state
    }

    /// Validate the configuration, register the watch and begin dispatching.
    ///
    /// On failure nothing stays registered and the service is back in
    /// [`ServiceState::Stopped`]. Calling this while running does nothing.
    pub async fn start(&mut self, cancel: &CancellationToken) -> Result<()> {
        if self.state == ServiceState::Running {
            return Ok(());
        }

        info!("DirectoryWatcher service is starting");
        self.state = ServiceState::Starting;

        match self.register(cancel) {
            Ok(()) => {
                self.state = ServiceState::Running;
                Ok(())
            }
            Err(e) => {
                self.release();
                self.state = ServiceState::Stopped;
                error!("DirectoryWatcher service failed to start: {e}");
                Err(e)
            }
        }
    }

    fn register(&mut self, cancel: &CancellationToken) -> Result<()> {
        let notifier = match &self.transport {
            Some(transport) => Notifier::with_transport(&self.mail, transport.clone())?,
            None => Notifier::new(&self.mail)?,
        };

        if cancel.is_cancelled() {
            return Err(ServiceError::Cancelled);
        }

        let mut watcher =
            DirectoryWatcher::new(self.watch.clone()).with_capacity(self.dispatch.event_capacity);
        let events = watcher.start()?;

        info!(
            "Lookup {} ({}) for changes, notifying {} recipient(s)",
            self.watch.path.display(),
            self.watch.filter,
            notifier.envelope().to.len()
        );

        let shutdown = CancellationToken::new();
        let limit = match self.dispatch.max_concurrent_notifications {
            0 => None,
            permits => Some(Arc::new(Semaphore::new(permits))),
        };
        let task = tokio::spawn(dispatch(
            events,
            Arc::new(notifier),
            limit,
            shutdown.clone(),
        ));

        self.watcher = Some(watcher);
        self.dispatcher = Some(Dispatcher { task, shutdown });

        Ok(())
    }

    /// Idle until the host asks the service to shut down.
    pub async fn run(&self, cancel: &CancellationToken) {
        cancel.cancelled().await;
        debug!("Shutdown requested");
    }

    /// End the dispatch loop and release the watch.
    ///
    /// Safe from any state and safe to repeat. Notifications already being
    /// sent are left to finish on their own. Waiting for the dispatch loop
    /// ends early if `cancel` fires, in which case the loop is aborted.
    pub async fn stop(&mut self, cancel: &CancellationToken) {
        if self.watcher.is_none() && self.dispatcher.is_none() {
            self.state = ServiceState::Stopped;
            return;
        }

        info!("DirectoryWatcher service is stopping");
        self.state = ServiceState::Stopping;

        // The dispatch loop owns the event stream. Closing it first releases
        // a watcher callback blocked on a full channel.
        if let Some(Dispatcher { mut task, shutdown }) = self.dispatcher.take() {
            shutdown.cancel();

            tokio::select! {
                result = &mut task => {
                    if let Err(e) = result {
                        warn!("Dispatch loop ended abnormally: {e}");
                    }
                }
                _ = cancel.cancelled() => {
                    warn!("Stop cancelled before the dispatch loop finished");
                    task.abort();
                }
            }
        }

        if let Some(mut watcher) = self.watcher.take() {
            watcher.stop();
        }

        self.state = ServiceState::Stopped;
        info!("DirectoryWatcher service stopped");
    }

    fn release(&mut self) {
        if let Some(dispatcher) = self.dispatcher.take() {
            dispatcher.shutdown.cancel();
            dispatcher.task.abort();
        }

        if let Some(mut watcher) = self.watcher.take() {
            watcher.stop();
        }
    }
}

impl Drop for WatchService {
    fn drop(&mut self) {
        self.release();
    }
}

/// Hand every event to its own notification task.
async fn dispatch(
    mut events: EventStream,
    notifier: Arc<Notifier>,
    limit: Option<Arc<Semaphore>>,
    shutdown: CancellationToken,
) {
    loop {
        let event = tokio::select! {
            _ = shutdown.cancelled() => break,
            event = events.recv() => match event {
                Some(event) => event,
                None => break,
            },
        };

        info!("New file found! Path: {}", event.full_path.display());

        let permit = match &limit {
            Some(limit) => tokio::select! {
                _ = shutdown.cancelled() => break,
                permit = limit.clone().acquire_owned() => match permit {
                    Ok(permit) => Some(permit),
                    Err(_) => break,
                },
            },
            None => None,
        };

        let notifier = notifier.clone();
        tokio::spawn(async move {
            let _permit = permit;
            handle_event(&notifier, &event).await;
        });
    }

    debug!("Dispatch loop finished");
}

/// Send one notification and log the outcome. Errors stop here.
async fn handle_event(notifier: &Notifier, event: &FileCreatedEvent) {
    match notifier.notify(event).await {
        Ok(()) => info!("E-Mail sent for {}", event.full_path.display()),
        Err(e) => error!(
            path = %event.full_path.display(),
            error = &e as &(dyn std::error::Error + 'static),
            "Error sending mail!"
        ),
    }
}
