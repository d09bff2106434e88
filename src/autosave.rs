//! Periodic background saving.
//!
//! The app is shared behind a tokio mutex; a save holds the lock for its
//! whole duration, so it never interleaves with a mutation.

use crate::app::BoardApp;
use crate::presenter::Presenter;
use crate::storage::KeyValueStore;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

pub type SharedApp<S, P> = Arc<Mutex<BoardApp<S, P>>>;

/// Handle to a running autosave task
pub struct AutoSave {
    stop: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl AutoSave {
    /// Starts autosave with the app's configured interval, unless the board
    /// settings turn it off
    pub async fn start<S, P>(app: SharedApp<S, P>) -> Option<Self>
    where
        S: KeyValueStore + 'static,
        P: Presenter + Send + 'static,
    {
        let interval = {
            let guard = app.lock().await;
            if !guard.store().board().settings.auto_save {
                info!("Autosave disabled by board settings");
                return None;
            }
            guard.adapter().config().autosave_interval
        };
        Some(Self::spawn(app, interval))
    }

    /// Saves unsaved changes every `interval` until shut down
    pub fn spawn<S, P>(app: SharedApp<S, P>, interval: Duration) -> Self
    where
        S: KeyValueStore + 'static,
        P: Presenter + Send + 'static,
    {
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match app.lock().await.save_if_dirty().await {
                            Ok(true) => debug!("Autosaved board"),
                            Ok(false) => {}
                            Err(e) => warn!("Autosave failed, retrying next tick: {}", e),
                        }
                    }
                    _ = &mut stop_rx => break,
                }
            }

            // Teardown save
            if let Err(e) = app.lock().await.save_if_dirty().await {
                warn!("Final save failed: {}", e);
            }
        });

        Self {
            stop: Some(stop_tx),
            handle,
        }
    }

    /// Stops the task after one last save of pending changes
    pub async fn shutdown(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Err(e) = (&mut self.handle).await {
            warn!("Autosave task ended abnormally: {}", e);
        }
    }
}

impl Drop for AutoSave {
    fn drop(&mut self) {
        if self.stop.is_some() {
            self.handle.abort();
        }
    }
}
