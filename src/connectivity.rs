//! Connectivity observer with a fail-safe timeout.
//!
//! State starts `Undetermined` and settles on the first of: a platform
//! notification, the startup probe, or the timeout. A timeout settles to
//! `Offline`, so nothing is fetched against a network we could not confirm.

use std::future::Future;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::ConnectivityConfig;

/// Observed connectivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
  Online,
  Offline,
  Undetermined,
}

impl Connectivity {
  /// Map a platform "connected" flag. Absent means offline.
  pub fn from_signal(connected: Option<bool>) -> Self {
    match connected {
      Some(true) => Self::Online,
      Some(false) | None => Self::Offline,
    }
  }

  /// Only a positive signal counts as online.
  pub fn is_online(&self) -> bool {
    matches!(self, Self::Online)
  }

  pub fn is_checking(&self) -> bool {
    matches!(self, Self::Undetermined)
  }
}

/// One-shot connectivity check.
pub trait ConnectivityProbe: Send + Sync + 'static {
  fn probe(&self) -> impl Future<Output = Option<bool>> + Send;
}

/// Probes by sending `HEAD` to a URL; any HTTP response means online.
pub struct HttpProbe {
  client: reqwest::Client,
  url: String,
}

impl HttpProbe {
  pub fn new(config: &ConnectivityConfig) -> reqwest::Result<Self> {
    let client = reqwest::Client::builder()
      .timeout(config.timeout())
      .build()?;
    Ok(Self {
      client,
      url: config.probe_url.clone(),
    })
  }
}

impl ConnectivityProbe for HttpProbe {
  async fn probe(&self) -> Option<bool> {
    match self.client.head(&self.url).send().await {
      Ok(response) => {
        debug!(status = response.status().as_u16(), "connectivity probe answered");
        Some(true)
      }
      Err(e) if e.is_timeout() => {
        debug!(error = %e, "connectivity probe timed out");
        None
      }
      Err(e) => {
        debug!(error = %e, "connectivity probe failed");
        Some(false)
      }
    }
  }
}

/// Watches connectivity for as long as it lives.
///
/// Dropping the observer (or calling [`stop`](Self::stop)) cancels the
/// countdown and stops consuming notifications.
pub struct ConnectivityObserver {
  state: watch::Receiver<Connectivity>,
  notifier: mpsc::UnboundedSender<Option<bool>>,
  cancel_tx: broadcast::Sender<()>,
  join: Option<JoinHandle<()>>,
}

impl ConnectivityObserver {
  /// Start observing: probe once, listen for notifications, and arm the
  /// fail-safe countdown.
  pub fn subscribe<P: ConnectivityProbe>(probe: P, timeout: Duration) -> Self {
    let (notifier, notifications) = mpsc::unbounded_channel();
    let (state_tx, state) = watch::channel(Connectivity::Undetermined);
    let (cancel_tx, cancel_rx) = broadcast::channel(1);

    let join = tokio::spawn(observe(probe, notifications, state_tx, cancel_rx, timeout));

    Self {
      state,
      notifier,
      cancel_tx,
      join: Some(join),
    }
  }

  /// Sender for platform change notifications (`None` = unknown).
  pub fn notifier(&self) -> mpsc::UnboundedSender<Option<bool>> {
    self.notifier.clone()
  }

  pub fn current(&self) -> Connectivity {
    *self.state.borrow()
  }

  pub fn is_online(&self) -> bool {
    self.current().is_online()
  }

  pub fn is_checking(&self) -> bool {
    self.current().is_checking()
  }

  /// Receiver that sees every state change.
  pub fn watch(&self) -> watch::Receiver<Connectivity> {
    self.state.clone()
  }

  /// Wait until the state is no longer `Undetermined`.
  pub async fn settled(&self) -> Connectivity {
    let mut state = self.state.clone();
    let settled = state.wait_for(|c| !c.is_checking()).await.map(|c| *c);
    // Task gone without settling: treat as offline.
    settled.unwrap_or(Connectivity::Offline)
  }

  /// Tear down and wait for the background task to finish.
  pub async fn stop(mut self) {
    let _ = self.cancel_tx.send(());
    if let Some(join) = self.join.take() {
      if let Err(e) = join.await {
        warn!(error = %e, "connectivity task ended abnormally");
      }
    }
  }
}

impl Drop for ConnectivityObserver {
  fn drop(&mut self) {
    if let Some(join) = self.join.take() {
      join.abort();
    }
  }
}

async fn observe<P: ConnectivityProbe>(
  probe: P,
  mut notifications: mpsc::UnboundedReceiver<Option<bool>>,
  state: watch::Sender<Connectivity>,
  mut cancel_rx: broadcast::Receiver<()>,
  timeout: Duration,
) {
  let initial_probe = probe.probe();
  tokio::pin!(initial_probe);
  let deadline = tokio::time::sleep(timeout);
  tokio::pin!(deadline);

  let mut probe_pending = true;
  let mut deadline_pending = true;
  let mut notifications_open = true;

  loop {
    tokio::select! {
      _ = cancel_rx.recv() => {
        debug!("connectivity observer stopped");
        break;
      }
      signal = notifications.recv(), if notifications_open => match signal {
        Some(connected) => publish(&state, Connectivity::from_signal(connected), "notification"),
        None => notifications_open = false,
      },
      result = &mut initial_probe, if probe_pending => {
        probe_pending = false;
        publish(&state, Connectivity::from_signal(result), "probe");
      }
      _ = &mut deadline, if deadline_pending => {
        deadline_pending = false;
        if state.borrow().is_checking() {
          warn!(timeout_ms = timeout.as_millis() as u64, "connectivity undetermined, assuming offline");
          publish(&state, Connectivity::Offline, "timeout");
        }
      }
    }
  }
}

fn publish(state: &watch::Sender<Connectivity>, next: Connectivity, cause: &str) {
  state.send_if_modified(|current| {
    if *current == next {
      return false;
    }
    info!(from = ?*current, to = ?next, cause, "connectivity changed");
    *current = next;
    true
  });
}
