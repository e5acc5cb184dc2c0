// Query Context - deadline and cooperative cancellation for one query

use std::time::Duration;

use tokio::sync::watch;

/// Creates a linked cancellation pair.
///
/// The source side requests cancellation; the token side is handed to a
/// query and observed by the runner. Tokens are cheap to clone and all
/// clones observe the same source.
pub fn cancel_channel() -> (CancelSource, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelSource { tx }, CancelToken { rx })
}

/// Requests cancellation of the queries holding a matching token.
#[derive(Debug)]
pub struct CancelSource {
    tx: watch::Sender<bool>,
}

impl CancelSource {
    /// Signals cancellation. Idempotent.
    pub fn cancel(&self) {
        // Ignore send errors: all tokens gone means nobody to notify.
        let _ = self.tx.send(true);
    }

    /// Mints another token linked to this source.
    pub fn token(&self) -> CancelToken {
        CancelToken {
            rx: self.tx.subscribe(),
        }
    }
}

/// Observer side of a cancellation pair.
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    /// True once the source has cancelled.
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves when the source cancels.
    ///
    /// A source dropped without cancelling can never cancel anymore, so
    /// this future then stays pending forever rather than resolving.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Per-query execution bounds: an optional deadline and an optional
/// cancellation token. The default context is unbounded.
#[derive(Debug, Clone, Default)]
pub struct QueryContext {
    timeout: Option<Duration>,
    token: Option<CancelToken>,
}

impl QueryContext {
    /// Context with no deadline and no cancellation token.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Context bounded by a deadline relative to query start.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::default().and_timeout(timeout)
    }

    /// Context observing a cancellation token.
    pub fn with_token(token: CancelToken) -> Self {
        Self::default().and_token(token)
    }

    pub fn and_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn and_token(mut self, token: CancelToken) -> Self {
        self.token = Some(token);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn token(&self) -> Option<&CancelToken> {
        self.token.as_ref()
    }
}
