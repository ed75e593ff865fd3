//! Bookmark service client.
//!
//! One [`BookmarkClient`] owns the session and the pending queue of a single
//! account. Every public operation runs under the same async mutex, so two
//! concurrent submissions never interleave their queue updates.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::timeout;
use url::Url;

use crate::app::{AuthError, Result, SubmitError};
use crate::domain::{Credentials, PendingSubmission, Session};
use crate::queue::SubmissionQueue;
use crate::store::KeyValueStore;
use crate::transport::{Params, Reachability, Transport, TransportError};

pub const USERNAME_KEY: &str = "username";
pub const PASSWORD_KEY: &str = "password";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Remote endpoints of the bookmarking service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub authenticate: Url,
    pub add: Url,
}

impl Endpoints {
    pub fn new(base: &Url, authenticate_path: &str, add_path: &str) -> Result<Self> {
        Ok(Self {
            authenticate: base.join(authenticate_path)?,
            add: base.join(add_path)?,
        })
    }
}

struct ClientState {
    session: Session,
    queue: SubmissionQueue,
}

pub struct BookmarkClient {
    endpoints: Endpoints,
    transport: Arc<dyn Transport + Send + Sync>,
    reachability: Arc<dyn Reachability + Send + Sync>,
    credentials: Arc<dyn KeyValueStore + Send + Sync>,
    request_timeout: Duration,
    state: Mutex<ClientState>,
}

impl BookmarkClient {
    /// Build a client, resuming the session if the credential store still
    /// holds a username and password from an earlier run.
    pub fn new(
        endpoints: Endpoints,
        transport: Arc<dyn Transport + Send + Sync>,
        reachability: Arc<dyn Reachability + Send + Sync>,
        credentials: Arc<dyn KeyValueStore + Send + Sync>,
        queue: SubmissionQueue,
    ) -> Result<Self> {
        let session = match (credentials.get(USERNAME_KEY)?, credentials.get(PASSWORD_KEY)?) {
            (Some(username), Some(secret)) => {
                tracing::debug!("Resuming session for {}", username);
                Session::SignedIn(Credentials::new(username, secret))
            }
            _ => Session::SignedOut,
        };

        Ok(Self {
            endpoints,
            transport,
            reachability,
            credentials,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            state: Mutex::new(ClientState { session, queue }),
        })
    }

    /// Deadline for each request to the service.
    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub async fn is_signed_in(&self) -> bool {
        self.state.lock().await.session.is_signed_in()
    }

    pub async fn username(&self) -> Option<String> {
        let state = self.state.lock().await;
        state.session.credentials().map(|c| c.username.clone())
    }

    pub async fn authenticate(&self, username: &str, password: &str) -> std::result::Result<(), AuthError> {
        let mut state = self.state.lock().await;
        if state.session.is_signed_in() {
            return Err(AuthError::AlreadySignedIn);
        }

        let credentials = Credentials::new(username.trim(), password.trim());
        let params = Params::from([
            ("username".to_string(), credentials.username.clone()),
            ("password".to_string(), credentials.secret.clone()),
        ]);

        let request = self.transport.get(&self.endpoints.authenticate, &params);
        let response = match timeout(self.request_timeout, request).await {
            Ok(Ok(response)) => response,
            Ok(Err(TransportError::TimedOut)) | Err(_) => return Err(AuthError::ConnectionTimedOut),
            Ok(Err(TransportError::Failed(e))) => {
                tracing::debug!("Authentication request failed: {}", e);
                return Err(AuthError::ConnectionFailed);
            }
        };

        match response.status {
            200 => {
                tracing::info!("Signed in as {}", credentials.username);
                state.session = Session::SignedIn(credentials.clone());
                self.save_credentials(&credentials)
            }
            403 => Err(AuthError::InvalidCredentials),
            status => {
                tracing::warn!("Unexpected authentication status {}", status);
                Err(AuthError::ConnectionTimedOut)
            }
        }
    }

    /// Forget the signed-in account. Pending submissions stay queued.
    pub async fn sign_out(&self) -> Result<()> {
        let mut state = self.state.lock().await;

        // The session is only dropped once nothing of it is left on disk.
        self.credentials.remove(PASSWORD_KEY)?;
        if let Err(e) = self.credentials.remove(USERNAME_KEY) {
            if let Some(credentials) = state.session.credentials() {
                if let Err(restore) = self.credentials.set(PASSWORD_KEY, &credentials.secret) {
                    tracing::error!("Could not restore password after failed sign-out: {}", restore);
                }
            }
            return Err(e);
        }

        state.session = Session::SignedOut;
        tracing::info!("Signed out");
        Ok(())
    }

    /// Save `url` to the signed-in account.
    ///
    /// When the service cannot be reached the bookmark is queued and
    /// `ConnectionFailed { queued: true }` is returned. When it can, queued
    /// bookmarks are retried first; a bookmark that was itself queued is sent
    /// once, by that retry.
    pub async fn submit(&self, url: &Url, title: &str, selection: &str) -> std::result::Result<(), SubmitError> {
        let mut state = self.state.lock().await;
        let Some(credentials) = state.session.credentials().cloned() else {
            return Err(SubmitError::NotSignedIn);
        };
        let item = PendingSubmission::new(url.clone(), title, selection);

        if !self.reachability.is_reachable(&self.endpoints.add).await {
            tracing::info!("Service unreachable, deferring {}", url);
            return Err(defer(&mut state.queue, item));
        }

        let credentials = &credentials;
        let attempts = state
            .queue
            .drain_and_retry(move |pending| self.send(credentials, pending))
            .await;

        // Queued by an earlier call, so the flush already sent it
        if let Some(attempt) = attempts.into_iter().find(|attempt| attempt.item == item) {
            return match attempt.outcome {
                Ok(()) => Ok(()),
                Err(SubmitError::ConnectionFailed { .. }) => Err(SubmitError::ConnectionFailed { queued: true }),
                Err(e) => {
                    if let Err(err) = state.queue.dequeue(&item) {
                        tracing::error!("Could not drop rejected submission {}: {}", item.url, err);
                    }
                    Err(e)
                }
            };
        }

        match self.send(credentials, item.clone()).await {
            Ok(()) => Ok(()),
            Err(SubmitError::ConnectionFailed { .. }) => Err(defer(&mut state.queue, item)),
            Err(e) => Err(e),
        }
    }

    /// Retry the queue without submitting anything new. Returns how many
    /// entries are still pending.
    pub async fn retry_pending(&self) -> std::result::Result<usize, SubmitError> {
        let mut state = self.state.lock().await;
        let Some(credentials) = state.session.credentials().cloned() else {
            return Err(SubmitError::NotSignedIn);
        };

        if !self.reachability.is_reachable(&self.endpoints.add).await {
            return Err(SubmitError::ConnectionFailed { queued: true });
        }

        let credentials = &credentials;
        state
            .queue
            .drain_and_retry(move |pending| self.send(credentials, pending))
            .await;

        Ok(state.queue.len())
    }

    pub async fn pending(&self) -> Result<Vec<PendingSubmission>> {
        let mut state = self.state.lock().await;
        state.queue.load_if_needed()?;
        Ok(state.queue.pending().to_vec())
    }

    pub async fn clear_pending(&self) -> Result<()> {
        self.state.lock().await.queue.clear()
    }

    async fn send(&self, credentials: &Credentials, item: PendingSubmission) -> std::result::Result<(), SubmitError> {
        let params = Params::from([
            ("username".to_string(), credentials.username.clone()),
            ("password".to_string(), credentials.secret.clone()),
            ("url".to_string(), item.url.to_string()),
            ("title".to_string(), item.title),
            ("selection".to_string(), item.selection),
        ]);

        let request = self.transport.post(&self.endpoints.add, &params);
        match timeout(self.request_timeout, request).await {
            Ok(Ok(response)) => match response.status {
                201 => {
                    tracing::info!("Saved {}", item.url);
                    Ok(())
                }
                400 | 403 => Err(SubmitError::InvalidRequest),
                status => {
                    tracing::debug!("Unexpected add status {} for {}", status, item.url);
                    Err(SubmitError::ConnectionFailed { queued: false })
                }
            },
            Ok(Err(e)) => {
                tracing::debug!("Add request for {} failed: {}", item.url, e);
                Err(SubmitError::ConnectionFailed { queued: false })
            }
            Err(_) => {
                tracing::debug!("Add request for {} timed out", item.url);
                Err(SubmitError::ConnectionFailed { queued: false })
            }
        }
    }

    fn save_credentials(&self, credentials: &Credentials) -> std::result::Result<(), AuthError> {
        self.credentials
            .set(USERNAME_KEY, &credentials.username)
            .and_then(|_| self.credentials.set(PASSWORD_KEY, &credentials.secret))
            .map_err(|e| {
                tracing::error!("Failed to save credentials: {}", e);
                AuthError::SavingFailed
            })
    }
}

fn defer(queue: &mut SubmissionQueue, item: PendingSubmission) -> SubmitError {
    match queue.enqueue(item) {
        Ok(_) => SubmitError::ConnectionFailed { queued: true },
        Err(e) => {
            tracing::error!("Could not save submission for later: {}", e);
            SubmitError::ConnectionFailed { queued: false }
        }
    }
}
