//! # readlater
//!
//! Reads a syndication feed into a list of articles and saves selected ones
//! to a bookmarking service. Bookmarks that cannot be delivered because the
//! service is unreachable are kept in a durable queue and retried the next
//! time a submission finds the service online.
//!
//! ## Architecture
//!
//! ```text
//! Fetcher → Parser → (caller picks an article) → BookmarkClient → Transport
//!                                                      ↓ offline
//!                                               SubmissionQueue → Store
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! readlater login alice --password secret
//! readlater articles
//! readlater pick 3
//! readlater pending
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together all components:
/// store, fetcher, parser, bookmark client.
pub mod app;

/// Command-line interface using clap.
pub mod cli;

/// Bookmark service client: authentication, submission, offline queueing.
///
/// - [`BookmarkClient`](client::BookmarkClient): session and queue owner
/// - [`Endpoints`](client::Endpoints): service URLs
pub mod client;

/// Configuration loaded from `~/.config/readlater/config.toml`.
pub mod config;

/// Core domain models.
///
/// - [`Article`](domain::Article): one feed entry
/// - [`Credentials`](domain::Credentials) and [`Session`](domain::Session)
/// - [`PendingSubmission`](domain::PendingSubmission): a bookmark awaiting retry
pub mod domain;

/// HTTP fetching of raw feed documents.
pub mod fetcher;

/// Streaming feed parser.
///
/// - [`FeedDialect`](parser::FeedDialect): entry/title/link element names
/// - [`ArticleBuilder`](parser::ArticleBuilder): event-driven record assembly
/// - [`FeedParser`](parser::FeedParser): quick-xml driver
pub mod parser;

/// Durable queue of pending submissions.
pub mod queue;

/// Key-value persistence for credentials and the pending queue.
///
/// - [`KeyValueStore`](store::KeyValueStore): storage trait
/// - [`SqliteStore`](store::SqliteStore): SQLite implementation
pub mod store;

/// Requests to the bookmarking service and reachability probing.
pub mod transport;
