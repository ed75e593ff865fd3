pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "readlater")]
#[command(about = "Read a feed and save articles for later, even offline", long_about = None)]
pub struct Cli {
    /// Path to the database (default: data directory)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Path to the config file (default: ~/.config/readlater/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in to the bookmarking service
    Login {
        username: String,
        #[arg(short, long)]
        password: String,
    },
    /// Sign out and forget the stored credentials
    Logout,
    /// Show who is signed in and how many bookmarks are pending
    Status,
    /// Save a URL
    Save {
        url: String,
        #[arg(short, long, default_value = "")]
        title: String,
        /// Quoted text to attach to the bookmark
        #[arg(short, long, default_value = "")]
        selection: String,
    },
    /// List the articles of a feed
    Articles {
        /// Feed URL (default: the configured feed)
        #[arg(long)]
        feed: Option<String>,
    },
    /// Save the n-th article of a feed, as numbered by `articles`
    Pick {
        index: usize,
        #[arg(long)]
        feed: Option<String>,
        #[arg(short, long, default_value = "")]
        selection: String,
    },
    /// List bookmarks waiting to be sent
    Pending,
    /// Try to send pending bookmarks now
    Retry,
    /// Drop all pending bookmarks
    Clear,
}
