use super::app_config::LogLevel;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "chatkit",
    version,
    about = "Reusable chat-screen components for terminal chat clients",
    long_about = None
)]
pub struct CliArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Enable mouse support.
    #[arg(long)]
    pub mouse: Option<bool>,

    /// Accent color (name or hex code).
    #[arg(long)]
    pub accent_color: Option<String>,

    /// Conversation title shown in the navigation chrome.
    #[arg(long)]
    pub title: Option<String>,

    /// Presence line shown under the title (e.g. "online").
    #[arg(long)]
    pub status: Option<String>,

    /// Avatar image URL for the conversation partner.
    #[arg(long)]
    pub cover_url: Option<String>,

    /// Show image previews for attachments.
    #[arg(long)]
    pub image_preview: Option<bool>,
}
