//! skill-invidious - command-line harness
//!
//! Runs the skill outside a voice-assistant host: resolve instances, search
//! for a phrase and print the entries the host would receive.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use skill_common::config::{resolve_settings_path, SkillSettings, SETTINGS_ENV_VAR};
use skill_common::{MediaItem, MediaType};
use skill_invidious::services::LivenessProbe;
use skill_invidious::{InvidiousSkill, SkillProfile};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for skill-invidious
#[derive(Parser, Debug)]
#[command(name = "skill-invidious")]
#[command(about = "Search Invidious instances the way the voice skill does")]
#[command(version)]
struct Args {
    /// Settings file (TOML or JSON)
    #[arg(short, long, env = SETTINGS_ENV_VAR)]
    config: Option<PathBuf>,

    /// Skill variant: video or music
    #[arg(short, long, default_value = "video")]
    profile: SkillProfile,

    /// Log level when RUST_LOG is unset (overrides the settings file)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search for a phrase
    Search {
        phrase: String,

        /// Requested media type (generic, music, video, audio, ...)
        #[arg(short, long, default_value = "generic")]
        media_type: MediaType,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Resolve the instance pool and probe every instance
    Instances,
    /// Show details of one video
    Info { video_id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let settings_path = resolve_settings_path(args.config.as_deref(), SETTINGS_ENV_VAR);
    let settings = SkillSettings::load_or_default(settings_path.as_deref())
        .context("Failed to load settings")?;

    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| settings.logging.level.clone());
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting {} v{}", args.profile, env!("CARGO_PKG_VERSION"));

    let skill_id = format!("{}.cli", args.profile.name());
    let mut skill = InvidiousSkill::new(skill_id, args.profile, settings)
        .context("Failed to initialize skill")?;

    match args.command {
        Command::Search {
            phrase,
            media_type,
            json,
        } => {
            let items = skill.search(&phrase, media_type).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else if items.is_empty() {
                println!("No results");
            } else {
                for item in &items {
                    print_item(item);
                }
            }
        }
        Command::Instances => {
            let pool = skill.refresh_instances().await.clone();
            for (position, instance) in pool.instances().iter().enumerate() {
                let alive = skill.client().is_alive(instance).await;
                println!(
                    "{:>2}  {:<5}  {}",
                    position,
                    if alive { "up" } else { "down" },
                    instance
                );
            }
        }
        Command::Info { video_id } => {
            let endpoint = skill
                .current_instance()
                .await
                .context("No Invidious instances available")?;
            match skill.client().video_details(&endpoint, &video_id).await {
                Some(video) => {
                    println!("{}", video.title);
                    println!("  author:    {}", video.author);
                    println!("  length:    {}s", video.length_seconds);
                    println!("  views:     {}", video.view_count);
                    if let Some(published) = video.published_at() {
                        println!("  published: {}", published.format("%Y-%m-%d"));
                    }
                    println!("  uri:       {}", video.watch_url);
                }
                None => println!("Video {} not found on {}", video_id, endpoint),
            }
        }
    }

    Ok(())
}

fn print_item(item: &MediaItem) {
    match item {
        MediaItem::Entry(entry) => {
            println!(
                "{:>3}  {} - {}  ({}s)  {}",
                entry.match_confidence,
                entry.artist,
                entry.title,
                entry.length_ms / 1000,
                entry.uri
            );
        }
        MediaItem::Playlist(playlist) => {
            println!(
                "{:>3}  [playlist] {} ({} videos)",
                playlist.match_confidence,
                playlist.title,
                playlist.entries.len()
            );
            for entry in &playlist.entries {
                println!("       {:>3}  {}  {}", entry.match_confidence, entry.title, entry.uri);
            }
        }
    }
}
