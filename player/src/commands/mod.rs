use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use lesson_core::{PlayerConfig, VideoInfo, escape_attr, resolve};
use log::{debug, info};
use serde::Serialize;

use crate::Command;

/// Command handler for the CLI
pub struct CommandHandler;

impl CommandHandler {
    /// Run a command, writing its output to `out`. Returns the exit code.
    pub fn execute<W: Write>(command: &Command, config: &PlayerConfig, out: &mut W) -> Result<i32> {
        match command {
            Command::Resolve { urls, json } => resolve_urls(urls, *json, out),
            Command::Embed { url } => {
                embed(url, config, out)?;
                Ok(0)
            }
            Command::Config => {
                serde_json::to_writer_pretty(&mut *out, config)?;
                writeln!(out)?;
                Ok(0)
            }
        }
    }
}

/// One line of `resolve` output
#[derive(Debug, Serialize)]
struct Resolved<'a> {
    url: &'a str,
    #[serde(flatten)]
    info: Option<VideoInfo>,
    embed_url: Option<String>,
}

fn resolve_urls<W: Write>(urls: &[String], json: bool, out: &mut W) -> Result<i32> {
    let resolved: Vec<Resolved> = urls
        .iter()
        .map(|url| {
            let info = resolve(url);
            Resolved {
                url,
                embed_url: info.as_ref().map(VideoInfo::embed_url),
                info,
            }
        })
        .collect();

    let unsupported = resolved.iter().filter(|r| r.info.is_none()).count();
    if unsupported > 0 {
        info!("{} of {} URL(s) match no provider", unsupported, resolved.len());
    }

    if json {
        serde_json::to_writer_pretty(&mut *out, &resolved)?;
        writeln!(out)?;
    } else {
        for entry in &resolved {
            match (&entry.info, &entry.embed_url) {
                (Some(info), Some(embed_url)) => {
                    writeln!(out, "{}\t{}\t{}", info.source, info.id, embed_url)?
                }
                _ => writeln!(out, "unsupported\t{}", entry.url)?,
            }
        }
    }

    Ok(if unsupported > 0 { 1 } else { 0 })
}

fn embed<W: Write>(url: &str, config: &PlayerConfig, out: &mut W) -> Result<()> {
    let info = resolve(url).ok_or_else(|| anyhow!("Unsupported video URL: {}", url))?;
    let container = escape_attr(&config.container_id);

    match info.iframe() {
        Some(frame) => writeln!(out, "<div id=\"{}\">{}</div>", container, frame.to_html())?,
        None => {
            // The provider SDK builds the iframe inside the container
            writeln!(out, "<div id=\"{}\"></div>", container)?;
            if let Some(script) = info.source.script() {
                writeln!(out, "<script src=\"{}\"></script>", script.src)?;
            }
            writeln!(out, "<!-- {} video {} -->", info.source, info.id)?;
        }
    }
    Ok(())
}

/// Load the player config from `path`, or from the user config dir if a
/// file exists there, or fall back to defaults
pub fn load_config(path: Option<&Path>) -> Result<PlayerConfig> {
    if let Some(path) = path {
        return PlayerConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()));
    }

    match default_config_path() {
        Some(path) if path.exists() => {
            debug!("Loading config from {}", path.display());
            PlayerConfig::from_file(&path)
                .with_context(|| format!("Failed to load config from {}", path.display()))
        }
        _ => Ok(PlayerConfig::default()),
    }
}

fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "lesson-player").map(|dirs| dirs.config_dir().join("config.json"))
}
