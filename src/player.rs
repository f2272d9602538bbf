use anyhow::{Context, Result, anyhow};
use std::process::Stdio;
use tokio::process::{Child, Command};
use tracing::{info, warn};

use crate::video::Video;

/// Plays a video's stream in an external mpv window.
#[derive(Default)]
pub struct VideoPlayer {
  current_process: Option<Child>,
  /// Source URL of the stream being played.
  pub source: Option<String>,
}

fn mpv_args(video: &Video) -> Vec<String> {
  vec![
    "--force-window=immediate".to_string(),
    "--really-quiet".to_string(),
    format!("--title={}", video.title),
    "--".to_string(),
    video.streaming_url.clone(),
  ]
}

impl VideoPlayer {
  pub fn is_playing(&self) -> bool {
    self.current_process.is_some()
  }

  /// Forget the child once the user closes the mpv window.
  pub fn reap(&mut self) {
    if let Some(child) = &mut self.current_process
      && let Ok(Some(status)) = child.try_wait()
    {
      info!(%status, "player exited");
      self.current_process = None;
      self.source = None;
    }
  }

  pub async fn play(&mut self, video: &Video) -> Result<()> {
    if video.streaming_url.is_empty() {
      return Err(anyhow!("'{}' has no stream to play", video.title));
    }
    self.stop().await.context("Failed to stop previous playback")?;

    let child = Command::new("mpv")
      .args(mpv_args(video))
      .stdin(Stdio::null())
      .stdout(Stdio::null())
      .stderr(Stdio::null())
      .kill_on_drop(true)
      .spawn()
      .map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
          anyhow!("mpv not found. Install it with: brew install mpv (macOS) or apt install mpv (Linux)")
        } else {
          anyhow!(e).context("Failed to spawn mpv process")
        }
      })?;

    info!(video_id = %video.video_id, url = %video.streaming_url, "playback started");
    self.current_process = Some(child);
    self.source = Some(video.streaming_url.clone());
    Ok(())
  }

  pub async fn stop(&mut self) -> Result<()> {
    if let Some(mut child) = self.current_process.take() {
      if let Err(e) = child.kill().await {
        warn!(err = %e, "failed to kill mpv");
        return Err(anyhow!(e).context("Failed to kill mpv process"));
      }
      let _ = child.wait().await;
    }
    self.source = None;
    Ok(())
  }
}
