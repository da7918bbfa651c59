//! The Manim engine boundary: child-process invocation, output capture,
//! timeout, cancellation, and output-file discovery.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tokio::sync::watch;

use easel_core::{EaselError, EaselResult, EngineConfig, RenderPhase};

use crate::artifact::ArtifactKind;

/// Drives `python -m manim` (or a configured substitute) for one
/// invocation at a time.
pub struct ManimEngine {
    config: EngineConfig,
}

impl ManimEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Check whether the engine can be launched at all.
    pub async fn is_available(&self) -> bool {
        Command::new(&self.config.program)
            .args(&self.config.module_args)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    fn command(
        &self,
        script_path: &Path,
        scene_class: &str,
        kind: ArtifactKind,
        media_dir: &Path,
    ) -> Command {
        let mut cmd = Command::new(&self.config.program);
        cmd.args(&self.config.module_args);
        cmd.arg(script_path);
        cmd.arg(scene_class);
        cmd.arg(self.config.quality.flag());
        if kind == ArtifactKind::PreviewImage {
            // Save the last frame as a still image instead of a video.
            cmd.arg("-s");
        }
        cmd.arg("--media_dir");
        cmd.arg(media_dir);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);
        cmd
    }

    /// Run the engine against an already-written script and return the
    /// path of the produced output file.
    ///
    /// Returns only after the child process has fully exited, whatever the
    /// outcome, so the caller may delete the script file afterwards. The
    /// engine's stderr is captured in full and carried verbatim inside any
    /// failure.
    pub async fn run(
        &self,
        script_path: &Path,
        scene_class: &str,
        kind: ArtifactKind,
        media_dir: &Path,
        cancel: watch::Receiver<bool>,
    ) -> EaselResult<PathBuf> {
        let mut cmd = self.command(script_path, scene_class, kind, media_dir);
        tracing::info!(script = %script_path.display(), kind = %kind, "starting engine");

        let mut child = cmd.spawn().map_err(|e| {
            EaselError::render_failed(
                RenderPhase::Engine,
                None,
                format!("failed to start {}: {}", self.config.program, e),
            )
        })?;

        let stderr_task = drain(child.stderr.take());
        let stdout_task = drain(child.stdout.take());

        enum Outcome {
            Exited(std::process::ExitStatus),
            TimedOut,
            Cancelled,
        }

        let timeout = Duration::from_secs(self.config.timeout_secs);
        let outcome = tokio::select! {
            waited = tokio::time::timeout(timeout, child.wait()) => match waited {
                Ok(Ok(status)) => Outcome::Exited(status),
                Ok(Err(e)) => {
                    return Err(EaselError::render_failed(
                        RenderPhase::Engine,
                        None,
                        format!("failed waiting for engine: {}", e),
                    ))
                }
                Err(_) => Outcome::TimedOut,
            },
            _ = cancelled(cancel) => Outcome::Cancelled,
        };

        match outcome {
            Outcome::TimedOut | Outcome::Cancelled => {
                kill_and_reap(&mut child).await;
                let stderr = stderr_task.await.unwrap_or_default();
                let phase = if matches!(outcome, Outcome::TimedOut) {
                    RenderPhase::Timeout
                } else {
                    RenderPhase::Cancelled
                };
                tracing::warn!(kind = %kind, %phase, "engine run aborted");
                Err(EaselError::render_failed(
                    phase,
                    None,
                    match phase {
                        RenderPhase::Timeout => format!(
                            "engine exceeded {}s time budget. Partial stderr: {}",
                            self.config.timeout_secs, stderr
                        ),
                        _ => format!("render cancelled. Partial stderr: {}", stderr),
                    },
                ))
            }
            Outcome::Exited(status) => {
                let stderr = stderr_task.await.unwrap_or_default();
                let stdout = stdout_task.await.unwrap_or_default();
                tracing::debug!(kind = %kind, ?status, stdout_len = stdout.len(), "engine exited");

                if !status.success() {
                    return Err(EaselError::render_failed(
                        RenderPhase::Engine,
                        status.code(),
                        stderr,
                    ));
                }

                self.find_output(script_path, scene_class, kind, media_dir)
                    .ok_or_else(|| {
                        EaselError::render_failed(
                            RenderPhase::CollectOutput,
                            status.code(),
                            format!(
                                "engine exited successfully but no {} output was found under {}. Stderr: {}",
                                kind,
                                media_dir.display(),
                                stderr
                            ),
                        )
                    })
            }
        }
    }

    /// Locate the engine's output file. Manim nests output under the media
    /// directory: still frames under `images/<script stem>/`, videos under
    /// `videos/<script stem>/<quality>/<SceneClass>.mp4`.
    fn find_output(
        &self,
        script_path: &Path,
        scene_class: &str,
        kind: ArtifactKind,
        media_dir: &Path,
    ) -> Option<PathBuf> {
        let stem = script_path.file_stem()?.to_str()?;
        match kind {
            ArtifactKind::PreviewImage => {
                let dir = media_dir.join("images").join(stem);
                newest_match(&dir, |name| {
                    name.starts_with(scene_class) && name.ends_with(".png")
                })
            }
            ArtifactKind::Video => {
                let target = format!("{}.mp4", scene_class);
                let dir = media_dir.join("videos").join(stem);
                for entry in std::fs::read_dir(&dir).ok()?.flatten() {
                    let candidate = entry.path().join(&target);
                    if candidate.is_file() {
                        return Some(candidate);
                    }
                }
                None
            }
        }
    }
}

/// Read a child pipe to the end without blocking the exit wait.
fn drain<R>(pipe: Option<R>) -> tokio::task::JoinHandle<String>
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf).await;
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}

/// Kill the child and wait until it is fully gone.
async fn kill_and_reap(child: &mut Child) {
    if let Err(e) = child.kill().await {
        tracing::warn!(error = %e, "failed to kill engine process");
    }
    let _ = child.wait().await;
}

/// Resolves when cancellation is requested. Never resolves if the sender
/// goes away without cancelling.
async fn cancelled(mut rx: watch::Receiver<bool>) {
    if *rx.borrow() {
        return;
    }
    while rx.changed().await.is_ok() {
        if *rx.borrow() {
            return;
        }
    }
    std::future::pending::<()>().await;
}

/// Newest regular file in `dir` whose name satisfies `matches`.
fn newest_match(dir: &Path, matches: impl Fn(&str) -> bool) -> Option<PathBuf> {
    let mut candidates: Vec<PathBuf> = std::fs::read_dir(dir)
        .ok()?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map(&matches)
                    .unwrap_or(false)
        })
        .collect();
    candidates.sort();
    candidates.pop()
}
