//! The render orchestrator: one state machine per render request, unique
//! temporary script paths, single-flight per artifact kind, and cleanup
//! that never races the engine process.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use uuid::Uuid;

use easel_core::{EaselError, EaselResult, EngineConfig, RenderPhase};
use easel_scene::SceneSnapshot;
use easel_script::Compiler;

use crate::artifact::{ArtifactKind, RenderArtifact};
use crate::engine::ManimEngine;

/// Lifecycle of a single render request. `Succeeded` and `Failed` are
/// terminal; a new request always starts a fresh machine at `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderState {
    Idle,
    Compiling,
    ScriptWritten,
    EngineRunning,
    Succeeded,
    Failed,
}

impl std::fmt::Display for RenderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RenderState::Idle => "idle",
            RenderState::Compiling => "compiling",
            RenderState::ScriptWritten => "script-written",
            RenderState::EngineRunning => "engine-running",
            RenderState::Succeeded => "succeeded",
            RenderState::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Cloneable handle that cancels one render request.
#[derive(Clone, Debug)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

/// Handle to one in-flight render request.
#[derive(Debug)]
pub struct RenderJob {
    id: String,
    kind: ArtifactKind,
    state: Arc<Mutex<RenderState>>,
    cancel: CancelHandle,
    handle: JoinHandle<EaselResult<RenderArtifact>>,
}

impl RenderJob {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    /// Current position in the request's state machine.
    pub fn state(&self) -> RenderState {
        *self.state.lock()
    }

    /// Request cancellation. The job finishes in `Failed` with a
    /// `cancelled` phase; it never transitions to `Succeeded` afterwards.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A cloneable cancellation handle that outlives this job handle.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Wait for the request to reach a terminal state.
    pub async fn wait(self) -> EaselResult<RenderArtifact> {
        self.handle.await.map_err(|e| {
            EaselError::render_failed(
                RenderPhase::Engine,
                None,
                format!("render task aborted: {}", e),
            )
        })?
    }
}

struct Inner {
    engine: ManimEngine,
    /// Unique per-orchestrator directory for temporary scripts.
    script_dir: PathBuf,
    /// Artifact kinds with a render currently in flight.
    inflight: Mutex<HashSet<ArtifactKind>>,
}

/// Runs render requests against the engine.
///
/// Policy (documented, not configurable): at most one render per artifact
/// kind is in flight; a second request of the same kind is rejected with
/// `RenderBusy` rather than queued. A preview and a video may run
/// concurrently — every request gets its own script path and its own
/// media output directory, so concurrent requests never share files.
#[derive(Clone)]
pub struct RenderOrchestrator {
    inner: Arc<Inner>,
}

impl RenderOrchestrator {
    /// Create an orchestrator with its own temporary script directory.
    pub fn new(config: EngineConfig) -> EaselResult<Self> {
        let script_dir =
            std::env::temp_dir().join(format!("easel_scripts_{}", Uuid::new_v4().simple()));
        std::fs::create_dir_all(&script_dir)?;
        tracing::debug!(dir = %script_dir.display(), "created script directory");
        Ok(Self {
            inner: Arc::new(Inner {
                engine: ManimEngine::new(config),
                script_dir,
                inflight: Mutex::new(HashSet::new()),
            }),
        })
    }

    pub fn engine(&self) -> &ManimEngine {
        &self.inner.engine
    }

    /// Start a render of `snapshot` as `kind`.
    ///
    /// Returns `RenderBusy` if a render of the same kind is already in
    /// flight; otherwise spawns the request and returns its job handle
    /// immediately.
    pub fn submit(&self, snapshot: SceneSnapshot, kind: ArtifactKind) -> EaselResult<RenderJob> {
        {
            let mut inflight = self.inner.inflight.lock();
            if !inflight.insert(kind) {
                tracing::debug!(kind = %kind, "render rejected: already in flight");
                return Err(EaselError::RenderBusy {
                    kind: kind.label().to_string(),
                });
            }
        }

        let id = Uuid::new_v4().simple().to_string();
        let state = Arc::new(Mutex::new(RenderState::Idle));
        let (cancel_tx, cancel_rx) = watch::channel(false);

        let inner = self.inner.clone();
        let job_id = id.clone();
        let job_state = state.clone();
        let handle = tokio::spawn(async move {
            let result = run_request(&inner, &job_id, &job_state, snapshot, kind, cancel_rx).await;
            inner.inflight.lock().remove(&kind);
            match &result {
                Ok(artifact) => {
                    *job_state.lock() = RenderState::Succeeded;
                    tracing::info!(job = %job_id, kind = %kind, path = %artifact.path.display(), "render succeeded");
                }
                Err(error) => {
                    *job_state.lock() = RenderState::Failed;
                    tracing::warn!(job = %job_id, kind = %kind, %error, "render failed");
                }
            }
            result
        });

        Ok(RenderJob {
            id,
            kind,
            state,
            cancel: CancelHandle {
                tx: Arc::new(cancel_tx),
            },
            handle,
        })
    }
}

async fn run_request(
    inner: &Inner,
    job_id: &str,
    state: &Mutex<RenderState>,
    snapshot: SceneSnapshot,
    kind: ArtifactKind,
    cancel: watch::Receiver<bool>,
) -> EaselResult<RenderArtifact> {
    *state.lock() = RenderState::Compiling;
    let script = Compiler::compile(&snapshot, kind.script_mode())?;

    // Fresh, uniquely named locations for this request only.
    let script_path = inner.script_dir.join(format!("scene_{}.py", job_id));
    let media_dir = inner.engine.config().media_dir.join(job_id);

    tokio::fs::write(&script_path, &script.source)
        .await
        .map_err(|e| {
            EaselError::render_failed(
                RenderPhase::WriteScript,
                None,
                format!("failed to write {}: {}", script_path.display(), e),
            )
        })?;
    *state.lock() = RenderState::ScriptWritten;

    tokio::fs::create_dir_all(&media_dir).await.map_err(|e| {
        EaselError::render_failed(
            RenderPhase::WriteScript,
            None,
            format!("failed to create {}: {}", media_dir.display(), e),
        )
    })?;

    *state.lock() = RenderState::EngineRunning;
    let outcome = inner
        .engine
        .run(&script_path, script.scene_class, kind, &media_dir, cancel)
        .await;

    // The engine has fully exited here, so the script file can no longer
    // be in use. Produced artifacts are left alone.
    if let Err(e) = tokio::fs::remove_file(&script_path).await {
        tracing::warn!(script = %script_path.display(), error = %e, "failed to remove script");
    }

    let output = outcome?;
    Ok(RenderArtifact {
        id: job_id.to_string(),
        kind,
        path: output,
        script_hash: script.hash,
        created_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_core::ObjectKind;
    use easel_scene::SceneStore;
    use std::path::Path;

    fn sh_config(command: &str, tag: &str, timeout_secs: u64) -> EngineConfig {
        let media = std::env::temp_dir().join(format!(
            "easel_orch_test_{}_{}",
            tag,
            Uuid::new_v4().simple()
        ));
        std::fs::create_dir_all(&media).unwrap();
        EngineConfig {
            program: "/bin/sh".to_string(),
            module_args: vec!["-c".to_string(), command.to_string()],
            quality: Default::default(),
            media_dir: media,
            timeout_secs,
        }
    }

    fn one_circle() -> SceneSnapshot {
        let mut store = SceneStore::new();
        store.create_object(ObjectKind::Circle);
        store.snapshot()
    }

    // Writes the video output exactly where the engine discovery expects it.
    const FAKE_VIDEO_OK: &str =
        r#"stem=$(basename "$0" .py); mkdir -p "$4/videos/$stem/480p15"; : > "$4/videos/$stem/480p15/$1.mp4""#;

    #[tokio::test]
    async fn test_successful_video_render() {
        let orchestrator = RenderOrchestrator::new(sh_config(FAKE_VIDEO_OK, "ok", 30)).unwrap();
        let snapshot = one_circle();
        let compiled = Compiler::compile(&snapshot, easel_script::ScriptMode::Render).unwrap();

        let job = orchestrator.submit(snapshot, ArtifactKind::Video).unwrap();
        let artifact = job.wait().await.unwrap();

        assert_eq!(artifact.kind, ArtifactKind::Video);
        assert!(artifact.path.is_file());
        assert_eq!(artifact.script_hash, compiled.hash);
    }

    #[tokio::test]
    async fn test_script_removed_after_completion() {
        let orchestrator = RenderOrchestrator::new(sh_config(FAKE_VIDEO_OK, "cleanup", 30)).unwrap();
        let job = orchestrator.submit(one_circle(), ArtifactKind::Video).unwrap();
        let script_path = orchestrator
            .inner
            .script_dir
            .join(format!("scene_{}.py", job.id()));

        let artifact = job.wait().await.unwrap();
        assert!(!script_path.exists());
        assert!(artifact.path.is_file());
    }

    #[tokio::test]
    async fn test_same_kind_rejected_while_in_flight() {
        let orchestrator =
            RenderOrchestrator::new(sh_config("sleep 30", "busy", 60)).unwrap();
        let first = orchestrator.submit(one_circle(), ArtifactKind::Video).unwrap();

        let err = orchestrator
            .submit(one_circle(), ArtifactKind::Video)
            .unwrap_err();
        assert!(matches!(err, EaselError::RenderBusy { .. }));

        first.cancel();
        let _ = first.wait().await;

        // The slot frees once the first request is terminal.
        let third = orchestrator.submit(one_circle(), ArtifactKind::Video);
        assert!(third.is_ok());
        if let Ok(job) = third {
            job.cancel();
            let _ = job.wait().await;
        }
    }

    #[tokio::test]
    async fn test_different_kinds_run_concurrently() {
        let orchestrator =
            RenderOrchestrator::new(sh_config("sleep 30", "kinds", 60)).unwrap();
        let video = orchestrator.submit(one_circle(), ArtifactKind::Video).unwrap();
        let preview = orchestrator.submit(one_circle(), ArtifactKind::PreviewImage);
        assert!(preview.is_ok());

        video.cancel();
        let _ = video.wait().await;
        if let Ok(job) = preview {
            job.cancel();
            let _ = job.wait().await;
        }
    }

    #[tokio::test]
    async fn test_failed_render_reaches_failed_state() {
        let orchestrator =
            RenderOrchestrator::new(sh_config("echo nope >&2; exit 1", "fail", 30)).unwrap();
        let job = orchestrator.submit(one_circle(), ArtifactKind::Video).unwrap();
        let err = job.wait().await.unwrap_err();
        match err {
            EaselError::RenderFailed {
                exit_code, stderr, ..
            } => {
                assert_eq!(exit_code, Some(1));
                assert!(stderr.contains("nope"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_cancelled_render_ends_failed_never_succeeded() {
        let orchestrator =
            RenderOrchestrator::new(sh_config("sleep 30", "cancel", 60)).unwrap();
        let job = orchestrator.submit(one_circle(), ArtifactKind::Video).unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        job.cancel();

        // Hold a second handle on the state to observe the terminal value.
        let state = job.state.clone();
        let err = job.wait().await.unwrap_err();
        assert!(matches!(
            err,
            EaselError::RenderFailed {
                phase: RenderPhase::Cancelled,
                ..
            }
        ));
        assert_eq!(*state.lock(), RenderState::Failed);
    }

    #[tokio::test]
    async fn test_artifacts_survive_later_renders() {
        let orchestrator =
            RenderOrchestrator::new(sh_config(FAKE_VIDEO_OK, "survive", 30)).unwrap();
        let first = orchestrator
            .submit(one_circle(), ArtifactKind::Video)
            .unwrap()
            .wait()
            .await
            .unwrap();
        let second = orchestrator
            .submit(one_circle(), ArtifactKind::Video)
            .unwrap()
            .wait()
            .await
            .unwrap();

        assert_ne!(first.path, second.path);
        assert!(Path::new(&first.path).is_file());
        assert!(Path::new(&second.path).is_file());
    }
}
