use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use easel_core::{
    AnimationKind, EaselError, EaselResult, EngineConfig, ObjectKind, RenderPhase,
};
use easel_render::{ArtifactKind, CancelHandle, RenderArtifact, RenderOrchestrator};
use easel_scene::{ObjectId, PropertyValue, SceneObject, SceneSnapshot, SceneStore};

/// Notification published to session subscribers.
#[derive(Debug, Clone, Serialize)]
pub enum SessionEvent {
    /// The scene was mutated; `version` identifies the new state.
    SceneChanged { version: u64 },
    RenderStarted { kind: ArtifactKind },
    RenderSucceeded { artifact: RenderArtifact },
    /// A render finished unsuccessfully. `message` carries the full error
    /// text, including any engine stderr, verbatim.
    RenderFailed { kind: ArtifactKind, message: String },
}

/// Handle to a render request issued through the session.
#[derive(Debug)]
pub struct RenderTicket {
    id: String,
    kind: ArtifactKind,
    cancel: CancelHandle,
    handle: JoinHandle<EaselResult<RenderArtifact>>,
}

impl RenderTicket {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    /// Cancel the underlying render.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the render outcome. The same outcome is also broadcast as
    /// a [`SessionEvent`].
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

/// One editing session over one scene.
///
/// All mutating commands lock the store for their whole duration, so
/// mutations are sequential and atomic; renders run on the runtime against
/// a snapshot taken at request time and never touch live state.
pub struct Session {
    store: Mutex<SceneStore>,
    orchestrator: RenderOrchestrator,
    events: broadcast::Sender<SessionEvent>,
}

impl Session {
    /// Create a session with an empty scene.
    pub fn new(config: EngineConfig) -> EaselResult<Self> {
        let (events, _) = broadcast::channel(64);
        Ok(Self {
            store: Mutex::new(SceneStore::new()),
            orchestrator: RenderOrchestrator::new(config)?,
            events,
        })
    }

    /// Subscribe to session notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Whether the rendering engine can be launched at all.
    pub async fn engine_available(&self) -> bool {
        self.orchestrator.engine().is_available().await
    }

    // --- Scene commands ---

    /// Add a new object of the named type; returns its id.
    pub fn add_object(&self, type_name: &str) -> EaselResult<ObjectId> {
        let kind: ObjectKind = type_name.parse()?;
        let (id, version) = {
            let mut store = self.store.lock();
            let id = store.create_object(kind);
            (id, store.version())
        };
        self.scene_changed(version);
        Ok(id)
    }

    /// Set one property of one object.
    pub fn set_property(
        &self,
        id: &ObjectId,
        name: &str,
        value: PropertyValue,
    ) -> EaselResult<()> {
        let version = {
            let mut store = self.store.lock();
            store.update_property(id, name, value)?;
            store.version()
        };
        self.scene_changed(version);
        Ok(())
    }

    /// Assign the named entry animation to an object.
    pub fn set_animation(&self, id: &ObjectId, animation: &str) -> EaselResult<()> {
        let animation: AnimationKind = animation.parse()?;
        let version = {
            let mut store = self.store.lock();
            store.set_animation(id, animation)?;
            store.version()
        };
        self.scene_changed(version);
        Ok(())
    }

    /// Remove an object from the scene.
    pub fn remove_object(&self, id: &ObjectId) -> EaselResult<()> {
        let version = {
            let mut store = self.store.lock();
            store.remove_object(id)?;
            store.version()
        };
        self.scene_changed(version);
        Ok(())
    }

    /// Move an object to a new position in the scene order.
    pub fn move_object(&self, id: &ObjectId, new_index: usize) -> EaselResult<()> {
        let version = {
            let mut store = self.store.lock();
            store.move_object(id, new_index)?;
            store.version()
        };
        self.scene_changed(version);
        Ok(())
    }

    /// A copy of one object's current state.
    pub fn object(&self, id: &ObjectId) -> EaselResult<SceneObject> {
        self.store.lock().get_object(id).cloned()
    }

    /// Copies of all objects in scene order.
    pub fn objects(&self) -> Vec<SceneObject> {
        self.store.lock().objects().to_vec()
    }

    /// An immutable snapshot of the current scene.
    pub fn snapshot(&self) -> SceneSnapshot {
        self.store.lock().snapshot()
    }

    // --- Render commands ---

    /// Render a still preview of the current scene.
    pub fn request_preview(&self) -> EaselResult<RenderTicket> {
        self.request(ArtifactKind::PreviewImage)
    }

    /// Render the current scene to video.
    pub fn request_render(&self) -> EaselResult<RenderTicket> {
        self.request(ArtifactKind::Video)
    }

    fn request(&self, kind: ArtifactKind) -> EaselResult<RenderTicket> {
        let snapshot = self.snapshot();
        let job = self.orchestrator.submit(snapshot, kind)?;
        let id = job.id().to_string();
        let cancel = job.cancel_handle();

        let _ = self.events.send(SessionEvent::RenderStarted { kind });
        tracing::info!(job = %id, kind = %kind, "render requested");

        let events = self.events.clone();
        let handle = tokio::spawn(async move {
            match job.wait().await {
                Ok(artifact) => {
                    let _ = events.send(SessionEvent::RenderSucceeded {
                        artifact: artifact.clone(),
                    });
                    Ok(artifact)
                }
                Err(error) => {
                    let _ = events.send(SessionEvent::RenderFailed {
                        kind,
                        message: error.to_string(),
                    });
                    Err(error)
                }
            }
        });

        Ok(RenderTicket {
            id,
            kind,
            cancel,
            handle,
        })
    }

    fn scene_changed(&self, version: u64) {
        let _ = self.events.send(SessionEvent::SceneChanged { version });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_session() -> Session {
        let media = std::env::temp_dir().join(format!(
            "easel_session_unit_{}",
            uuid::Uuid::new_v4().simple()
        ));
        std::fs::create_dir_all(&media).unwrap();
        Session::new(
            EngineConfig::default()
                .with_media_dir(media)
                .with_timeout_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_add_object_emits_scene_changed() {
        let session = test_session();
        let mut rx = session.subscribe();

        let id = session.add_object("Circle").unwrap();
        assert!(id.as_str().starts_with("circle_"));

        match rx.recv().await.unwrap() {
            SessionEvent::SceneChanged { version } => assert_eq!(version, 1),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_type_is_rejected() {
        let session = test_session();
        let err = session.add_object("Triangle").unwrap_err();
        assert!(matches!(err, EaselError::UnknownType { .. }));
        assert!(session.objects().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_animation_name_is_rejected() {
        let session = test_session();
        let id = session.add_object("Circle").unwrap();
        let err = session.set_animation(&id, "SpinWildly").unwrap_err();
        assert!(matches!(err, EaselError::UnknownAnimation { .. }));
    }

    #[tokio::test]
    async fn test_failed_command_emits_no_event() {
        let session = test_session();
        let id = session.add_object("Square").unwrap();
        let mut rx = session.subscribe();

        let err = session
            .set_property(&id, "opacity", PropertyValue::number(2.0))
            .unwrap_err();
        assert!(matches!(err, EaselError::InvalidPropertyValue { .. }));
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn test_object_lookup_misses_fail() {
        let session = test_session();
        let missing = ObjectId::new("text_ffffff");
        assert!(matches!(
            session.object(&missing).unwrap_err(),
            EaselError::ObjectNotFound { .. }
        ));
        assert!(matches!(
            session.remove_object(&missing).unwrap_err(),
            EaselError::ObjectNotFound { .. }
        ));
    }
}
