// Scene session - Behavior lifecycle and the per-frame host tick
use crate::application::behaviors::{attach, Behavior, BehaviorKind};
use crate::application::binding_context::BindingContext;
use crate::application::fetch_scheduler::TickOutcome;
use crate::application::scene_graph::SceneGraph;
use crate::domain::error::ConfigurationError;
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub struct SceneSession {
    context: BindingContext,
    scene: Arc<dyn SceneGraph>,
    behaviors: Vec<Box<dyn Behavior>>,
    playing: bool,
}

impl SceneSession {
    pub fn new(context: BindingContext, scene: Arc<dyn SceneGraph>) -> Self {
        Self {
            context,
            scene,
            behaviors: Vec::new(),
            playing: false,
        }
    }

    /// Attach a behavior to the node at `path`.
    pub fn attach(&mut self, path: &str, kind: BehaviorKind) -> Result<(), ConfigurationError> {
        let mut built = None;
        self.scene.with_node(path, &mut |node| {
            built = Some(attach(kind, node));
        });

        let behavior = match built {
            Some(result) => result?,
            None => return Err(ConfigurationError::MissingNode(path.to_string())),
        };

        tracing::info!(node = %path, kind = ?kind, binding = %behavior.binding(), "Attached behavior");
        let mut behavior = behavior;
        if self.playing {
            behavior.on_play(&self.context);
        }
        self.behaviors.push(behavior);
        Ok(())
    }

    pub fn play(&mut self) {
        if self.playing {
            return;
        }
        self.playing = true;
        self.context.start_data_fetching();
        for behavior in &mut self.behaviors {
            behavior.on_play(&self.context);
        }
        tracing::info!(behaviors = self.behaviors.len(), "Scene playing");
    }

    pub fn stop(&mut self) {
        if !self.playing {
            return;
        }
        self.playing = false;
        for behavior in &mut self.behaviors {
            let context = &self.context;
            let path = behavior.node_path().to_string();
            if !self.scene.with_node(&path, &mut |node| behavior.on_stop(context, node)) {
                tracing::warn!(node = %path, "Node disappeared before stop");
            }
        }
        self.context.stop_data_fetching();
        tracing::info!("Scene stopped");
    }

    /// One host frame: give the scheduler a chance to start a cycle, then let
    /// every behavior read the cache. Never waits on the network.
    pub fn tick(&mut self, now: DateTime<Utc>) -> TickOutcome {
        let outcome = self.context.on_tick(now);
        if !self.playing {
            return outcome;
        }

        for behavior in &mut self.behaviors {
            let context = &self.context;
            let path = behavior.node_path().to_string();
            self.scene
                .with_node(&path, &mut |node| behavior.on_update(context, node));
        }
        outcome
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn behavior_count(&self) -> usize {
        self.behaviors.len()
    }

    pub fn context(&self) -> &BindingContext {
        &self.context
    }
}

impl Drop for SceneSession {
    fn drop(&mut self) {
        for behavior in &mut self.behaviors {
            behavior.on_destroy(&self.context);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::binding_registry::SubscriptionMode;
    use crate::application::fetch_scheduler::SchedulerSettings;
    use crate::application::remote_value_client::testing::FakeRemoteClient;
    use crate::application::scene_graph::SceneNode;
    use crate::domain::binding::{DataBinding, Value, ValueKind};
    use crate::domain::scene::{
        AttributeValue, ENTITY_ATTR, COMPONENT_ATTR, DATA_MAX_ATTR, DATA_MIN_ATTR, PROPERTY_ATTR, SCALE_ATTR,
    };
    use crate::infrastructure::scene_store::{MemoryNode, SceneStore};
    use chrono::TimeZone;

    fn t(millis: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_000 + millis).unwrap()
    }

    fn tank_level() -> DataBinding {
        DataBinding::new("Tank_1", "LevelSensor", "Level")
    }

    fn session() -> (Arc<FakeRemoteClient>, Arc<SceneStore>, SceneSession) {
        let client = Arc::new(FakeRemoteClient::new().with_kind(&tank_level(), ValueKind::Double));
        let scene = Arc::new(SceneStore::new());
        scene.insert(
            MemoryNode::new("/World/Tank")
                .with(ENTITY_ATTR, AttributeValue::Text("Tank_1".into()))
                .with(COMPONENT_ATTR, AttributeValue::Text("LevelSensor".into()))
                .with(PROPERTY_ATTR, AttributeValue::Text("Level".into()))
                .with(DATA_MIN_ATTR, AttributeValue::Float(0.0))
                .with(DATA_MAX_ATTR, AttributeValue::Float(100.0)),
        );
        let context = BindingContext::new(client.clone(), SubscriptionMode::RefCounted, SchedulerSettings::default());
        let session = SceneSession::new(context, scene.clone());
        (client, scene, session)
    }

    #[test]
    fn test_attach_missing_node_fails() {
        let (_, _, mut session) = session();
        assert_eq!(
            session.attach("/World/Nowhere", BehaviorKind::Scaler),
            Err(ConfigurationError::MissingNode("/World/Nowhere".to_string()))
        );
        assert_eq!(session.behavior_count(), 0);
    }

    #[tokio::test]
    async fn test_frames_drive_scale_from_fetched_values() {
        let (client, scene, mut session) = session();
        session.attach("/World/Tank", BehaviorKind::Scaler).unwrap();

        assert!(matches!(session.tick(t(0)), TickOutcome::Disabled));
        session.play();
        assert!(session.context().registry().is_active(&tank_level()));

        client.set_value(&tank_level(), Value::Number(25.0));
        match session.tick(t(0)) {
            TickOutcome::Started(handle) => {
                handle.await.unwrap();
            }
            other => panic!("expected a started cycle, got {:?}", other),
        }
        assert!(matches!(session.tick(t(16)), TickOutcome::NotDue));

        let scale = scene.node("/World/Tank").unwrap().attribute(SCALE_ATTR);
        assert_eq!(scale, Some(AttributeValue::Vec3([1.0, 1.0, 0.25])));

        session.stop();
        assert!(!session.context().registry().is_active(&tank_level()));
        assert!(!session.context().scheduler().is_running());
        let scale = scene.node("/World/Tank").unwrap().attribute(SCALE_ATTR);
        assert_eq!(scale, Some(AttributeValue::Vec3([1.0, 1.0, 1.0])));
    }
}
