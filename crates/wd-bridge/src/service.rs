use std::future::Future;
use std::sync::Arc;

use action_locator::{
    ElementRef, ElementResolver, LocatorEngine, LocatorError, ScrollFinder, ScrollSpec,
    SearchTarget,
};
use droidlocate_core_types::SessionId;
use serde_json::Value;
use tracing::{debug, warn, Instrument};
use ui_snapshot::{GestureBridge, UiSnapshot, UiTreeSource};

use crate::errors::{BridgeError, BridgeResult};
use crate::mapping::{self, describe_groups};
use crate::model::{element_value, ExecuteRequest, FindElementRequest, WireResponse};
use crate::policy::BridgePolicyHandle;
use crate::state::{ElementModel, ElementStore};
use crate::trace::BridgeTracer;

pub const MOBILE_FIND_SCRIPT: &str = "mobile: find";

/// Entry point for element commands. Every command returns a
/// [`WireResponse`]; failures are classified here and never escape raw.
pub struct LocatorService {
    source: Arc<dyn UiTreeSource>,
    gestures: Arc<dyn GestureBridge>,
    policy: BridgePolicyHandle,
    store: Arc<ElementStore>,
    tracer: BridgeTracer,
}

impl LocatorService {
    pub fn new(
        source: Arc<dyn UiTreeSource>,
        gestures: Arc<dyn GestureBridge>,
        policy: BridgePolicyHandle,
    ) -> Self {
        Self {
            source,
            gestures,
            policy,
            store: Arc::new(ElementStore::new()),
            tracer: BridgeTracer,
        }
    }

    pub fn policy(&self) -> &BridgePolicyHandle {
        &self.policy
    }

    pub fn store(&self) -> &ElementStore {
        &self.store
    }

    pub async fn find_element(&self, session: &SessionId, req: &FindElementRequest) -> WireResponse {
        self.respond("find_element", session, self.find(session, req, None, false))
            .await
    }

    pub async fn find_elements(
        &self,
        session: &SessionId,
        req: &FindElementRequest,
    ) -> WireResponse {
        self.respond("find_elements", session, self.find(session, req, None, true))
            .await
    }

    pub async fn find_element_from_element(
        &self,
        session: &SessionId,
        element_id: &str,
        req: &FindElementRequest,
    ) -> WireResponse {
        self.respond(
            "find_element_from_element",
            session,
            self.find(session, req, Some(element_id), false),
        )
        .await
    }

    pub async fn find_elements_from_element(
        &self,
        session: &SessionId,
        element_id: &str,
        req: &FindElementRequest,
    ) -> WireResponse {
        self.respond(
            "find_elements_from_element",
            session,
            self.find(session, req, Some(element_id), true),
        )
        .await
    }

    pub async fn mobile_find(&self, session: &SessionId, args: &Value) -> WireResponse {
        self.respond("mobile_find", session, self.scroll_find(session, args))
            .await
    }

    /// `execute` entry; only `mobile: find` is routed, anything else is an
    /// unknown command.
    pub async fn execute(&self, session: &SessionId, req: &ExecuteRequest) -> WireResponse {
        let script = req.script.trim();
        if script == MOBILE_FIND_SCRIPT {
            return self.mobile_find(session, &req.args).await;
        }
        let err = BridgeError::UnknownCommand(script.to_string());
        self.respond("execute", session, async move { Err(err) }).await
    }

    pub async fn element_text(&self, session: &SessionId, element_id: &str) -> WireResponse {
        let result = self
            .element_entry(session, element_id)
            .map(|entry| Value::String(entry.text));
        self.respond("element_text", session, async move { result })
            .await
    }

    pub async fn element_attribute(
        &self,
        session: &SessionId,
        element_id: &str,
        name: &str,
    ) -> WireResponse {
        let result = self.element_entry(session, element_id).and_then(|entry| {
            entry
                .attribute(attribute_alias(name))
                .map(|value| Value::String(value.to_string()))
                .ok_or_else(|| BridgeError::InvalidArgument(format!("unknown attribute '{name}'")))
        });
        self.respond("element_attribute", session, async move { result })
            .await
    }

    async fn respond(
        &self,
        command: &str,
        session: &SessionId,
        work: impl Future<Output = BridgeResult<Value>>,
    ) -> WireResponse {
        let span = self.tracer.span(command, session);
        match work.instrument(span.clone()).await {
            Ok(value) => {
                span.in_scope(|| debug!("command succeeded"));
                WireResponse::success(value)
            }
            Err(err) => {
                let failure = err.failure();
                span.in_scope(|| {
                    warn!(status = failure.status, code = err.code(), error = %err, "command failed")
                });
                err.into_response()
            }
        }
    }

    async fn find(
        &self,
        session: &SessionId,
        req: &FindElementRequest,
        scope: Option<&str>,
        plural: bool,
    ) -> BridgeResult<Value> {
        if req.value.trim().is_empty() {
            return Err(LocatorError::invalid_selector(format!(
                "selector for '{}' must not be empty",
                req.using
            ))
            .into());
        }

        let policy = self.policy.snapshot();
        let mut locator = mapping::to_locator(req, policy.platform)?;
        if let Some(element_id) = scope {
            locator = locator.within(self.element_entry(session, element_id)?.element);
        }

        let snapshot = self.snapshot(session).await?;
        let engine = LocatorEngine::new(policy.platform);
        let set = engine.find(&snapshot, &locator, plural)?;

        let handles = set
            .refs()
            .map(|element| self.allocate(session, element, &req.using, &req.value, &snapshot))
            .collect::<BridgeResult<Vec<_>>>()?;
        if plural {
            return Ok(Value::Array(
                handles.iter().map(|handle| element_value(handle)).collect(),
            ));
        }
        match handles.first() {
            Some(handle) => Ok(element_value(handle)),
            None => Err(LocatorError::NotFound {
                strategy: locator.strategy.name().to_string(),
                selector: locator.selector,
            }
            .into()),
        }
    }

    async fn scroll_find(&self, session: &SessionId, args: &Value) -> BridgeResult<Value> {
        let policy = self.policy.snapshot();
        let request = mapping::decode_mobile_find(args)?;
        let selector = describe_groups(&request.groups);
        let engine = LocatorEngine::new(policy.platform);

        let (element, snapshot) = match request.scroll {
            Some(direction) => {
                let finder = ScrollFinder::new(
                    self.source.clone(),
                    self.gestures.clone(),
                    Arc::new(engine),
                )
                .with_policy(policy.scroll.clone());
                let spec = ScrollSpec {
                    direction,
                    container: None,
                };
                let outcome = finder
                    .find_with_scroll(session, &SearchTarget::AnyOf(request.groups), &spec)
                    .await?;
                // Allocate against the matched hierarchy; the device may have
                // re-laid out since.
                (outcome.element, outcome.snapshot)
            }
            None => {
                let snapshot = self.snapshot(session).await?;
                let element = engine
                    .find_any(&snapshot, &request.groups, None)?
                    .first()
                    .ok_or_else(|| LocatorError::NotFound {
                        strategy: MOBILE_FIND_SCRIPT.to_string(),
                        selector: selector.clone(),
                    })?;
                (element, snapshot)
            }
        };

        let handle = self.allocate(session, element, MOBILE_FIND_SCRIPT, &selector, &snapshot)?;
        Ok(element_value(&handle))
    }

    async fn snapshot(&self, session: &SessionId) -> Result<Arc<UiSnapshot>, LocatorError> {
        Ok(self.source.snapshot(session).await?)
    }

    fn allocate(
        &self,
        session: &SessionId,
        element: ElementRef,
        using: &str,
        value: &str,
        snapshot: &UiSnapshot,
    ) -> BridgeResult<String> {
        let node = snapshot
            .node(element.node)
            .filter(|_| snapshot.generation() == element.generation)
            .ok_or(LocatorError::StaleElement {
                held: element.generation,
                current: snapshot.generation(),
            })?;
        let model = ElementModel::capture(session.clone(), element, using, value, node);
        Ok(self.store.allocate_element(model))
    }

    fn element_entry(&self, session: &SessionId, element_id: &str) -> BridgeResult<ElementModel> {
        self.store
            .element_entry(session, element_id)
            .ok_or_else(|| BridgeError::UnknownHandle(element_id.to_string()))
    }
}

/// Accept the spellings clients use for captured attributes
fn attribute_alias(name: &str) -> &str {
    match name {
        "content-desc" | "contentDescription" => "contentDescription",
        "resource-id" | "resourceId" => "resourceId",
        "class" | "className" => "className",
        "tag" | "tagName" => "tagName",
        "package" | "packageName" => "packageName",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::BridgePolicy;
    use action_locator::ScrollPolicy;
    use async_trait::async_trait;
    use droidlocate_core_types::{Platform, SnapshotGeneration};
    use parking_lot::Mutex;
    use serde_json::json;
    use std::sync::atomic::{AtomicU64, Ordering};
    use ui_snapshot::{NodeSpec, ScrollGesture, SnapshotError, SnapshotReel};

    fn page(labels: &[&str]) -> NodeSpec {
        NodeSpec::new("android.widget.FrameLayout").child(
            NodeSpec::new("android.widget.ListView")
                .id("android:id/list")
                .scrollable()
                .children(labels.iter().map(|label| {
                    NodeSpec::new("android.widget.TextView")
                        .id("android:id/text1")
                        .text(*label)
                        .desc(*label)
                })),
        )
    }

    fn service_with(frames: Vec<NodeSpec>) -> (LocatorService, Arc<SnapshotReel>) {
        let reel = Arc::new(SnapshotReel::new(frames).unwrap());
        let service = LocatorService::new(
            reel.clone(),
            reel.clone(),
            BridgePolicyHandle::new(BridgePolicy::default()),
        );
        (service, reel)
    }

    fn service() -> LocatorService {
        service_with(vec![
            page(&["Accessibility", "Animation", "App"]),
            page(&["Content", "Graphics", "Views"]),
        ])
        .0
    }

    #[tokio::test]
    async fn find_element_allocates_id() {
        let service = service();
        let session = SessionId::new();
        let response = service
            .find_element(&session, &FindElementRequest::new("name", "App"))
            .await;
        assert_eq!(response.status, 0);
        assert_eq!(response.element(), Some("element-1"));

        let text = service.element_text(&session, "element-1").await;
        assert_eq!(text.value, json!("App"));
    }

    #[tokio::test]
    async fn find_elements_returns_array() {
        let service = service();
        let response = service
            .find_elements(&SessionId::new(), &FindElementRequest::new("tag name", "text"))
            .await;
        assert_eq!(response.elements().len(), 3);

        let none = service
            .find_elements(&SessionId::new(), &FindElementRequest::new("name", "Nope"))
            .await;
        assert_eq!(none.status, 0);
        assert_eq!(none.value, json!([]));
    }

    #[tokio::test]
    async fn missing_element_is_status_seven() {
        let response = service()
            .find_element(&SessionId::new(), &FindElementRequest::new("name", "Nope"))
            .await;
        assert_eq!(response.status, 7);
    }

    #[tokio::test]
    async fn empty_selector_is_status_thirty_two() {
        for using in ["id", "xpath", "-ios uiautomation", "no such strategy"] {
            let response = service()
                .find_elements(&SessionId::new(), &FindElementRequest::new(using, " "))
                .await;
            assert_eq!(response.status, 32, "{using}");
            assert!(response.message().unwrap().contains("selector"));
        }
    }

    #[tokio::test]
    async fn scoped_find_stays_in_subtree() {
        let service = service();
        let session = SessionId::new();
        let list = service
            .find_element(&session, &FindElementRequest::new("id", "android:id/list"))
            .await;
        let handle = list.element().unwrap().to_string();
        let inside = service
            .find_elements_from_element(&session, &handle, &FindElementRequest::new("id", "text1"))
            .await;
        assert_eq!(inside.elements().len(), 3);

        let unknown = service
            .find_element_from_element(&session, "element-99", &FindElementRequest::new("id", "text1"))
            .await;
        assert_eq!(unknown.status, 7);
    }

    #[tokio::test]
    async fn handle_from_before_a_scroll_is_stale() {
        let service = service();
        let session = SessionId::new();
        let list = service
            .find_element(&session, &FindElementRequest::new("id", "android:id/list"))
            .await;
        let handle = list.element().unwrap().to_string();

        let moved = service
            .mobile_find(&session, &json!([["scroll", [[1, "Views"]]]]))
            .await;
        assert_eq!(moved.status, 0);

        let stale = service
            .find_elements_from_element(&session, &handle, &FindElementRequest::new("id", "text1"))
            .await;
        assert_eq!(stale.status, 10);
    }

    #[tokio::test]
    async fn mobile_find_without_scroll_searches_once() {
        let (service, reel) = service_with(vec![page(&["App"]), page(&["Views"])]);
        let session = SessionId::new();
        let response = service
            .mobile_find(&session, &json!([[[[1, "Views"]], [[5, "App"]]]]))
            .await;
        assert_eq!(response.status, 0);
        let handle = response.element().unwrap();
        let text = service.element_text(&session, handle).await;
        assert_eq!(text.value, json!("App"));
        assert_eq!(reel.gesture_count(), 0);
    }

    #[tokio::test]
    async fn mobile_find_exhaustion_is_status_seven() {
        let (service, _) = service_with(vec![page(&["App"]), page(&["Views"])]);
        service.policy().update(BridgePolicy {
            platform: Platform::Android,
            scroll: ScrollPolicy::default().with_max_attempts(1),
        });
        let response = service
            .mobile_find(&SessionId::new(), &json!([["scroll", [[3, "nothing"]]]]))
            .await;
        assert_eq!(response.status, 7);
        assert!(response.message().unwrap().contains("1 scroll attempt"));
    }

    #[tokio::test]
    async fn unknown_script_is_status_nine() {
        let response = service()
            .execute(
                &SessionId::new(),
                &ExecuteRequest {
                    script: "mobile: shake".into(),
                    args: json!([]),
                },
            )
            .await;
        assert_eq!(response.status, 9);

        let routed = service()
            .execute(
                &SessionId::new(),
                &ExecuteRequest {
                    script: "mobile: find".into(),
                    args: json!([[[[2, "Acc"]]]]),
                },
            )
            .await;
        assert_eq!(routed.status, 0);
    }

    #[tokio::test]
    async fn element_attribute_returns_value() {
        let service = service();
        let session = SessionId::new();
        let found = service
            .find_element(&session, &FindElementRequest::new("accessibility id", "Animation"))
            .await;
        let handle = found.element().unwrap();

        let id = service.element_attribute(&session, handle, "resource-id").await;
        assert_eq!(id.value, json!("android:id/text1"));

        let unknown = service.element_attribute(&session, handle, "colour").await;
        assert_eq!(unknown.status, 13);

        let other_session = service
            .element_text(&SessionId::from("someone-else"), handle)
            .await;
        assert_eq!(other_session.status, 7);
    }

    /// Device whose every capture is a new generation, as when the layout
    /// keeps settling after a swipe.
    struct SettlingDevice {
        frames: Vec<NodeSpec>,
        position: Mutex<usize>,
        captures: AtomicU64,
    }

    #[async_trait]
    impl UiTreeSource for SettlingDevice {
        async fn snapshot(&self, _session: &SessionId) -> Result<Arc<UiSnapshot>, SnapshotError> {
            let generation = SnapshotGeneration(self.captures.fetch_add(1, Ordering::SeqCst) + 1);
            let frame = &self.frames[*self.position.lock()];
            Ok(Arc::new(UiSnapshot::from_spec(frame, generation)?))
        }
    }

    #[async_trait]
    impl GestureBridge for SettlingDevice {
        async fn scroll(
            &self,
            _session: &SessionId,
            _gesture: &ScrollGesture,
        ) -> Result<(), SnapshotError> {
            let mut position = self.position.lock();
            *position = (*position + 1).min(self.frames.len() - 1);
            Ok(())
        }
    }

    #[tokio::test]
    async fn scroll_find_allocates_against_the_matched_hierarchy() {
        let device = Arc::new(SettlingDevice {
            frames: vec![page(&["App"]), page(&["Views"])],
            position: Mutex::new(0),
            captures: AtomicU64::new(0),
        });
        let service = LocatorService::new(
            device.clone(),
            device.clone(),
            BridgePolicyHandle::new(BridgePolicy::default()),
        );
        let session = SessionId::new();

        let response = service
            .mobile_find(&session, &json!([["scroll", [[1, "Views"]]]]))
            .await;
        assert_eq!(response.status, 0, "{:?}", response.value);

        let handle = response.element().unwrap();
        let entry = service.store().element_entry(&session, handle).unwrap();
        assert_eq!(entry.element.generation, SnapshotGeneration(2));
        assert_eq!(entry.text, "Views");
    }
}
