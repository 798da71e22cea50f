//! Resolution and scroll search against the ApiDemos fixture frames.

use std::path::PathBuf;
use std::sync::Arc;

use action_locator::{
    classify, ElementResolver, ExhaustReason, Locator, LocatorEngine, LocatorError,
    LocatorStrategy, ScrollFinder, ScrollSpec, SearchTarget, SelectorCode, SelectorGroup,
    STATUS_NO_SUCH_ELEMENT,
};
use droidlocate_core_types::{Platform, SessionId};
use ui_snapshot::{NodeSpec, SnapshotReel, UiSnapshot, UiTreeSource};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../fixtures/apidemos")
        .join(name)
}

fn reel() -> Arc<SnapshotReel> {
    Arc::new(SnapshotReel::load(&[fixture("page0.json"), fixture("page1.json")]).unwrap())
}

async fn first_page() -> Arc<UiSnapshot> {
    reel().snapshot(&SessionId::new()).await.unwrap()
}

fn engine() -> LocatorEngine {
    LocatorEngine::new(Platform::Android)
}

fn text_of(snapshot: &UiSnapshot, locator: &Locator) -> String {
    let found = engine().find_one(snapshot, locator).unwrap();
    snapshot.get(found.node).logical_text().to_string()
}

#[tokio::test]
async fn singular_lookup_returns_one_element() {
    let snapshot = first_page().await;
    assert_eq!(text_of(&snapshot, &Locator::name("Animation")), "Animation");
    assert_eq!(
        text_of(&snapshot, &Locator::accessibility_id("Animation")),
        "Animation"
    );
    assert_eq!(
        text_of(&snapshot, &Locator::class_name("android.widget.TextView")),
        "API Demos"
    );
}

#[tokio::test]
async fn singular_lookup_without_match_is_not_found() {
    let snapshot = first_page().await;
    let err = engine()
        .find_one(&snapshot, &Locator::name("Nonexistent"))
        .unwrap_err();
    assert!(matches!(err, LocatorError::NotFound { .. }));
    assert_eq!(classify(&err).status, STATUS_NO_SUCH_ELEMENT);
}

#[tokio::test]
async fn plural_lookup_without_match_is_empty() {
    let snapshot = first_page().await;
    let set = engine()
        .find_all(&snapshot, &Locator::tag_name("checkbox"))
        .unwrap();
    assert!(set.is_empty());
}

#[tokio::test]
async fn empty_selectors_are_invalid_for_every_strategy() {
    let snapshot = first_page().await;
    for strategy in LocatorStrategy::all() {
        for plural in [false, true] {
            let err = engine()
                .find(&snapshot, &Locator::new(strategy, ""), plural)
                .unwrap_err();
            assert!(
                matches!(err, LocatorError::InvalidSelector(_)),
                "{strategy} plural={plural}: {err}"
            );
            assert!(err.to_string().contains("selector"));
        }
    }
}

#[tokio::test]
async fn ios_script_strategy_is_refused_whatever_the_selector() {
    let snapshot = first_page().await;
    for selector in ["Animation", "UIATarget.localTarget()", "//text"] {
        for plural in [false, true] {
            let locator = Locator::new(LocatorStrategy::IosUiAutomation, selector);
            let err = engine().find(&snapshot, &locator, plural).unwrap_err();
            let failure = classify(&err);
            assert_eq!(failure.status, 9);
            assert!(failure
                .message
                .contains("The requested resource could not be found"));
        }
    }
}

#[tokio::test]
async fn secure_fields_are_not_supported() {
    let snapshot = first_page().await;
    let err = engine()
        .find_all(&snapshot, &Locator::tag_name("secure"))
        .unwrap_err();
    assert!(classify(&err).message.contains("not supported"));
}

#[tokio::test]
async fn text_nodes_come_back_in_document_order() {
    let snapshot = first_page().await;
    let set = engine().find_all(&snapshot, &Locator::tag_name("text")).unwrap();
    assert!(set.len() >= 10);
    let labels: Vec<_> = set
        .refs()
        .map(|r| snapshot.get(r.node).logical_text().to_string())
        .collect();
    assert_eq!(&labels[..4], ["API Demos", "Accessibility", "Animation", "App"]);
    let mut sorted = set.nodes.clone();
    sorted.sort();
    assert_eq!(sorted, set.nodes);
}

#[tokio::test]
async fn xpath_last_is_the_match_count() {
    let snapshot = first_page().await;
    let all = engine().find_all(&snapshot, &Locator::tag_name("text")).unwrap();
    let last = engine()
        .find_one(&snapshot, &Locator::xpath("//text[last()]"))
        .unwrap();
    assert_eq!(Some(&last.node), all.nodes.last());

    let nth = format!("//text[{}]", all.len());
    let same = engine().find_one(&snapshot, &Locator::xpath(nth)).unwrap();
    assert_eq!(same, last);
}

#[tokio::test]
async fn xpath_attribute_and_positional_paths() {
    let snapshot = first_page().await;
    assert_eq!(text_of(&snapshot, &Locator::xpath("//text[@value='App']")), "App");
    assert_eq!(
        text_of(&snapshot, &Locator::xpath("//frame[1]/frame[1]/list[1]/text[3]")),
        "App"
    );
    assert_eq!(
        text_of(&snapshot, &Locator::xpath("//list/text[contains(@text, 'ccess')]")),
        "Accessibility"
    );
    let items = engine()
        .find_all(&snapshot, &Locator::xpath("//frame/frame/list/text"))
        .unwrap();
    assert_eq!(items.len(), 10);

    let err = engine()
        .find_all(&snapshot, &Locator::xpath("//text[@value='App'"))
        .unwrap_err();
    assert!(matches!(err, LocatorError::InvalidSelector(_)));
}

#[tokio::test]
async fn resource_ids_accept_the_short_form() {
    let snapshot = first_page().await;
    let full = engine()
        .find_all(&snapshot, &Locator::id("android:id/text1"))
        .unwrap();
    let short = engine().find_all(&snapshot, &Locator::id("text1")).unwrap();
    assert_eq!(full.len(), 10);
    assert_eq!(full, short);
    assert_eq!(
        text_of(&snapshot, &Locator::id("action_bar_title")),
        "API Demos"
    );
}

#[tokio::test]
async fn scoped_results_stay_inside_the_scope() {
    let snapshot = first_page().await;
    let list = engine()
        .find_one(&snapshot, &Locator::id("android:id/list"))
        .unwrap();

    for locator in [
        Locator::tag_name("text").within(list),
        Locator::class_name("android.widget.TextView").within(list),
        Locator::xpath("//text").within(list),
    ] {
        let set = engine().find_all(&snapshot, &locator).unwrap();
        assert_eq!(set.len(), 10, "{locator}");
        assert!(set.refs().all(|r| snapshot.is_within(r.node, list.node)));
    }

    let title = engine()
        .find_all(&snapshot, &Locator::name("API Demos").within(list))
        .unwrap();
    assert!(title.is_empty());
}

#[tokio::test]
async fn scroll_search_reaches_the_second_page() {
    let reel = reel();
    let finder = ScrollFinder::new(reel.clone(), reel.clone(), Arc::new(engine()));
    let session = SessionId::new();

    let target = SearchTarget::AnyOf(vec![SelectorGroup::single(
        SelectorCode::TextEquals,
        "Views",
    )]);
    let outcome = finder
        .find_with_scroll(&session, &target, &ScrollSpec::default())
        .await
        .unwrap();
    assert_eq!(outcome.attempts, 1);
    assert_eq!(outcome.snapshot.generation(), outcome.element.generation);

    let snapshot = reel.snapshot(&session).await.unwrap();
    assert_eq!(snapshot.generation(), outcome.element.generation);
    assert_eq!(snapshot.get(outcome.element.node).text, "Views");
}

#[tokio::test]
async fn scroll_search_stops_at_the_end_of_the_list() {
    let reel = reel();
    let finder = ScrollFinder::new(reel.clone(), reel.clone(), Arc::new(engine()));
    let target = SearchTarget::Locator(Locator::name("Nonexistent"));
    let spec = ScrollSpec {
        container: Some(Locator::id("android:id/list")),
        ..ScrollSpec::default()
    };
    let err = finder
        .find_with_scroll(&SessionId::new(), &target, &spec)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        LocatorError::ScrollExhausted {
            attempts: 2,
            reason: ExhaustReason::RegionUnchanged
        }
    );
    assert_eq!(classify(&err).status, STATUS_NO_SUCH_ELEMENT);
}

fn list_page(labels: &[&str]) -> NodeSpec {
    NodeSpec::new("android.widget.FrameLayout").child(
        NodeSpec::new("android.widget.ListView")
            .id("android:id/list")
            .scrollable()
            .children(
                labels
                    .iter()
                    .map(|label| NodeSpec::new("android.widget.TextView").text(*label)),
            ),
    )
}

#[tokio::test]
async fn target_two_pages_down_takes_exactly_two_scrolls() {
    let reel = Arc::new(
        SnapshotReel::new(vec![
            list_page(&["one", "two"]),
            list_page(&["three", "four"]),
            list_page(&["five", "target"]),
            list_page(&["seven", "eight"]),
        ])
        .unwrap(),
    );
    let finder = ScrollFinder::new(reel.clone(), reel.clone(), Arc::new(engine()));
    let target = SearchTarget::AnyOf(vec![
        SelectorGroup::single(SelectorCode::DescriptionEquals, "target"),
        SelectorGroup::single(SelectorCode::TextEquals, "target"),
    ]);
    let outcome = finder
        .find_with_scroll(&SessionId::new(), &target, &ScrollSpec::default())
        .await
        .unwrap();
    assert_eq!(outcome.attempts, 2);
    assert_eq!(reel.gesture_count(), 2);
}
