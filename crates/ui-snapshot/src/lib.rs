pub mod differ;
pub mod errors;
pub mod model;
pub mod ports;
pub mod reel;

pub use differ::region_fingerprint;
pub use errors::SnapshotError;
pub use model::{tag_for_class, Bounds, Node, NodeId, NodeSpec, UiSnapshot};
pub use ports::{GestureBridge, ScrollDirection, ScrollGesture, UiTreeSource};
pub use reel::SnapshotReel;
