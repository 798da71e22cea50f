pub mod errors;
pub mod mapping;
pub mod model;
pub mod policy;
pub mod service;
pub mod state;
pub mod trace;

pub use errors::{BridgeError, BridgeResult};
pub use model::{ExecuteRequest, FindElementRequest, WireResponse, ELEMENT_KEY};
pub use policy::{BridgePolicy, BridgePolicyHandle};
pub use service::{LocatorService, MOBILE_FIND_SCRIPT};
pub use state::{ElementModel, ElementStore};
