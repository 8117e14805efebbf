//! Scene management system
//!
//! Scene content (entities, lights, prefab hierarchies) and the per-frame
//! front end of the renderer that turns it into ordered render calls.
//!
//! ## Architecture
//!
//! ```text
//! Scene (entities, lights, camera)
//!      ↓
//! RenderCallCollector (traversal + frustum culling)
//!      ↓
//! RenderQueue (draw ordering)
//!      ↓
//! Renderer (shadow, forward or deferred passes)
//! ```

pub mod collector;
pub mod entity;
pub mod light;
pub mod render_queue;
pub mod scene_graph;
pub mod scene_renderer;
pub mod world;

pub use collector::{CollectionStats, RenderCallCollector};
pub use entity::{
    Entity, EntityCommon, EntityDescription, EntityKind, MenuUi, PrefabEntity, TextMenu,
};
pub use light::{LightEntity, LightType};
pub use render_queue::{draw_order, RenderCall, RenderQueue};
pub use scene_graph::{Frustum, Plane, Prefab, PrefabLibrary, SceneNode, AABB};
pub use scene_renderer::{FrameStats, Renderer};
pub use world::Scene;
