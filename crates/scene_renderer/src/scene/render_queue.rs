//! Render queue for one frame
//!
//! Holds the render calls the collector produced and sorts them into draw
//! order: everything that writes depth first, front to back, then blended
//! geometry back to front.

use std::cmp::Ordering;

use crate::foundation::math::Mat4;
use crate::render::resources::{AlphaMode, MaterialHandle, MeshHandle};

/// Everything needed to draw one mesh once, valid for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderCall {
    /// Object-to-world transform
    pub model: Mat4,
    /// Mesh to draw (shared, not owned)
    pub mesh: MeshHandle,
    /// Material to draw it with (shared, not owned)
    pub material: MaterialHandle,
    /// Alpha mode of the material when the call was collected
    pub alpha_mode: AlphaMode,
    /// Distance from the camera eye to the world bounding-box center
    pub distance_to_camera: f32,
}

impl RenderCall {
    /// Whether the call is drawn with alpha blending
    pub fn is_blended(&self) -> bool {
        self.alpha_mode.is_blended()
    }
}

/// Draw-order comparator
///
/// Two non-blended calls sort front to back, two blended calls back to front,
/// and a blended call always sorts after a non-blended one.
pub fn draw_order(a: &RenderCall, b: &RenderCall) -> Ordering {
    match (a.is_blended(), b.is_blended()) {
        (false, false) => a.distance_to_camera.total_cmp(&b.distance_to_camera),
        (true, true) => b.distance_to_camera.total_cmp(&a.distance_to_camera),
        _ => a.alpha_mode.sort_class().cmp(&b.alpha_mode.sort_class()),
    }
}

/// Per-frame list of render calls
///
/// The list is refilled every frame; its allocation is kept.
#[derive(Debug, Default)]
pub struct RenderQueue {
    calls: Vec<RenderCall>,
}

impl RenderQueue {
    /// Create an empty render queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer to collect into
    pub fn calls_mut(&mut self) -> &mut Vec<RenderCall> {
        &mut self.calls
    }

    /// Calls in their current order
    pub fn calls(&self) -> &[RenderCall] {
        &self.calls
    }

    /// Sort into draw order
    ///
    /// The sort is stable: calls at equal distance keep collection order.
    pub fn sort(&mut self) {
        sort_calls(&mut self.calls);
    }

    /// Number of non-blended calls
    pub fn opaque_count(&self) -> usize {
        self.calls.iter().filter(|call| !call.is_blended()).count()
    }

    /// Number of blended calls
    pub fn transparent_count(&self) -> usize {
        self.calls.iter().filter(|call| call.is_blended()).count()
    }

    /// Total number of calls
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    /// Whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}

/// Sort any list of calls into draw order
pub fn sort_calls(calls: &mut [RenderCall]) {
    calls.sort_by(draw_order);
}
