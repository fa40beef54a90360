use crate::{scene::SceneDescriptor, Color, SceneAdapter};

/// A frame handed to whatever presents the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderedFrame {
    pub index: u64,
    pub background: Color,
}

/// In-memory rendering backend. It keeps the scene description, the current
/// background and whether a frame has been requested; redraw requests
/// coalesce until the next [`RenderGraph::draw`].
#[derive(Debug)]
pub struct RenderGraph {
    scene: SceneDescriptor,
    background: Color,
    redraw_pending: bool,
    frames_drawn: u64,
}

impl Default for RenderGraph {
    fn default() -> Self {
        Self::new(SceneDescriptor::default())
    }
}

impl RenderGraph {
    pub fn new(scene: SceneDescriptor) -> Self {
        Self {
            background: scene.clear_color,
            scene,
            redraw_pending: true,
            frames_drawn: 0,
        }
    }

    pub fn scene(&self) -> &SceneDescriptor {
        &self.scene
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn redraw_pending(&self) -> bool {
        self.redraw_pending
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    /// Produces a frame if one was requested since the last draw.
    pub fn draw(&mut self) -> Option<RenderedFrame> {
        if !self.redraw_pending {
            return None;
        }
        self.redraw_pending = false;
        self.frames_drawn += 1;

        Some(RenderedFrame {
            index: self.frames_drawn,
            background: self.background,
        })
    }
}

impl SceneAdapter for RenderGraph {
    fn apply_background(&mut self, color: Color) {
        self.background = color;
    }

    fn request_redraw(&mut self) {
        self.redraw_pending = true;
    }
}
