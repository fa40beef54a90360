use std::sync::mpsc::Receiver;

use serde::{Deserialize, Serialize};

use crate::{Color, PlaybackEvent};

/// Consumer side of the day cycle. Implementations own the actual scene,
/// camera and draw loop; the core only ever pushes into them.
pub trait SceneAdapter {
    /// Replaces the scene background.
    fn apply_background(&mut self, color: Color);

    /// Asks for another frame. Calling it again before the frame is drawn
    /// must not queue a second one.
    fn request_redraw(&mut self);
}

/// Applies every pending event to `adapter` without blocking and returns the
/// number of events handled.
pub fn pump_events<A: SceneAdapter + ?Sized>(
    events: &Receiver<PlaybackEvent>,
    adapter: &mut A,
) -> usize {
    let mut handled = 0;
    for event in events.try_iter() {
        match event {
            PlaybackEvent::PositionChanged(sample) => {
                adapter.apply_background(sample.color);
                adapter.request_redraw();
            }
            PlaybackEvent::StateChanged { active } => {
                tracing::debug!(active, "transport state changed");
            }
        }
        handled += 1;
    }
    handled
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraDescriptor {
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitSettings {
    pub damping: bool,
    pub pan: bool,
    pub zoom: bool,
    pub auto_rotate: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshDescriptor {
    /// Edge length of the cube.
    pub size: f32,
    pub color: Color,
    /// Color of the bounding box outline drawn around the mesh.
    pub outline: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionalLight {
    pub color: Color,
    pub intensity: f32,
    pub position: [f32; 3],
    pub cast_shadow: bool,
}

impl DirectionalLight {
    fn white(position: [f32; 3]) -> Self {
        Self {
            color: Color::new(255, 255, 255),
            intensity: 0.8,
            position,
            cast_shadow: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundPlane {
    pub size: f32,
    pub elevation: f32,
    pub color: Color,
    pub receive_shadow: bool,
}

/// Static description of the scene the day cycle is drawn over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDescriptor {
    pub name: String,
    pub camera: CameraDescriptor,
    pub orbit: OrbitSettings,
    /// Background shown before the first daylight sample arrives.
    pub clear_color: Color,
    pub mesh: MeshDescriptor,
    pub lights: Vec<DirectionalLight>,
    pub ground: Option<GroundPlane>,
}

impl Default for SceneDescriptor {
    fn default() -> Self {
        Self::day_cycle_demo()
    }
}

impl SceneDescriptor {
    /// A lit cube under a fixed orbit camera.
    pub fn day_cycle_demo() -> Self {
        Self {
            name: "Day Cycle".to_string(),
            camera: CameraDescriptor {
                fov_degrees: 75.0,
                aspect: 2.0,
                near: 0.1,
                far: 1000.0,
                position: [100.0, 200.0, 300.0],
            },
            orbit: OrbitSettings {
                damping: true,
                pan: false,
                zoom: false,
                auto_rotate: false,
            },
            clear_color: Color::new(100, 50, 0),
            mesh: MeshDescriptor {
                size: 100.0,
                color: Color::new(0x00, 0xff, 0xf0),
                outline: Color::new(153, 50, 204),
            },
            lights: vec![
                DirectionalLight::white([0.0, 10.0, 0.0]),
                DirectionalLight::white([10.0, 4.0, 10.0]),
            ],
            ground: None,
        }
    }

    pub fn with_ground(mut self) -> Self {
        self.ground = Some(GroundPlane {
            size: 10_000.0,
            elevation: -100.0,
            color: Color::new(0x12, 0x45, 0x45),
            receive_shadow: true,
        });
        self
    }

    /// Adds a third light behind the mesh.
    pub fn with_back_light(mut self) -> Self {
        self.lights.push(DirectionalLight::white([-5.0, 4.0, -5.0]));
        self
    }

    pub fn shadow_casters(&self) -> usize {
        self.lights.iter().filter(|light| light.cast_shadow).count()
    }
}
