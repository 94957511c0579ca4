use strata_world::{ViewProvider, ViewRect};

/// Headless stand-in for a player camera: drifts sideways at a fixed speed.
pub struct PanningCamera {
    pub position: [f32; 2],
    pub size: [f32; 2],
    /// World units per second.
    pub velocity: [f32; 2],
}

impl PanningCamera {
    pub fn new(position: [f32; 2], size: [f32; 2], speed: f32) -> Self {
        Self {
            position,
            size,
            velocity: [speed, 0.0],
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.position[0] += self.velocity[0] * dt;
        self.position[1] += self.velocity[1] * dt;
    }
}

impl ViewProvider for PanningCamera {
    fn current_view_rect(&self) -> ViewRect {
        ViewRect {
            pos: self.position,
            size: self.size,
        }
    }
}
