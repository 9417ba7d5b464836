use glam::{Mat4, Vec3};
use labyrinth_common::FollowConfig;

const PITCH_LIMIT_DEG: f32 = 89.0;

/// Chase camera: position plus yaw/pitch orientation and zoom.
///
/// `front`, `right` and `up` are derived from yaw and pitch and recomputed on
/// every orientation change. Position is written by the follow controller.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    yaw: f32,
    pitch: f32,
    /// Vertical field of view in degrees.
    zoom: f32,
    sensitivity: f32,
    zoom_min: f32,
    zoom_max: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    front: Vec3,
    right: Vec3,
    up: Vec3,
}

impl Camera {
    pub fn new(position: Vec3, cfg: &FollowConfig) -> Self {
        let mut camera = Self {
            position,
            yaw: cfg.initial_yaw_deg.to_radians(),
            pitch: cfg
                .initial_pitch_deg
                .clamp(-PITCH_LIMIT_DEG, PITCH_LIMIT_DEG)
                .to_radians(),
            zoom: cfg.initial_zoom.clamp(cfg.zoom_min, cfg.zoom_max),
            sensitivity: cfg.sensitivity,
            zoom_min: cfg.zoom_min,
            zoom_max: cfg.zoom_max,
            aspect: 800.0 / 600.0,
            near: 0.1,
            far: 100.0,
            front: Vec3::NEG_Z,
            right: Vec3::X,
            up: Vec3::Y,
        };
        camera.update_vectors();
        camera
    }

    /// Yaw in radians; `-PI/2` looks down -Z.
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Apply a mouse offset in pixels. Positive `dy` looks up.
    /// Pitch is constrained to +-89 degrees so the view never flips.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw += (dx * self.sensitivity).to_radians();
        self.pitch = (self.pitch + (dy * self.sensitivity).to_radians()).clamp(
            -PITCH_LIMIT_DEG.to_radians(),
            PITCH_LIMIT_DEG.to_radians(),
        );
        self.update_vectors();
    }

    /// Scroll-wheel zoom, clamped to the configured field-of-view range.
    pub fn zoom_by(&mut self, amount: f32) {
        self.zoom = (self.zoom - amount).clamp(self.zoom_min, self.zoom_max);
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.zoom.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    fn update_vectors(&mut self) {
        self.front = Vec3::new(
            self.yaw.cos() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.sin() * self.pitch.cos(),
        )
        .normalize();
        self.right = self.front.cross(Vec3::Y).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}
