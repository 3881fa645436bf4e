//! Pan camera and frame timing.
//!
//! The camera is a pure 2D translation plus one scalar aspect correction;
//! there is no projection matrix. Both values are pushed to the vertex
//! stage as a single uniform block each frame.

use bytemuck::{Pod, Zeroable};

use crate::input::InputState;

/// View uniform block, group 0 binding 0 in the vertex stage.
///
/// Matches the std140 layout of a three-float uniform block (padded to
/// 16 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ViewUniform {
    pub aspect_ratio: f32,
    pub x_offset: f32,
    pub y_offset: f32,
    pub _padding: f32,
}

/// Camera state: aspect correction recomputed every frame, pan offsets
/// persisting across frames.
///
/// Offsets are in normalized device coordinates and are mutated only by
/// [`PanCamera::apply_movement`].
#[derive(Debug, Clone, Copy)]
pub struct PanCamera {
    pub aspect_ratio: f32,
    pub x_offset: f32,
    pub y_offset: f32,
}

impl Default for PanCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl PanCamera {
    pub fn new() -> Self {
        Self {
            aspect_ratio: 0.0,
            x_offset: 0.25,
            y_offset: -1.0,
        }
    }

    /// Recompute the aspect correction from the current surface size.
    ///
    /// Height over width: the shader scales x-coordinates by this value so
    /// the shape keeps its proportions under non-square windows.
    pub fn set_aspect(&mut self, width: f32, height: f32) {
        self.aspect_ratio = height / width;
    }

    /// Apply one frame of movement from the currently held keys.
    ///
    /// Simultaneously held keys compose additively within the same frame.
    pub fn apply_movement(&mut self, input: &InputState, step: f32) {
        if input.up {
            self.y_offset += step;
        }
        if input.down {
            self.y_offset -= step;
        }
        if input.left {
            self.x_offset -= step;
        }
        if input.right {
            self.x_offset += step;
        }
    }

    pub fn uniform_data(&self) -> ViewUniform {
        ViewUniform {
            aspect_ratio: self.aspect_ratio,
            x_offset: self.x_offset,
            y_offset: self.y_offset,
            _padding: 0.0,
        }
    }
}

/// Frame timing state driving the per-frame movement step.
///
/// Each tick sets `move_by = (now - last_time) / frame_count`; when the
/// accumulated elapsed time reaches one second, the frame counter resets
/// and `last_time` advances by exactly 1.0. The step is an average over
/// the current one-second window, not a per-frame delta: it shrinks as
/// frames arrive faster.
#[derive(Debug, Clone, Copy)]
pub struct FrameTiming {
    last_time: f64,
    frame_count: u32,
    move_by: f32,
}

impl FrameTiming {
    /// Start timing at `now` (seconds).
    pub fn new(now: f64) -> Self {
        Self {
            last_time: now,
            frame_count: 0,
            move_by: 0.0,
        }
    }

    /// Advance one frame and return the movement step for this frame.
    pub fn tick(&mut self, now: f64) -> f32 {
        self.frame_count += 1;
        self.move_by = ((now - self.last_time) / self.frame_count as f64) as f32;

        if now - self.last_time >= 1.0 {
            self.frame_count = 0;
            self.last_time += 1.0;
        }

        self.move_by
    }

    pub fn move_by(&self) -> f32 {
        self.move_by
    }

    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    pub fn last_time(&self) -> f64 {
        self.last_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_offsets() {
        let camera = PanCamera::new();
        assert_eq!(camera.x_offset, 0.25);
        assert_eq!(camera.y_offset, -1.0);
    }

    #[test]
    fn test_aspect_is_height_over_width() {
        let mut camera = PanCamera::new();
        camera.set_aspect(1920.0, 1080.0);
        assert!((camera.aspect_ratio - 1080.0 / 1920.0).abs() < f32::EPSILON);

        camera.set_aspect(800.0, 800.0);
        assert_eq!(camera.aspect_ratio, 1.0);
    }

    #[test]
    fn test_simultaneous_keys_compose() {
        let mut camera = PanCamera::new();
        let input = InputState {
            up: true,
            right: true,
            ..Default::default()
        };
        camera.apply_movement(&input, 0.01);
        assert!((camera.x_offset - 0.26).abs() < 1e-6);
        assert!((camera.y_offset - -0.99).abs() < 1e-6);
    }

    #[test]
    fn test_three_frames_of_right_movement() {
        let mut camera = PanCamera::new();
        let input = InputState {
            right: true,
            ..Default::default()
        };
        for _ in 0..3 {
            camera.apply_movement(&input, 0.01);
        }
        assert!((camera.x_offset - 0.28).abs() < 1e-6);
        assert_eq!(camera.y_offset, -1.0);
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let mut camera = PanCamera::new();
        let input = InputState {
            left: true,
            right: true,
            ..Default::default()
        };
        camera.apply_movement(&input, 0.01);
        assert!((camera.x_offset - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_uniform_data() {
        let mut camera = PanCamera::new();
        camera.set_aspect(1000.0, 500.0);
        let uniform = camera.uniform_data();
        assert_eq!(uniform.aspect_ratio, 0.5);
        assert_eq!(uniform.x_offset, 0.25);
        assert_eq!(uniform.y_offset, -1.0);
        assert_eq!(std::mem::size_of::<ViewUniform>(), 16);
    }

    #[test]
    fn test_move_by_formula() {
        let mut timing = FrameTiming::new(0.0);
        // Frame 1 at t=0.1: (0.1 - 0.0) / 1
        let step = timing.tick(0.1);
        assert!((step - 0.1).abs() < 1e-6);
        // Frame 2 at t=0.2: (0.2 - 0.0) / 2
        let step = timing.tick(0.2);
        assert!((step - 0.1).abs() < 1e-6);
        // Frame 3 at t=0.25: (0.25 - 0.0) / 3
        let step = timing.tick(0.25);
        assert!((step - 0.25 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_frame_count_increases_within_window() {
        let mut timing = FrameTiming::new(0.0);
        let mut previous = timing.frame_count();
        for i in 1..=9 {
            timing.tick(i as f64 * 0.1);
            assert!(timing.frame_count() > previous);
            previous = timing.frame_count();
        }
    }

    #[test]
    fn test_second_boundary_resets_counter() {
        let mut timing = FrameTiming::new(0.0);
        for i in 1..=9 {
            timing.tick(i as f64 * 0.1);
        }
        assert_eq!(timing.frame_count(), 9);
        assert_eq!(timing.last_time(), 0.0);

        // Crossing the 1-second boundary: the step is still computed from
        // the pre-reset counter, then the window advances by exactly 1.0.
        let step = timing.tick(1.05);
        assert!((step - 1.05 / 10.0).abs() < 1e-6);
        assert_eq!(timing.frame_count(), 0);
        assert_eq!(timing.last_time(), 1.0);
    }

    #[test]
    fn test_step_shrinks_when_frames_speed_up() {
        let mut timing = FrameTiming::new(0.0);
        // Frame intervals halve each frame; the averaged step decays.
        let first = timing.tick(0.5);
        let second = timing.tick(0.75);
        let third = timing.tick(0.875);
        assert!((first - 0.5).abs() < 1e-6);
        assert!((second - 0.375).abs() < 1e-6);
        assert!(second < first);
        assert!(third < second);
    }
}
