use std::collections::HashSet;
use std::mem;

use glam::Vec3;
use log::{debug, info, trace};
use winit::event::{
    DeviceEvent, ElementState, KeyboardInput, MouseScrollDelta, VirtualKeyCode, WindowEvent,
};
use crate::camera::Movement;
use crate::rig::Rig;

/// Scroll lines per pixel for touchpads that report pixel deltas.
const PIXELS_TO_LINES: f32 = 0.01;

/// Input recorded between frames, replayed in arrival order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Raw mouse motion, y already flipped so that up is positive.
    Look { dx: f32, dy: f32 },
    Scroll(f32),
    Press(VirtualKeyCode),
}

pub fn movement_for(key: VirtualKeyCode) -> Option<Movement> {
    match key {
        VirtualKeyCode::W => Some(Movement::Forward),
        VirtualKeyCode::S => Some(Movement::Backward),
        VirtualKeyCode::A => Some(Movement::Left),
        VirtualKeyCode::D => Some(Movement::Right),
        _ => None,
    }
}

/// (turn, raise) steps applied each frame an arrow key is held.
fn orbit_steps(key: VirtualKeyCode) -> Option<(f32, f32)> {
    match key {
        VirtualKeyCode::Left => Some((-1.0, 0.0)),
        VirtualKeyCode::Right => Some((1.0, 0.0)),
        VirtualKeyCode::Up => Some((0.0, 1.0)),
        VirtualKeyCode::Down => Some((0.0, -1.0)),
        _ => None,
    }
}

fn target_offset(key: VirtualKeyCode) -> Option<Vec3> {
    match key {
        VirtualKeyCode::A => Some(Vec3::new(-1.0, 0.0, 0.0)),
        VirtualKeyCode::D => Some(Vec3::new(1.0, 0.0, 0.0)),
        VirtualKeyCode::W => Some(Vec3::new(0.0, 1.0, 0.0)),
        VirtualKeyCode::S => Some(Vec3::new(0.0, -1.0, 0.0)),
        VirtualKeyCode::Q => Some(Vec3::new(0.0, 0.0, 1.0)),
        VirtualKeyCode::Z => Some(Vec3::new(0.0, 0.0, -1.0)),
        _ => None,
    }
}

/// Keyboard and mouse state owned by the render loop.
#[derive(Debug)]
pub struct Input {
    held: HashSet<VirtualKeyCode>,
    queue: Vec<Command>,
    focused: bool,
}

impl Default for Input {
    fn default() -> Self {
        Self::new()
    }
}

impl Input {
    pub fn new() -> Self {
        Self {
            held: HashSet::new(),
            queue: Vec::new(),
            focused: true,
        }
    }

    /// Returns true if the event was recorded.
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput {
                input: KeyboardInput {
                    state,
                    virtual_keycode: Some(key),
                    ..
                },
                ..
            } => {
                match state {
                    ElementState::Pressed => self.press(*key),
                    ElementState::Released => self.release(*key),
                }
                true
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * PIXELS_TO_LINES,
                };
                self.scroll(lines);
                true
            }
            WindowEvent::Focused(focused) => {
                self.focused = *focused;
                if !*focused {
                    self.held.clear();
                }
                true
            }
            _ => false,
        }
    }

    /// Raw mouse motion is ignored while the window is unfocused.
    pub fn handle_device_event(&mut self, event: &DeviceEvent) {
        if !self.focused {
            return;
        }
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            // screen y grows downward
            self.look(*dx as f32, -*dy as f32);
        }
    }

    /// Key repeat does not produce a second press.
    pub fn press(&mut self, key: VirtualKeyCode) {
        if self.held.insert(key) {
            trace!("pressed {:?}", key);
            self.queue.push(Command::Press(key));
        }
    }

    pub fn release(&mut self, key: VirtualKeyCode) {
        self.held.remove(&key);
    }

    pub fn look(&mut self, dx: f32, dy: f32) {
        self.queue.push(Command::Look { dx, dy });
    }

    pub fn scroll(&mut self, lines: f32) {
        self.queue.push(Command::Scroll(lines));
    }

    #[cfg(test)]
    pub fn is_held(&self, key: VirtualKeyCode) -> bool {
        self.held.contains(&key)
    }

    #[cfg(test)]
    pub fn pending(&self) -> &[Command] {
        &self.queue
    }

    /// Replays queued commands into `rig`, then applies held keys for
    /// `delta_time` seconds.
    pub fn apply(&mut self, rig: &mut Rig, delta_time: f32) {
        for command in mem::take(&mut self.queue) {
            apply_command(rig, command);
        }
        for &key in self.held.iter() {
            match rig {
                Rig::Fly(camera) => {
                    if let Some(direction) = movement_for(key) {
                        camera.translate(direction, delta_time);
                    }
                }
                Rig::Orbit(orbit) => {
                    if let Some((turn, raise)) = orbit_steps(key) {
                        orbit.turn(turn);
                        orbit.raise(raise);
                    }
                }
                Rig::Target(_) => {}
            }
        }
    }
}

fn apply_command(rig: &mut Rig, command: Command) {
    match (command, rig) {
        (Command::Press(VirtualKeyCode::P), rig) => {
            info!("eye = {:?}", rig.eye());
            info!("view matrix {:?}", rig.view_matrix());
        }
        (Command::Look { dx, dy }, Rig::Fly(camera)) => camera.rotate(dx, dy),
        (Command::Scroll(lines), Rig::Fly(camera)) => {
            camera.zoom_by(lines);
            debug!("zoom {}", camera.zoom());
        }
        (Command::Press(VirtualKeyCode::Space), Rig::Target(target)) => target.reset(),
        (Command::Press(key), Rig::Target(target)) => {
            if let Some(offset) = target_offset(key) {
                target.nudge(offset);
                debug!("eye moved to {:?}", target.eye);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use crate::config::OrbitConfig;
    use crate::rig::{Orbit, Target};

    const EPS: f32 = 1e-5;

    fn fly() -> Rig {
        Rig::Fly(Camera::new(Vec3::new(0.0, 0.0, 3.0)))
    }

    #[test]
    fn wasd_maps_to_movement() {
        assert_eq!(movement_for(VirtualKeyCode::W), Some(Movement::Forward));
        assert_eq!(movement_for(VirtualKeyCode::S), Some(Movement::Backward));
        assert_eq!(movement_for(VirtualKeyCode::A), Some(Movement::Left));
        assert_eq!(movement_for(VirtualKeyCode::D), Some(Movement::Right));
        assert_eq!(movement_for(VirtualKeyCode::Q), None);
    }

    #[test]
    fn held_key_moves_every_frame() {
        let mut input = Input::new();
        let mut rig = fly();
        input.press(VirtualKeyCode::W);
        input.apply(&mut rig, 0.2);
        input.apply(&mut rig, 0.2);
        assert!(rig.eye().abs_diff_eq(Vec3::new(0.0, 0.0, 2.0), EPS));

        input.release(VirtualKeyCode::W);
        input.apply(&mut rig, 0.2);
        assert!(rig.eye().abs_diff_eq(Vec3::new(0.0, 0.0, 2.0), EPS));
    }

    #[test]
    fn opposite_keys_cancel() {
        let mut input = Input::new();
        let mut rig = fly();
        input.press(VirtualKeyCode::A);
        input.press(VirtualKeyCode::D);
        input.apply(&mut rig, 0.5);
        assert!(rig.eye().abs_diff_eq(Vec3::new(0.0, 0.0, 3.0), EPS));
    }

    #[test]
    fn mouse_motion_flips_y() {
        let mut input = Input::new();
        input.handle_device_event(&DeviceEvent::MouseMotion { delta: (3.0, 4.0) });
        assert_eq!(input.pending(), &[Command::Look { dx: 3.0, dy: -4.0 }]);

        let mut rig = fly();
        input.apply(&mut rig, 0.0);
        match &rig {
            Rig::Fly(camera) => {
                assert!((camera.yaw() - (-89.7)).abs() < 1e-4);
                assert!((camera.pitch() - (-0.4)).abs() < 1e-4);
            }
            _ => unreachable!(),
        }
        assert!(input.pending().is_empty());
    }

    #[test]
    fn mouse_motion_is_dropped_while_unfocused() {
        let mut input = Input::new();
        input.press(VirtualKeyCode::W);
        assert!(input.handle_window_event(&WindowEvent::Focused(false)));
        assert!(!input.is_held(VirtualKeyCode::W));

        input.handle_device_event(&DeviceEvent::MouseMotion { delta: (50.0, -20.0) });
        assert_eq!(input.pending(), &[Command::Press(VirtualKeyCode::W)]);

        let mut rig = fly();
        input.apply(&mut rig, 0.0);
        match &rig {
            Rig::Fly(camera) => {
                assert_eq!(camera.yaw(), -90.0);
                assert_eq!(camera.pitch(), 0.0);
            }
            _ => unreachable!(),
        }

        input.handle_window_event(&WindowEvent::Focused(true));
        input.handle_device_event(&DeviceEvent::MouseMotion { delta: (50.0, -20.0) });
        assert_eq!(input.pending(), &[Command::Look { dx: 50.0, dy: 20.0 }]);
    }

    #[test]
    fn commands_replay_in_order() {
        let mut input = Input::new();
        let mut rig = fly();
        // clamp then come back down: order matters
        input.look(0.0, 2000.0);
        input.look(0.0, -100.0);
        input.scroll(5.0);
        input.apply(&mut rig, 0.0);
        match &rig {
            Rig::Fly(camera) => {
                assert!((camera.pitch() - 79.0).abs() < 1e-4);
                assert_eq!(camera.zoom(), 40.0);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn repeat_press_is_queued_once() {
        let mut input = Input::new();
        input.press(VirtualKeyCode::W);
        input.press(VirtualKeyCode::W);
        assert_eq!(input.pending(), &[Command::Press(VirtualKeyCode::W)]);
        assert!(input.is_held(VirtualKeyCode::W));
    }

    #[test]
    fn target_moves_per_press_not_per_frame() {
        let mut input = Input::new();
        let mut rig = Rig::Target(Target::default());
        input.press(VirtualKeyCode::D);
        input.apply(&mut rig, 0.1);
        input.apply(&mut rig, 0.1);
        assert_eq!(rig.eye(), Vec3::new(1.0, 0.0, 5.0));

        input.release(VirtualKeyCode::D);
        input.press(VirtualKeyCode::Q);
        input.press(VirtualKeyCode::W);
        input.apply(&mut rig, 0.1);
        assert_eq!(rig.eye(), Vec3::new(1.0, 1.0, 6.0));

        input.press(VirtualKeyCode::Space);
        input.apply(&mut rig, 0.1);
        assert_eq!(rig.eye(), Vec3::new(0.0, 0.0, 5.0));
    }

    #[test]
    fn orbit_turns_while_held() {
        let mut input = Input::new();
        let mut rig = Rig::Orbit(Orbit::from_config(&OrbitConfig::default()));
        input.press(VirtualKeyCode::Right);
        input.press(VirtualKeyCode::Up);
        for _ in 0..3 {
            input.apply(&mut rig, 0.016);
        }
        match &rig {
            Rig::Orbit(orbit) => {
                assert!((orbit.angle - 15.0).abs() < EPS);
                assert!((orbit.height - 0.3).abs() < EPS);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn mouse_is_ignored_outside_fly_mode() {
        let mut input = Input::new();
        let mut rig = Rig::Target(Target::default());
        input.look(100.0, 100.0);
        input.scroll(3.0);
        input.apply(&mut rig, 0.1);
        assert_eq!(rig, Rig::Target(Target::default()));
    }
}
