//! Strip Navigation
//!
//! Owns the wrap index and flatten override and turns them into the
//! per-frame [`SurfaceParams`] record. The wrap can be driven three ways:
//! set directly, advanced over time at a fixed speed, or derived from a
//! camera position on the grid axis. It is always kept inside the axis
//! domain.

use std::sync::Arc;

use crate::config::StripConfig;
use crate::strip::{GridAxis, SurfaceParams};

#[derive(Clone, Debug)]
pub struct StripNavigator {
    axis: Arc<GridAxis>,
    wrap: f32,
    /// Wrap units per second.
    speed: f32,
    flatten: f32,
}

impl StripNavigator {
    pub fn new(axis: Arc<GridAxis>) -> Self {
        Self {
            axis,
            wrap: 0.0,
            speed: 0.0,
            flatten: 0.0,
        }
    }

    /// Navigator initialised from the navigation section of a config.
    pub fn from_config(axis: Arc<GridAxis>, config: &StripConfig) -> Self {
        let mut nav = Self::new(axis);
        nav.set_wrap(config.wrap);
        nav.set_speed(config.speed);
        nav.set_flatten(config.flatten);
        nav
    }

    pub fn axis(&self) -> &GridAxis {
        &self.axis
    }

    pub fn wrap(&self) -> f32 {
        self.wrap
    }

    pub fn flatten(&self) -> f32 {
        self.flatten
    }

    /// Set the wrap index, clamped into the axis domain.
    pub fn set_wrap(&mut self, wrap: f32) {
        let clamped = self.axis.clamp_wrap(wrap);
        if clamped != wrap {
            log::debug!("[Navigator] wrap {} clamped to {}", wrap, clamped);
        }
        self.wrap = clamped;
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = if speed.is_finite() { speed } else { 0.0 };
    }

    /// Set the flatten override, clamped to `[0, 1]`.
    pub fn set_flatten(&mut self, flatten: f32) {
        self.flatten = if flatten.is_finite() {
            flatten.clamp(0.0, 1.0)
        } else {
            0.0
        };
    }

    /// Advance the wrap by `dt` seconds at the current speed.
    pub fn advance(&mut self, dt: f32) {
        self.set_wrap(self.wrap + self.speed * dt);
    }

    /// Derive the wrap from a camera x position on the grid axis.
    ///
    /// Positions beyond either end of the axis pin the wrap to that end.
    pub fn track_camera(&mut self, x: f32) {
        let (min, max) = self.axis.wrap_domain();
        let wrap = match self.axis.wrap_of(x) {
            Ok(wrap) => wrap,
            Err(_) if x > self.axis.offsets()[0] => min,
            Err(_) => max,
        };
        self.set_wrap(wrap);
    }

    /// Parameters for the per-vertex stage this frame.
    pub fn frame_params(&self) -> SurfaceParams {
        let wrap_position = self
            .axis
            .position(self.wrap)
            .unwrap_or(self.axis.offsets()[0]);
        SurfaceParams {
            wrap: self.wrap,
            wrap_position,
            flatten: self.flatten,
        }
    }
}
