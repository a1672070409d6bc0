//! Timed motion events.

use nalgebra::Vector3;

use super::interval::Interval;
use crate::toolpath::Contour;
use crate::trajectory::Trajectory;

/// A straight-line multi-point move executed at constant speed.
///
/// Invariant: `end = start + path_length / velocity`; the stored trajectory
/// is the constant-velocity parameterization of the path starting at
/// `start`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoveEvent {
    start: f64,
    end: f64,
    path: Vec<Vector3<f64>>,
    velocity: f64,
    trajectory: Trajectory,
}

impl MoveEvent {
    pub fn new(start: f64, path: Vec<Vector3<f64>>, velocity: f64) -> Self {
        debug_assert!(path.len() >= 2, "a move needs at least two waypoints");
        let length: f64 = path.windows(2).map(|w| (w[1] - w[0]).norm()).sum();
        let trajectory = Trajectory::from_const_vel_path(&path, velocity, start);
        Self {
            start,
            end: start + length / velocity,
            path,
            velocity,
            trajectory,
        }
    }

    pub fn path(&self) -> &[Vector3<f64>] {
        &self.path
    }
}

/// Execution of a contour: semantically a [`MoveEvent`] along the contour's
/// path, carrying the tool tag.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContourEvent {
    start: f64,
    end: f64,
    contour: Contour,
    velocity: f64,
    trajectory: Trajectory,
}

impl ContourEvent {
    pub fn new(start: f64, contour: Contour, velocity: f64) -> Self {
        let trajectory = Trajectory::from_const_vel_path(&contour.path, velocity, start);
        Self {
            start,
            end: start + contour.path_length() / velocity,
            contour,
            velocity,
            trajectory,
        }
    }

    pub fn contour(&self) -> &Contour {
        &self.contour
    }
}

/// A timed motion event in an agent's schedule.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Event {
    Move(MoveEvent),
    Contour(ContourEvent),
}

impl Event {
    pub fn start(&self) -> f64 {
        match self {
            Event::Move(e) => e.start,
            Event::Contour(e) => e.start,
        }
    }

    pub fn end(&self) -> f64 {
        match self {
            Event::Move(e) => e.end,
            Event::Contour(e) => e.end,
        }
    }

    pub fn duration(&self) -> f64 {
        self.end() - self.start()
    }

    pub fn velocity(&self) -> f64 {
        match self {
            Event::Move(e) => e.velocity,
            Event::Contour(e) => e.velocity,
        }
    }

    /// The waypoints this event moves through.
    pub fn path(&self) -> &[Vector3<f64>] {
        match self {
            Event::Move(e) => &e.path,
            Event::Contour(e) => &e.contour.path,
        }
    }

    pub fn trajectory(&self) -> &Trajectory {
        match self {
            Event::Move(e) => &e.trajectory,
            Event::Contour(e) => &e.trajectory,
        }
    }

    /// The event's time span as an [`Interval`], for the Allen relations.
    pub fn interval(&self) -> Interval {
        Interval::from_f64(self.start(), self.end())
    }

    pub fn initial_position(&self) -> Vector3<f64> {
        self.path()[0]
    }

    pub fn terminal_position(&self) -> Vector3<f64> {
        *self.path().last().expect("events carry a non-empty path")
    }

    /// The same event displaced `dt` later in time.
    pub fn shifted(&self, dt: f64) -> Event {
        match self {
            Event::Move(e) => Event::Move(MoveEvent::new(e.start + dt, e.path.clone(), e.velocity)),
            Event::Contour(e) => Event::Contour(ContourEvent::new(
                e.start + dt,
                e.contour.clone(),
                e.velocity,
            )),
        }
    }
}
