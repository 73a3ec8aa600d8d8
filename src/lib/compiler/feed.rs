//! Feed mode decision table: which feed convention a move uses and what its F word is.
//!
//! | move                      | axes moving        | mode           | rate                                 |
//! |---------------------------|--------------------|----------------|--------------------------------------|
//! | x/z fastest               | any                | units/min      | max velocity                         |
//! | x/z cruise                | any                | units/min      | cruise velocity                      |
//! | x/z/c fastest             | any                | inverse time   | 1 / slowest axis time, max RPM       |
//! | x/z/c at RPM              | any                | inverse time   | 1 / slowest axis time, cruise RPM    |
//! | x/z/c cruise              | x or z             | units/min      | cruise velocity                      |
//! | x/z/c cruise              | c only             | inverse time   | 1 / spindle time at cruise RPM       |
//! | spindle turn              | c                  | inverse time   | 1 / spindle time at cruise RPM       |
//!
//! Inverse-time rates are capped at the controller's instruction issue rate.

use crate::config::Machine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKind {
    XzFastest,
    XzCruise,
    XzcFastest,
    XzcCruise,
    XzcAtRpm,
    SpindleTurn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedMode {
    /// G94, F in inches per minute
    UnitsPerMinute,
    /// G93, F is 1 / minutes for the move
    InverseTime,
}

impl FeedMode {
    pub fn gcode(&self) -> &'static str {
        match self {
            FeedMode::UnitsPerMinute => "g94",
            FeedMode::InverseTime => "g93",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Feed {
    pub mode: FeedMode,
    pub rate: f64,
}

/// Distance each axis travels in a move: inches for x and z, degrees for c
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Delta {
    pub x: f64,
    pub z: f64,
    pub c: f64,
}

impl Delta {
    pub fn linear_moves(&self) -> bool {
        self.x != 0.0 || self.z != 0.0
    }

    pub fn linear_length(&self) -> f64 {
        self.x.hypot(self.z)
    }
}

pub fn plan_feed(machine: &Machine, kind: MoveKind, delta: Delta) -> Feed {
    match kind {
        MoveKind::XzFastest => units_per_minute(machine.max_velocity),
        MoveKind::XzCruise => units_per_minute(machine.cruise_velocity),
        MoveKind::XzcFastest => inverse_time(machine, coupled_minutes(machine, delta, machine.max_rpm)),
        MoveKind::XzcAtRpm => inverse_time(machine, coupled_minutes(machine, delta, machine.cruise_rpm)),
        MoveKind::XzcCruise if delta.linear_moves() => units_per_minute(machine.cruise_velocity),
        MoveKind::XzcCruise | MoveKind::SpindleTurn => {
            inverse_time(machine, spindle_minutes(delta.c, machine.cruise_rpm))
        }
    }
}

/// How long a move takes at a planned feed, in minutes
pub fn move_minutes(feed: Feed, delta: Delta) -> f64 {
    match feed.mode {
        FeedMode::UnitsPerMinute => delta.linear_length() / feed.rate,
        FeedMode::InverseTime => 1.0 / feed.rate,
    }
}

fn units_per_minute(rate: f64) -> Feed {
    Feed {
        mode: FeedMode::UnitsPerMinute,
        rate,
    }
}

fn inverse_time(machine: &Machine, minutes: f64) -> Feed {
    let rate = if minutes > 0.0 {
        (1.0 / minutes).min(machine.max_issue_rate)
    } else {
        machine.max_issue_rate
    };
    Feed {
        mode: FeedMode::InverseTime,
        rate,
    }
}

fn spindle_minutes(degrees: f64, rpm: f64) -> f64 {
    degrees.abs() / 360.0 / rpm
}

/// Time for the slowest axis; each axis is limited by its own rate
fn coupled_minutes(machine: &Machine, delta: Delta, rpm: f64) -> f64 {
    let tx = delta.x.abs() / machine.max_velocity;
    let tz = delta.z.abs() / machine.max_velocity;
    tx.max(tz).max(spindle_minutes(delta.c, rpm))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn machine() -> Machine {
        Machine {
            max_velocity: 20.0,
            max_rpm: 10.0,
            max_issue_rate: 6000.0,
            cruise_velocity: 5.0,
            cruise_rpm: 2.0,
            ..Machine::default()
        }
    }

    fn delta(x: f64, z: f64, c: f64) -> Delta {
        Delta { x, z, c }
    }

    #[test]
    fn test_two_axis_moves_feed_per_minute() {
        let m = machine();
        let f = plan_feed(&m, MoveKind::XzFastest, delta(1.0, 0.0, 0.0));
        assert_eq!(f, Feed { mode: FeedMode::UnitsPerMinute, rate: 20.0 });
        let f = plan_feed(&m, MoveKind::XzCruise, delta(0.0, 1.0, 0.0));
        assert_eq!(f, Feed { mode: FeedMode::UnitsPerMinute, rate: 5.0 });
    }

    #[test]
    fn test_coupled_fastest_uses_limiting_axis() {
        let m = machine();
        // x takes 1/20 min, c takes 90/360/10 = 1/40 min: x limits
        let f = plan_feed(&m, MoveKind::XzcFastest, delta(1.0, 0.5, 90.0));
        assert_eq!(f.mode, FeedMode::InverseTime);
        assert_relative_eq!(f.rate, 20.0);
        // A full turn at 10 RPM limits
        let f = plan_feed(&m, MoveKind::XzcFastest, delta(0.1, 0.0, 360.0));
        assert_relative_eq!(f.rate, 10.0);
    }

    #[test]
    fn test_coupled_at_rpm_uses_cruise_rpm() {
        let m = machine();
        let f = plan_feed(&m, MoveKind::XzcAtRpm, delta(0.1, 0.0, 360.0));
        assert_eq!(f.mode, FeedMode::InverseTime);
        assert_relative_eq!(f.rate, 2.0);
    }

    #[test]
    fn test_cruise_switches_mode_on_spindle_only() {
        let m = machine();
        let f = plan_feed(&m, MoveKind::XzcCruise, delta(0.0, 0.2, 45.0));
        assert_eq!(f, Feed { mode: FeedMode::UnitsPerMinute, rate: 5.0 });
        let f = plan_feed(&m, MoveKind::XzcCruise, delta(0.0, 0.0, 180.0));
        assert_eq!(f.mode, FeedMode::InverseTime);
        assert_relative_eq!(f.rate, 4.0);
        assert_eq!(f, plan_feed(&m, MoveKind::SpindleTurn, delta(0.0, 0.0, -180.0)));
    }

    #[test]
    fn test_inverse_time_is_capped() {
        let m = machine();
        let f = plan_feed(&m, MoveKind::XzcFastest, delta(1.0 / 16000.0, 0.0, 0.0));
        assert_relative_eq!(f.rate, 6000.0);
    }

    #[test]
    fn test_move_minutes() {
        let d = delta(3.0, 4.0, 0.0);
        assert_relative_eq!(move_minutes(units_per_minute(5.0), d), 1.0);
        assert_relative_eq!(
            move_minutes(Feed { mode: FeedMode::InverseTime, rate: 4.0 }, d),
            0.25
        );
    }
}
