//! Abstract motion instructions. Cut strategies append to a `MotionList`; the compiler consumes it once.
//!
//! Linear coordinates are in inches, the spindle coordinate `c` in degrees (absolute, unwrapped).

/// The angle in [-180, 180) equivalent to `c`. This is where the spindle reads after a `WrapSpindle`.
pub fn wrap_degrees(c: f64) -> f64 {
    (c + 180.0).rem_euclid(360.0) - 180.0
}

/// The first angle at or after `current` that is equivalent to `target`, so the spindle only ever turns forwards
pub fn forward_to(current: f64, target: f64) -> f64 {
    current + (target - current).rem_euclid(360.0)
}

#[derive(Debug, Clone, PartialEq)]
pub enum MotionInstruction {
    Comment(String),
    /// Go to (x, z) at the machine's maximum linear rate
    MoveXzFastest { x: f64, z: f64 },
    /// Go to (x, z) at cruise velocity
    MoveXz { x: f64, z: f64 },
    /// Go to (x, z, c) as fast as the slowest axis allows
    MoveXzcFastest { x: f64, z: f64, c: f64 },
    /// Go to (x, z, c) at cruise velocity
    MoveXzc { x: f64, z: f64, c: f64 },
    /// Go to (x, z, c) with the spindle limited to the cruise RPM
    MoveXzcAtRpm { x: f64, z: f64, c: f64 },
    /// Turn the spindle to absolute angle `c` at cruise RPM, without wraparound correction
    TurnSpindle { c: f64 },
    /// Re-base the spindle angle into [-180, 180) without moving it
    WrapSpindle,
}

impl MotionInstruction {
    /// Every coordinate the instruction carries
    pub fn coordinates(&self) -> Vec<f64> {
        use MotionInstruction::*;
        match *self {
            Comment(_) | WrapSpindle => vec![],
            MoveXzFastest { x, z } | MoveXz { x, z } => vec![x, z],
            MoveXzcFastest { x, z, c } | MoveXzc { x, z, c } | MoveXzcAtRpm { x, z, c } => {
                vec![x, z, c]
            }
            TurnSpindle { c } => vec![c],
        }
    }
}

/// Ordered, append-only list of instructions for one operation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MotionList {
    instructions: Vec<MotionInstruction>,
}

impl MotionList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, instruction: MotionInstruction) {
        self.instructions.push(instruction);
    }

    pub fn comment(&mut self, s: impl Into<String>) {
        self.push(MotionInstruction::Comment(s.into()));
    }

    pub fn move_xz_fastest(&mut self, x: f64, z: f64) {
        self.push(MotionInstruction::MoveXzFastest { x, z });
    }

    pub fn move_xz(&mut self, x: f64, z: f64) {
        self.push(MotionInstruction::MoveXz { x, z });
    }

    pub fn move_xzc_fastest(&mut self, x: f64, z: f64, c: f64) {
        self.push(MotionInstruction::MoveXzcFastest { x, z, c });
    }

    pub fn move_xzc(&mut self, x: f64, z: f64, c: f64) {
        self.push(MotionInstruction::MoveXzc { x, z, c });
    }

    pub fn move_xzc_at_rpm(&mut self, x: f64, z: f64, c: f64) {
        self.push(MotionInstruction::MoveXzcAtRpm { x, z, c });
    }

    pub fn turn_spindle(&mut self, c: f64) {
        self.push(MotionInstruction::TurnSpindle { c });
    }

    pub fn wrap_spindle(&mut self) {
        self.push(MotionInstruction::WrapSpindle);
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MotionInstruction> {
        self.instructions.iter()
    }

    /// Number of instructions that position an axis
    pub fn motion_count(&self) -> usize {
        self.iter()
            .filter(|i| !matches!(i, MotionInstruction::Comment(_)))
            .count()
    }
}

impl<'a> IntoIterator for &'a MotionList {
    type Item = &'a MotionInstruction;
    type IntoIter = std::slice::Iter<'a, MotionInstruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Extend<MotionInstruction> for MotionList {
    fn extend<T: IntoIterator<Item = MotionInstruction>>(&mut self, iter: T) {
        self.instructions.extend(iter);
    }
}
