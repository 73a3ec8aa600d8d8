//! Compile a `MotionList` into G-code for an inch-based controller with a stepper-driven spindle (C axis).
//!
//! One pass over the list. Every target is quantized to whole steps and the value printed is the one those steps
//! stand for, so the program only ever names positions the machine can actually reach. A move whose quantized
//! target is where the machine already is gets dropped, except for the very first one: the real machine position is
//! unknown until then.

pub mod feed;
pub mod quantize;

use std::fs::{remove_file, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::config::Machine;
use crate::error::{Error, Result};
use crate::motion::{MotionInstruction, MotionList};

pub use feed::{move_minutes, plan_feed, Delta, Feed, FeedMode, MoveKind};
pub use quantize::{Quantizer, Steps};

/// Extension for programs written by `write_program`
pub const PROGRAM_EXTENSION: &str = "ngc";

/// Smallest F word we print; anything lower would round to zero
const MIN_FEED: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CompileSummary {
    /// Lines that move (or redefine) an axis
    pub motion_lines: usize,
    /// Moves dropped because the machine was already there
    pub skipped: usize,
    /// Spindle re-basings emitted
    pub wraps: usize,
    /// Estimated run time in minutes
    pub minutes: f64,
}

pub fn preamble(out: &mut dyn Write) -> std::io::Result<()> {
    writeln!(out, "g20")?;
    writeln!(out, "g90")
}

pub fn postamble(out: &mut dyn Write) -> std::io::Result<()> {
    writeln!(out, "g92.1")?;
    writeln!(out, "m2")
}

pub fn gcode_comment(out: &mut dyn Write, s: &str) -> std::io::Result<()> {
    for line in s.lines() {
        writeln!(out, "; {line}")?;
    }
    Ok(())
}

/// Emit one G-code word with a fixed number of decimals
fn g_val(out: &mut dyn Write, name: &str, v: f64, decimals: usize) -> std::io::Result<()> {
    write!(out, " {name}{v:.decimals$}")
}

struct Compiler<'a> {
    machine: &'a Machine,
    q: Quantizer,
    out: &'a mut dyn Write,
    last: Steps,
    first: bool,
    summary: CompileSummary,
}

impl<'a> Compiler<'a> {
    fn instruction(&mut self, index: usize, ins: &MotionInstruction) -> Result<()> {
        if ins.coordinates().iter().any(|v| !v.is_finite()) {
            return Err(Error::NonFinite { index });
        }
        let q = self.q;
        let last = self.last;
        match ins {
            MotionInstruction::Comment(s) => gcode_comment(self.out, s)?,
            MotionInstruction::WrapSpindle => self.wrap()?,
            MotionInstruction::MoveXzFastest { x, z } => {
                let to = Steps { x: q.linear_steps(*x), z: q.linear_steps(*z), c: last.c };
                self.position(MoveKind::XzFastest, to, false)?
            }
            MotionInstruction::MoveXz { x, z } => {
                let to = Steps { x: q.linear_steps(*x), z: q.linear_steps(*z), c: last.c };
                self.position(MoveKind::XzCruise, to, false)?
            }
            MotionInstruction::MoveXzcFastest { x, z, c } => {
                self.position(MoveKind::XzcFastest, self.steps(*x, *z, *c), true)?
            }
            MotionInstruction::MoveXzc { x, z, c } => {
                self.position(MoveKind::XzcCruise, self.steps(*x, *z, *c), true)?
            }
            MotionInstruction::MoveXzcAtRpm { x, z, c } => {
                self.position(MoveKind::XzcAtRpm, self.steps(*x, *z, *c), true)?
            }
            MotionInstruction::TurnSpindle { c } => {
                let to = Steps { c: q.angle_steps(*c), ..last };
                self.position(MoveKind::SpindleTurn, to, true)?
            }
        }
        Ok(())
    }

    fn steps(&self, x: f64, z: f64, c: f64) -> Steps {
        Steps {
            x: self.q.linear_steps(x),
            z: self.q.linear_steps(z),
            c: self.q.angle_steps(c),
        }
    }

    fn position(&mut self, kind: MoveKind, to: Steps, with_c: bool) -> Result<()> {
        if to == self.last {
            if !self.first {
                self.summary.skipped += 1;
                return Ok(());
            }
            // First point, already at the assumed origin: nothing to feed over, so just state the position
            write!(self.out, "g0")?;
            self.coordinates(to, true)?;
            writeln!(self.out)?;
            self.first = false;
            self.summary.motion_lines += 1;
            return Ok(());
        }

        let q = self.q;
        let delta = Delta {
            x: q.linear(to.x) - q.linear(self.last.x),
            z: q.linear(to.z) - q.linear(self.last.z),
            c: q.angle(to.c) - q.angle(self.last.c),
        };
        let mut feed = plan_feed(self.machine, kind, delta);
        // Units-per-minute lines still carry c when the spindle is part of the move
        let with_c = with_c || feed.mode == FeedMode::InverseTime;
        if feed.rate < MIN_FEED {
            warn!(
                "Feed {} for a {:?} move rounds to zero, raising to {MIN_FEED}",
                feed.rate, kind
            );
            feed.rate = MIN_FEED;
        }

        write!(self.out, "{} g1", feed.mode.gcode())?;
        self.coordinates(to, with_c)?;
        g_val(self.out, "f", feed.rate, 2)?;
        writeln!(self.out)?;

        self.summary.minutes += move_minutes(feed, delta);
        self.summary.motion_lines += 1;
        self.last = to;
        self.first = false;
        Ok(())
    }

    fn coordinates(&mut self, at: Steps, with_c: bool) -> Result<()> {
        g_val(self.out, "x", self.q.linear(at.x), 5)?;
        g_val(self.out, "z", self.q.linear(at.z), 5)?;
        if with_c {
            g_val(self.out, "c", self.q.angle(at.c), 2)?;
        }
        Ok(())
    }

    fn wrap(&mut self) -> Result<()> {
        if let Some(c) = self.q.wrap(self.last.c) {
            write!(self.out, "g92")?;
            g_val(self.out, "c", self.q.angle(c), 2)?;
            writeln!(self.out)?;
            debug!(
                "Spindle re-based from {:.2} to {:.2} degrees",
                self.q.angle(self.last.c),
                self.q.angle(c)
            );
            self.last.c = c;
            self.summary.wraps += 1;
            self.summary.motion_lines += 1;
        }
        Ok(())
    }
}

/// Compile `list` into a complete program written to `out`
pub fn compile(list: &MotionList, machine: &Machine, out: &mut dyn Write) -> Result<CompileSummary> {
    machine.validate()?;
    preamble(out)?;
    let mut compiler = Compiler {
        machine,
        q: Quantizer::new(machine),
        out: &mut *out,
        last: Steps::default(),
        first: true,
        summary: CompileSummary::default(),
    };
    for (index, ins) in list.iter().enumerate() {
        compiler.instruction(index, ins)?;
    }
    let summary = compiler.summary;
    postamble(out)?;

    info!(
        "Compiled {} instructions into {} motion lines ({} skipped, {} spindle wraps), about {:.1} minutes",
        list.len(),
        summary.motion_lines,
        summary.skipped,
        summary.wraps,
        summary.minutes
    );
    Ok(summary)
}

pub fn compile_to_string(list: &MotionList, machine: &Machine) -> Result<(String, CompileSummary)> {
    let mut buf = Vec::new();
    let summary = compile(list, machine, &mut buf)?;
    let text = String::from_utf8(buf).map_err(|e| Error::Parse(e.to_string()))?;
    Ok((text, summary))
}

/// Compile `list` and write it to `path` with the `.ngc` extension. The program is compiled in full before the file
/// is created, an existing file is never overwritten, and a file that fails part way through writing is removed.
pub fn write_program(path: &Path, list: &MotionList, machine: &Machine) -> Result<(PathBuf, CompileSummary)> {
    let path = path.with_extension(PROGRAM_EXTENSION);
    let mut buf = Vec::new();
    let summary = compile(list, machine, &mut buf)?;

    let file = OpenOptions::new().write(true).create_new(true).open(&path)?;
    let mut writer = BufWriter::new(file);
    let written = writer.write_all(&buf).and_then(|_| writer.flush());
    drop(writer);
    if let Err(e) = written {
        let _ = remove_file(&path);
        return Err(e.into());
    }
    info!("Wrote {}", path.display());
    Ok((path, summary))
}
