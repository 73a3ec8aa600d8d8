///! G-code generator for rosette cuts: a pattern repeated around the work as the spindle turns
///!
///! The pattern is one repeat of the rosette, digitized as a profile (x across one repeat, y the displacement). Without
///! a pattern file a rounded petal is used.
use anyhow::{Context, Result};
use lathe::compiler::write_program;
use lathe::config::{Machine, Profile};
use lathe::curve::{Curve, FitStyle};
use lathe::cuts::{Rosette, RosetteAxis};
use lathe::motion::MotionList;
use log::info;
use nalgebra::geometry::Point2;
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "rosette_gen",
    about = "Generates rosette cuts for an ornamental lathe"
)]
struct Opt {
    /// Profile (.toml or .svg) holding one repeat of the pattern
    #[structopt(long, parse(from_os_str))]
    pattern: Option<PathBuf>,

    /// Radius the cutter works at, in inches
    #[structopt(long)]
    radius: f64,

    /// Pattern displacement at full scale, in inches
    #[structopt(long, default_value = "0.02")]
    amplitude: f64,

    /// Number of pattern repeats per revolution
    #[structopt(long, default_value = "12")]
    repeats: u32,

    /// Rotation of the pattern, in degrees
    #[structopt(long, default_value = "0")]
    phase: f64,

    /// Z position of the surface being cut, in inches
    #[structopt(long, default_value = "0")]
    surface_z: f64,

    /// Total depth of cut, in inches
    #[structopt(long, default_value = "0.01")]
    depth: f64,

    /// Max depth of each coarse pass, in inches
    #[structopt(long, default_value = "0.004")]
    pass_depth: f64,

    /// Depth left for the fine pass, in inches. 0 for no fine pass
    #[structopt(long, default_value = "0.001")]
    finish_depth: f64,

    /// Spindle steps per revolution
    #[structopt(long, default_value = "720")]
    steps: u32,

    /// Clearance from the work when not cutting, in inches
    #[structopt(long, default_value = "0.05")]
    clearance: f64,

    /// Cut the side of the work (radial) or its face (axial)
    #[structopt(long, default_value = "radial")]
    axis: RosetteAxis,

    /// Machine constants (TOML). Defaults are used when absent
    #[structopt(long, parse(from_os_str))]
    machine: Option<PathBuf>,

    /// Output file for the resulting G code
    #[structopt(short, long, parse(from_os_str))]
    output: PathBuf,
}

/// Two quarter ellipses making a round-topped petal
fn petal() -> Curve {
    Curve::with_points(
        FitStyle::Trig,
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 1.0),
            Point2::new(0.5, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 0.0),
        ],
    )
}

fn help_text(opt: &Opt) {
    let surface = match opt.axis {
        RosetteAxis::Radial => "side",
        RosetteAxis::Axial => "face",
    };
    println!(
        "Before cut:
        - Turn the work to radius {} in
        - Touch the cutter off the {} of the work and set that as x={}, z={}
        - Index the spindle to c=0",
        opt.radius, surface, opt.radius, opt.surface_z
    )
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let opt = Opt::from_args();
    help_text(&opt);

    let machine = match &opt.machine {
        Some(path) => Machine::load(path)
            .with_context(|| format!("reading machine file {}", path.display()))?,
        None => Machine::default(),
    };
    let mut pattern = match &opt.pattern {
        Some(path) => Profile::load(path)
            .and_then(|p| p.curve())
            .with_context(|| format!("reading pattern {}", path.display()))?,
        None => petal(),
    };

    let rosette = Rosette {
        radius: opt.radius,
        amplitude: opt.amplitude,
        repeats: opt.repeats,
        phase: opt.phase,
        surface_z: opt.surface_z,
        depth: opt.depth,
        pass_depth: opt.pass_depth,
        finish_depth: opt.finish_depth,
        steps: opt.steps,
        clearance: opt.clearance,
        axis: opt.axis,
    };
    let mut list = MotionList::new();
    list.comment(format!(
        "Rosette, {} repeats at radius {}",
        opt.repeats, opt.radius
    ));
    rosette.generate(&mut pattern, &mut list)?;

    let (path, summary) = write_program(&opt.output, &list, &machine)
        .with_context(|| format!("writing {}", opt.output.display()))?;
    info!(
        "{}: {} lines, about {:.1} minutes",
        path.display(),
        summary.motion_lines,
        summary.minutes
    );
    Ok(())
}
