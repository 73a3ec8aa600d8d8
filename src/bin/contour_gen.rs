///! G-code generator for contour cuts: the cutter follows a digitized profile, optionally at several spindle indexes
///!
///! The profile is digitized along the work (x along the bed, y the radius). The cutter path is offset from it by the
///! cutter radius, plus the material thickness when cutting the surface that wasn't digitized.
use anyhow::{Context, Result};
use lathe::compiler::write_program;
use lathe::config::{Machine, Profile};
use lathe::curve::FitStyle;
use lathe::cuts::Contour;
use lathe::cutter::{Cutter, CutterSetup, Location, Side};
use lathe::motion::MotionList;
use log::info;
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "contour_gen",
    about = "Generates contour-following cuts for an ornamental lathe"
)]
struct Opt {
    /// Digitized profile, .toml or .svg
    #[structopt(long, parse(from_os_str))]
    profile: PathBuf,

    /// Override the profile's fit style (straight, bezier, trig, raw)
    #[structopt(long)]
    fit: Option<FitStyle>,

    /// Override the profile's material thickness, in inches
    #[structopt(long)]
    thickness: Option<f64>,

    /// Override which surface the profile was digitized on (inside, outside)
    #[structopt(long)]
    surface: Option<Side>,

    /// Radius of the cutter, in inches
    #[structopt(long, default_value = "0.0625")]
    cutter_radius: f64,

    /// Where the cutter is mounted: front-outside, front-inside, back-outside or back-inside
    #[structopt(long, default_value = "front-outside")]
    location: Location,

    /// Stock left by the first pass, in inches
    #[structopt(long, default_value = "0.01")]
    allowance: f64,

    /// Number of passes, the last one on the final path
    #[structopt(long, default_value = "3")]
    passes: u32,

    /// Cut from the last profile point to the first
    #[structopt(long)]
    reverse: bool,

    /// Number of equally spaced spindle positions to cut at
    #[structopt(long, default_value = "1")]
    divisions: u32,

    /// Spindle angle of the first division, in degrees
    #[structopt(long, default_value = "0")]
    start_angle: f64,

    /// Clearance from the work when not cutting, in inches
    #[structopt(long, default_value = "0.05")]
    clearance: f64,

    /// Machine constants (TOML). Defaults are used when absent
    #[structopt(long, parse(from_os_str))]
    machine: Option<PathBuf>,

    /// Output file for the resulting G code
    #[structopt(short, long, parse(from_os_str))]
    output: PathBuf,
}

fn help_text(opt: &Opt, profile: &Profile) {
    println!(
        "Before cut:
        - Mount a {} in radius cutter {}
        - Set x=0 on the spindle axis and z=0 at the profile's origin
        - Profile was digitized on the {:?} surface, material {} in thick",
        opt.cutter_radius, opt.location, profile.surface, profile.thickness
    )
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let opt = Opt::from_args();

    let machine = match &opt.machine {
        Some(path) => Machine::load(path)
            .with_context(|| format!("reading machine file {}", path.display()))?,
        None => Machine::default(),
    };
    let mut profile = Profile::load(&opt.profile)
        .with_context(|| format!("reading profile {}", opt.profile.display()))?;
    if let Some(fit) = opt.fit {
        profile.fit = fit;
    }
    if let Some(thickness) = opt.thickness {
        profile.thickness = thickness;
    }
    if let Some(surface) = opt.surface {
        profile.surface = surface;
    }
    help_text(&opt, &profile);

    let mut surface = profile.curve()?;
    let setup = CutterSetup {
        cutter: Cutter::disc(opt.cutter_radius, opt.location),
        surface: profile.surface,
        thickness: profile.thickness,
    };
    let contour = Contour {
        allowance: opt.allowance,
        passes: opt.passes,
        reverse: opt.reverse,
        divisions: opt.divisions,
        clearance: opt.clearance,
        start_angle: opt.start_angle,
    };
    let mut list = MotionList::new();
    list.comment(format!("Contour of {}", opt.profile.display()));
    contour.generate(&mut surface, &setup, &mut list)?;

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
