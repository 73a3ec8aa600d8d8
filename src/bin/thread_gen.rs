///! G-code generator for single and multi-start 60 degree threads
use anyhow::{Context, Result};
use lathe::compiler::write_program;
use lathe::config::Machine;
use lathe::cuts::Thread;
use lathe::motion::MotionList;
use log::info;
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "thread_gen", about = "Generates thread cuts for a lathe")]
struct Opt {
    /// Threads per inch
    #[structopt(long)]
    tpi: f64,

    /// Number of thread starts
    #[structopt(long, default_value = "1")]
    starts: u32,

    /// Thread engagement, in percent
    #[structopt(long, default_value = "75")]
    percent: f64,

    /// Major diameter for external threads, bore diameter for internal ones, in inches
    #[structopt(long)]
    dia: f64,

    /// Length of thread, in inches
    #[structopt(long)]
    len: f64,

    /// Z position where the thread starts, in inches. The thread runs towards -z
    #[structopt(long, default_value = "0")]
    start_z: f64,

    /// Cut an internal thread
    #[structopt(long)]
    internal: bool,

    /// Max infeed per pass, in inches
    #[structopt(long, default_value = "0.005")]
    pass_depth: f64,

    /// Radial clearance when not cutting, in inches
    #[structopt(long, default_value = "0.05")]
    clearance: f64,

    /// Machine constants (TOML). Defaults are used when absent
    #[structopt(long, parse(from_os_str))]
    machine: Option<PathBuf>,

    /// Output file for the resulting G code
    #[structopt(short, long, parse(from_os_str))]
    output: PathBuf,
}

fn help_text(opt: &Opt, depth: f64) {
    let stock = if opt.internal { "bore" } else { "OD" };
    println!(
        "Before cut:
        - Create stock with {} {} in
        - Set home to the spindle axis at the start of the thread, z={}
        - Thread depth will be {:.4} in",
        stock, opt.dia, opt.start_z, depth
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
    let thread = Thread {
        tpi: opt.tpi,
        starts: opt.starts,
        percent: opt.percent,
        radius: opt.dia / 2.0,
        length: opt.len,
        start_z: opt.start_z,
        internal: opt.internal,
        pass_depth: opt.pass_depth,
        clearance: opt.clearance,
    };
    let form = thread.form()?;
    help_text(&opt, form.cut_depth);

    let mut list = MotionList::new();
    thread.generate(&mut list)?;

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
