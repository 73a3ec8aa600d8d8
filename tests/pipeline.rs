use approx::assert_abs_diff_eq;
use lathe::compiler::{compile_to_string, write_program};
use lathe::config::{Machine, Profile};
use lathe::cuts::{Contour, Rosette, RosetteAxis, Thread};
use lathe::cutter::{cutter_path, Cutter, CutterSetup, Location};
use lathe::motion::{MotionInstruction, MotionList};

const VASE: &str = r#"
fit = "bezier"
thickness = 0.1
surface = "outside"
resolution = 0.05
points = [[0.0, 1.0], [0.5, 1.3], [1.0, 1.0], [1.5, 0.8], [2.0, 1.1]]
"#;

fn setup(profile: &Profile) -> CutterSetup {
    CutterSetup {
        cutter: Cutter::disc(0.05, "front-outside".parse::<Location>().unwrap()),
        surface: profile.surface,
        thickness: profile.thickness,
    }
}

#[test]
fn test_outline_to_contour_program() {
    let profile = Profile::from_toml(VASE).unwrap();
    let mut surface = profile.curve().unwrap();
    let setup = setup(&profile);

    // The cutter path stays a cutter radius clear of the surface
    let mut path = cutter_path(&mut surface, &setup);
    for p in path.samples().iter().step_by(5) {
        let nearest = surface
            .samples()
            .iter()
            .map(|s| (s - p).norm())
            .fold(f64::INFINITY, f64::min);
        assert_abs_diff_eq!(nearest, 0.05, epsilon = 0.01);
    }

    let contour = Contour {
        allowance: 0.02,
        passes: 2,
        reverse: false,
        divisions: 4,
        clearance: 0.05,
        start_angle: 0.0,
    };
    let mut list = MotionList::new();
    contour.generate(&mut surface, &setup, &mut list).unwrap();
    let (text, summary) = compile_to_string(&list, &Machine::default()).unwrap();

    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(&lines[..2], &["g20", "g90"]);
    assert_eq!(&lines[lines.len() - 2..], &["g92.1", "m2"]);
    assert!(lines.iter().any(|l| l.starts_with("; Division 4 of 4")));
    // Contour moves are two-axis, spindle indexing is inverse time
    assert!(lines.iter().any(|l| l.starts_with("g94 g1") && l.ends_with("f5.00")));
    assert!(lines.iter().any(|l| l.starts_with("g94 g1") && l.ends_with("f20.00")));
    assert!(lines.iter().any(|l| l.starts_with("g93 g1") && l.contains(" c90.00 ")));
    // Every positioning instruction either emitted a line or was suppressed; wraps with nothing to do emit nothing
    let wrap_instructions = list
        .iter()
        .filter(|i| matches!(i, MotionInstruction::WrapSpindle))
        .count();
    assert_eq!(
        summary.motion_lines + summary.skipped + wrap_instructions - summary.wraps,
        list.motion_count()
    );
    assert!(summary.minutes > 0.0);
}

#[test]
fn test_thread_program_wraps_the_spindle() {
    let thread = Thread {
        tpi: 20.0,
        starts: 2,
        percent: 60.0,
        radius: 0.25,
        length: 0.5,
        start_z: 0.0,
        internal: false,
        pass_depth: 0.02,
        clearance: 0.05,
    };
    let mut list = MotionList::new();
    thread.generate(&mut list).unwrap();
    let (text, summary) = compile_to_string(&list, &Machine::default()).unwrap();

    // Two passes of two starts, each helix five turns
    let helices: Vec<&str> = text
        .lines()
        .filter(|l| l.contains("c1800.00") || l.contains("c1980.00"))
        .collect();
    assert_eq!(helices.len(), 4);
    assert!(helices.iter().all(|l| l.starts_with("g93 g1")));
    assert_eq!(summary.wraps, 4);
    assert!(text.lines().any(|l| l == "g92 c0.00"));
    assert!(text.lines().any(|l| l == "g92 c-180.00"));
}

#[test]
fn test_rosette_program_file() {
    let mut pattern = Profile::from_toml(
        "fit = \"straight\"\npoints = [[0.0, 0.0], [0.5, 1.0], [1.0, 0.0]]",
    )
    .unwrap()
    .curve()
    .unwrap();
    let rosette = Rosette {
        radius: 0.75,
        amplitude: 0.01,
        repeats: 6,
        phase: 0.0,
        surface_z: 0.0,
        depth: 0.01,
        pass_depth: 0.005,
        finish_depth: 0.0,
        steps: 360,
        clearance: 0.05,
        axis: RosetteAxis::Radial,
    };
    let mut list = MotionList::new();
    rosette.generate(&mut pattern, &mut list).unwrap();

    let dir = std::env::temp_dir().join(format!("rose_engine_pipeline_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    let (path, summary) =
        write_program(&dir.join("rosette.txt"), &list, &Machine::default()).unwrap();
    assert_eq!(path.extension().unwrap(), "ngc");
    let text = std::fs::read_to_string(&path).unwrap();
    let comments = list.len() - list.motion_count();
    assert_eq!(text.lines().count(), summary.motion_lines + comments + 4);
    // Existing programs are never overwritten
    assert!(write_program(&path, &list, &Machine::default()).is_err());
    std::fs::remove_dir_all(&dir).unwrap();
}
