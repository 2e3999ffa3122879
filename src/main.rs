//! Globfield demo entry point
//!
//! Scatters participants over two blobs, merges them, splits them again and
//! logs every committed transition. Pass `--dump` to print the final frame's
//! draw commands as JSON.

use std::env;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use globfield::sim::FrameReport;
use globfield::{BlobField, Color, Commit, MotionPreset, Recorder, Settings, SimError, Stage};

/// Frames allowed per transition before the demo gives up
const MAX_FRAMES: u32 = 2000;
const PARTICIPANTS_PER_BLOB: usize = 6;

struct Options {
    seed: u64,
    preset: MotionPreset,
    dump: bool,
}

fn parse_args() -> Options {
    let mut options = Options {
        seed: 7,
        preset: MotionPreset::default(),
        dump: false,
    };
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--dump" => options.dump = true,
            "--seed" => match args.next().and_then(|s| s.parse().ok()) {
                Some(seed) => options.seed = seed,
                None => log::warn!("--seed expects an integer"),
            },
            "--preset" => match args.next().as_deref().and_then(MotionPreset::parse) {
                Some(preset) => options.preset = preset,
                None => log::warn!("--preset expects gentle, normal or snappy"),
            },
            other => log::warn!("Ignoring unknown argument {other}"),
        }
    }
    options
}

/// Run frames until a commit shows up
fn run_until_commit(
    stage: &mut Stage,
    field: &mut BlobField,
    surface: &mut Recorder,
) -> Result<Option<Commit>, SimError> {
    for _ in 0..MAX_FRAMES {
        surface.clear();
        let FrameReport { frame, commits, .. } = stage.frame(field, surface)?;
        if let Some(commit) = commits.into_iter().next() {
            log::info!("Frame {frame}: {commit:?}");
            return Ok(Some(commit));
        }
    }
    log::warn!("No commit after {MAX_FRAMES} frames");
    Ok(None)
}

fn run(options: &Options) -> Result<(), SimError> {
    let mut stage = Stage::new();
    let mut field = BlobField::new(Settings::from_preset(options.preset), &mut stage);
    let mut rng = Pcg32::seed_from_u64(options.seed);

    let blobs = [
        ("A", Vec2::new(-180.0, 0.0), 100.0, Color::from_hex(0xe4572e)),
        ("B", Vec2::new(180.0, 0.0), 100.0, Color::from_hex(0x29335c)),
    ];
    for (key, center, radius, color) in blobs {
        field.add_glob(key, center, radius, color, &mut stage)?;
        for _ in 0..PARTICIPANTS_PER_BLOB {
            let angle = rng.random_range(0.0..std::f32::consts::TAU);
            let dist = rng.random_range(0.0..radius * 0.6);
            field.spawn_participant(key, center + globfield::polar_to_cartesian(dist, angle))?;
        }
    }
    log::info!(
        "Seed {} preset {}: {} blobs, {} participants each",
        options.seed,
        options.preset.as_str(),
        blobs.len(),
        PARTICIPANTS_PER_BLOB
    );

    let mut surface = Recorder::new();

    let key = field.combine_globs("A", "B", None, None, &mut stage)?;
    run_until_commit(&mut stage, &mut field, &mut surface)?;

    field.split_globs(&key, &["B"], None, None, &mut stage)?;
    run_until_commit(&mut stage, &mut field, &mut surface)?;

    for (key, point) in field.points() {
        if let Some(blob) = point.as_steady() {
            log::info!(
                "{key}: r={:.2} at ({:.1}, {:.1}) with {} participants",
                blob.radius,
                blob.position.x,
                blob.position.y,
                blob.simulator.len()
            );
        }
    }

    if options.dump {
        println!("{}", surface.to_json()?);
    }

    field.dispose(&mut stage);
    Ok(())
}

fn main() {
    env_logger::init();
    log::info!("Globfield demo starting...");
    let options = parse_args();
    if let Err(e) = run(&options) {
        log::error!("Demo aborted: {e}");
        std::process::exit(1);
    }
}
