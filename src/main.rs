use orbsim::{bench_envelope, bench_orbiter_step};
use orbsim::{load_scenario, CapturePhase, OrbitEvent, Scenario};

use anyhow::Result;
use clap::Parser;

use std::path::PathBuf;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short, default_value = "solar.yaml")]
    file_name: String,

    /// Run the micro-benchmarks instead of a scenario
    #[arg(long)]
    bench: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if args.bench {
        bench_envelope();
        bench_orbiter_step();
        return Ok(());
    }

    let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("scenarios")
        .join(&args.file_name);
    let config = load_scenario(&config_path)?;
    let mut scenario = Scenario::build(config)?;

    let dt = scenario.params.fixed_dt;
    let steps = (scenario.params.t_end / dt).ceil() as u64;
    let report_every = (1.0 / dt).round().max(1.0) as u64;

    for step in 0..steps {
        // Rails first so the physics step sees current attractor frames
        scenario.advance_frame(dt);
        scenario.step_physics();

        for event in scenario.orbiter.drain_events() {
            match event {
                OrbitEvent::Entered(id) => {
                    let kind = scenario
                        .system
                        .get(id)
                        .map(|a| a.kind.label())
                        .unwrap_or("unknown");
                    log::info!("t = {:.2}: entered orbit of {} {:?}", scenario.system.t, kind, id);
                }
                OrbitEvent::Exited(id) => {
                    log::info!("t = {:.2}: left orbit of {:?}", scenario.system.t, id);
                }
            }
        }

        if step % report_every == 0 {
            let phase = match scenario.orbiter.capture().phase() {
                CapturePhase::Uncaptured => "free",
                CapturePhase::Captured => "captured",
                CapturePhase::Detaching => "detaching",
            };
            let kind = scenario
                .orbiter
                .captured_kind(&scenario.system)
                .map(|k| k.label())
                .unwrap_or("-");
            let position = scenario.orbiter.position();
            println!(
                "t = {:6.2} | {:9} ({:6}) | speed = {:5.2} | pos = ({:7.2}, {:7.2})",
                scenario.system.t,
                phase,
                kind,
                scenario.orbiter.speed(),
                position.x,
                position.y
            );
        }
    }

    Ok(())
}
