use springsim::{ScenarioConfig, Scenario, SimulationHandle, Command, Event, AnalyticalSolution, Parameters, Mode, DT};
use springsim::{bench_step, bench_energy_drift};

use clap::Parser;
use anyhow::Result;

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short, default_value = "underdamped_1d.yaml")]
    file_name: String,

    /// Print every event as one JSON object per line
    #[arg(long)]
    json: bool,

    /// Run the step and energy-drift benchmarks instead of a scenario
    #[arg(long)]
    bench: bool,
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name);
    let file = File::open(&config_path)?;
    let reader = BufReader::new(file);
    let scenario_cfg: ScenarioConfig = serde_yaml::from_reader(reader)?;

    Ok(scenario_cfg)
}

/// Numeric coordinate the closed form describes: axis in 1D, radius in VECTOR mode
fn observed(params: &Parameters, position: &springsim::Vec2) -> f64 {
    match params.mode {
        Mode::OneD => position.x,
        Mode::Vector => position.x.hypot(position.y),
    }
}

fn run(scenario: Scenario, json: bool) -> Result<()> {
    let handle = SimulationHandle::spawn(scenario.runtime)?;
    handle.submit(scenario.start_command())?;

    let mut params = scenario.parameters;
    let mut script = scenario.script.iter().peekable();
    let mut analytical: Option<AnalyticalSolution> = None;
    let mut elapsed = 0.0;
    let mut running = true;
    let mut next_report = 0.0;

    // ticks arrive at tick_hz, anything much slower means the context is stuck
    let timeout = Duration::from_secs(5);

    while elapsed < scenario.t_end {
        let event = handle.events().recv_timeout(timeout)?;
        if json {
            println!("{}", event.to_json()?);
        }

        match event {
            Event::Started { analytical: a } | Event::ParamsUpdated { analytical: a } => analytical = Some(a),
            Event::AnalyticalUpdated { analytical: a, .. } => analytical = Some(a),
            Event::Step { position, time, .. } => {
                elapsed += DT;

                if !json && elapsed >= next_report {
                    let predicted = analytical.map(|a| params.equilibrium() + a.displacement(time));
                    println!(
                        "t = {:7.3} s, numeric = {:9.6}, analytical = {}",
                        elapsed,
                        observed(&params, &position),
                        predicted.map_or("-".to_string(), |p| format!("{:9.6}", p))
                    );
                    next_report += 0.5;
                }

                while let Some(scripted) = script.next_if(|s| s.at <= elapsed) {
                    match &scripted.command {
                        Command::Start { params: p, .. }
                        | Command::Reset { params: p, .. }
                        | Command::UpdateParams { params: p, .. } => params = *p,
                        _ => {}
                    }
                    handle.submit(scripted.command.clone())?;
                }
            }
            Event::Stopped => {
                running = false;
                break;
            }
            Event::Error { message } => eprintln!("context error: {}", message),
            Event::Ready { test_result } => {
                if !json {
                    println!("{}", test_result);
                }
            }
        }
    }

    if running {
        handle.submit(Command::Stop)?;
    }
    if let (false, Some(a)) = (json, analytical) {
        println!("regime = {:?}, zeta = {:.4}, omega_n = {:.4}", a.regime(), a.zeta(), a.omega_n());
    }

    handle.shutdown()?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.bench {
        bench_step();
        bench_energy_drift();
        return Ok(());
    }

    let scenario_cfg = load_scenario_from_yaml(&args.file_name)?;
    let scenario = Scenario::build_scenario(scenario_cfg)?;

    run(scenario, args.json)
}
