use std::io::Write;
use log::info;
use colored::*;
use env_logger::Builder;
use clap::Args;
use clap::Parser;
use clap::ArgAction;
use anyhow::Result;
use anyhow::anyhow;

use rand::rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tl_network::ReactionNetwork;
use tl_kinetics::FixedTau;
use tl_kinetics::HighestOrderG;
use tl_kinetics::InitialTauEstimator;
use tl_kinetics::LeapBoundChecker;
use tl_kinetics::LeapController;
use tl_kinetics::LeapSimulator;
use tl_kinetics::RungeKuttaProjector;
use tl_kinetics::SpeciesTau;
use tl_kinetics::trajectory::Trajectory;
use tl_kinetics::trajectory_plotting::plot_populations;

use tauleap::network_parsers::read_network_input;
use tauleap::leap_parsers::BoundVariant;
use tauleap::leap_parsers::ClassifierArguments;
use tauleap::leap_parsers::LeapArguments;
use tauleap::leap_parsers::OutputParameters;

#[derive(Debug, Args)]
pub struct SimulationInput {
    /// Input file (JSON network description), or "-" for stdin
    #[arg(value_name = "INPUT", default_value = "-")]
    pub input: String,

    /// Verbosity (-v = info, -vv = debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Parser)]
#[command(name = "tl-simulate")]
#[command(version, about = "Adaptive tau-leaping for chemical reaction networks")]
pub struct Cli {
    #[command(flatten)]
    input: SimulationInput,

    #[command(flatten, next_help_heading = "Leap size control")]
    leap: LeapArguments,

    #[command(flatten, next_help_heading = "Reaction classification")]
    classes: ClassifierArguments,

    #[command(flatten, next_help_heading = "Output")]
    output: OutputParameters,
}

/// Either a user supplied first step size or the species-based estimate.
enum StartTau {
    Fixed(FixedTau),
    Species(SpeciesTau),
}

impl InitialTauEstimator for StartTau {
    fn initial_tau(&mut self, network: &ReactionNetwork) -> f64 {
        match self {
            StartTau::Fixed(t) => t.initial_tau(network),
            StartTau::Species(t) => t.initial_tau(network),
        }
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| {
            writeln!(buf, "{}", record.args())
        })
        .init();
}

fn run<C: LeapBoundChecker>(
    cli: &Cli,
    network: ReactionNetwork,
    controller: LeapController<C, RungeKuttaProjector, StartTau>,
) -> Result<()> {
    let classifier = cli.classes.build_classifier()?;
    let firing = cli.classes.build_firing();
    let mut rng = match cli.output.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rng()),
    };

    let mut trajectory = Trajectory::new(&cli.output.get_output_times(), &network);
    let mut simulator = LeapSimulator::new(network, controller, classifier, firing);
    let summary = simulator.simulate(&mut rng, cli.output.t_end, |t, tinc, x| {
        trajectory.record(t, tinc, x);
    })?;
    // The last output time is reached but not passed by the final step.
    if !trajectory.is_complete() {
        trajectory.record(summary.time, f64::INFINITY, &simulator.network().populations());
    }

    print!("{}", trajectory);

    info!("{} {:>10}", "leaps".green(), summary.leaps);
    info!("{} {:>10}", "exact".green(), summary.exact_steps);
    info!("{} {:>10}", "rollbacks".yellow(), summary.rollbacks);
    info!("{} {:>10}", "shrinks".yellow(), summary.stats.shrinks);
    info!("{} {:?}", "verdicts".cyan(), (summary.stats.substantial, summary.stats.barely, summary.stats.rejected));

    if let Some(path) = &cli.output.trajectory {
        trajectory.write_json(path)?;
        info!("Wrote trajectory to {}", path.cyan());
    }
    if let Some(path) = &cli.output.plot {
        let title = format!("tl-simulate ({} leaps)", summary.leaps);
        plot_populations(&trajectory, path, &title).map_err(|e| anyhow!("{}", e))?;
        info!("Wrote plot to {}", path.cyan());
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.input.verbose);

    let params = cli.leap.build_parameters()?;
    cli.output.validate()?;

    let network = read_network_input(&cli.input.input)?;
    println!("{}", format!("{} species, {} reactions",
        network.num_species(), network.num_reactions()).yellow());
    info!("{}", network);

    let projector = RungeKuttaProjector::from(cli.leap.integrator.tableau());
    let initial = match cli.leap.tau0 {
        Some(tau0) => StartTau::Fixed(FixedTau(tau0)),
        None => StartTau::Species(SpeciesTau::new(params.eps(), HighestOrderG)),
    };

    match cli.leap.variant {
        BoundVariant::Rb => {
            let controller = LeapController::reaction_bound(params, projector, initial);
            run(&cli, network, controller)
        }
        BoundVariant::Sb => {
            let controller = LeapController::species_bound(params, HighestOrderG, projector, initial);
            run(&cli, network, controller)
        }
    }
}
