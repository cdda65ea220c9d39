use anyhow::{bail, Context, Result};
use clap::Parser;
use quintuple::{
    Machine, Outcome, ProgramLoader, ProgramManager, TraceLevel, DEFAULT_STEP_LIMIT, START_STATE,
};
use serde::Serialize;
use std::io::{self, Read};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Runs a single-tape Turing machine program on one or more input tapes.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
#[clap(after_help = "EXAMPLES:
  quintuple-cli --example div-three -i 110 -i 111
  quintuple-cli --program programs/unary-successor.tur -i 11 --trace 2
  cat programs/div-three.tur | quintuple-cli -i 1001 --json")]
struct Cli {
    /// The program file to execute (one `from sym to sym move` command per line)
    #[clap(short, long, conflicts_with = "example")]
    program: Option<PathBuf>,

    /// Name of an embedded program to execute instead of a file
    #[clap(short, long)]
    example: Option<String>,

    /// An input tape; repeat to run several inputs. An empty tape is used if omitted
    #[clap(short, long)]
    input: Vec<String>,

    /// The state every run starts in
    #[clap(short, long, default_value = START_STATE)]
    start: String,

    /// Trace level: 0 = silent, 1 = final configuration, 2 = every step
    #[clap(short, long, default_value_t = 0)]
    trace: u8,

    /// Give up after this many steps (0 = run until the machine halts)
    #[clap(short, long, default_value_t = DEFAULT_STEP_LIMIT)]
    max_steps: usize,

    /// Symbol used for grown tape cells
    #[clap(short, long)]
    blank: Option<char>,

    /// Print one JSON object per input instead of plain text
    #[clap(long)]
    json: bool,

    /// List the embedded programs and exit
    #[clap(short, long)]
    list: bool,

    /// Log level (trace, debug, info, warn, error)
    #[clap(long, default_value = "info")]
    log_level: String,
}

/// One line of `--json` output.
#[derive(Serialize)]
struct Report<'a> {
    input: &'a str,
    state: String,
    tape: String,
    steps: usize,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(io::stderr),
        )
        .init();

    if cli.list {
        for name in ProgramManager::list_program_names() {
            let info = ProgramManager::get_program_info(name)?;
            println!(
                "{:<18} {} ({} states, {} transitions)",
                info.name, info.description, info.state_count, info.transition_count
            );
        }
        return Ok(());
    }

    let mut machine = load_machine(&cli)?;
    if let Some(blank) = cli.blank {
        machine = machine.with_blank(blank);
    }

    let inputs = if cli.input.is_empty() {
        vec![String::new()]
    } else {
        cli.input.clone()
    };
    let limit = (cli.max_steps > 0).then_some(cli.max_steps);

    for input in &inputs {
        let mut trace = TraceLevel::from(cli.trace);
        let outcome = machine
            .execute(input.chars().collect(), &cli.start, &mut trace, limit)
            .with_context(|| format!("Input '{input}' did not halt"))?;

        print_outcome(input, outcome, cli.json)?;
    }

    Ok(())
}

/// Loads the machine from a file, an embedded program, or stdin, in that order.
fn load_machine(cli: &Cli) -> Result<Machine> {
    let program = if let Some(path) = &cli.program {
        ProgramLoader::load_program(path)?
    } else if let Some(name) = &cli.example {
        ProgramManager::get_program_by_name(name)?
    } else if atty::isnt(atty::Stream::Stdin) {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read program from stdin")?;
        ProgramLoader::load_program_from_string(&buffer)?
    } else {
        bail!("No program given: use --program, --example, or pipe a program on stdin");
    };

    tracing::debug!(transitions = program.len(), "program loaded");

    Ok(Machine::new(program))
}

fn print_outcome(input: &str, outcome: Outcome, json: bool) -> Result<()> {
    if json {
        let report = Report {
            input,
            tape: outcome.tape_string(),
            state: outcome.state,
            steps: outcome.steps,
        };
        println!("{}", serde_json::to_string(&report)?);
    } else {
        println!("Input {input} halted in state {}.", outcome.state);
        println!("{}", outcome.tape_string());
    }

    Ok(())
}
