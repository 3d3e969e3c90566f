use clap::Parser;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};
use std::error::Error;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use turtrace::{
    Event, ProgramLoader, ProgramManager, Scheduler, Session, Settings, TraceRecord,
    MAX_EXECUTION_STEPS, PROGRAMS,
};

/// How often the paced run feeds the scheduler a tick.
const TICK_CADENCE: Duration = Duration::from_millis(5);

/// Runs a single-tape Turing machine and prints one line per transition.
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(after_help = "EXAMPLES:
  turtrace --program programs/unary-fill.tm --tape \"1 1 0\"
  turtrace --example binary-increment --fps 4
  echo \"0(1) => -1(0) S\" | turtrace --tape 1")]
struct Cli {
    /// Instruction file to execute. Instructions are read from stdin when piped.
    #[clap(short, long)]
    program: Option<PathBuf>,

    /// Run a built-in program by name (see --list).
    #[clap(short, long, conflicts_with = "program")]
    example: Option<String>,

    /// JSON settings file providing instructions, tape, blank and rate limit.
    #[clap(short, long)]
    settings: Option<PathBuf>,

    /// Whitespace-separated tape seed.
    #[clap(short, long)]
    tape: Option<String>,

    /// Symbol used to extend the tape.
    #[clap(short, long)]
    blank: Option<String>,

    /// Pace the run through the scheduler at this many steps per second.
    #[clap(short, long)]
    fps: Option<f64>,

    /// Stop after this many steps if the machine has not halted.
    #[clap(short, long, default_value_t = MAX_EXECUTION_STEPS)]
    max_steps: usize,

    /// Print records as JSON lines.
    #[clap(short, long)]
    json: bool,

    /// List the built-in programs and exit.
    #[clap(short, long)]
    list: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    if cli.list {
        for program in PROGRAMS.iter() {
            println!("{:<18} {}", program.name, program.description);
        }
        return;
    }

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    if let Err(e) = TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("Failed to initialize logger: {}", e);
    }
}

/// Merges the settings file, the selected program and the command-line overrides.
///
/// Instructions come from `--program`, then `--example`, then stdin when piped, then the
/// settings file or its defaults.
fn resolve_settings(cli: &Cli) -> Result<Settings, Box<dyn Error>> {
    let mut settings = match &cli.settings {
        Some(path) => ProgramLoader::load_settings(path)?,
        None => Settings::default(),
    };

    if let Some(name) = &cli.example {
        settings = ProgramManager::get_program_by_name(name)?.settings(settings);
    }

    if let Some(path) = &cli.program {
        settings.instructions = ProgramLoader::read_program(path)?;
    } else if cli.example.is_none() && cli.settings.is_none() && atty::isnt(atty::Stream::Stdin)
    {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| format!("Failed to read from stdin: {}", e))?;
        settings.instructions = buffer;
    }

    if let Some(tape) = &cli.tape {
        settings.tape = tape.clone();
    }
    if let Some(blank) = &cli.blank {
        settings.blank = blank.clone();
    }
    if let Some(fps) = cli.fps {
        settings.rate_limit = fps;
        settings.auto = true;
    }

    settings.validate()?;
    Ok(settings)
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let settings = resolve_settings(cli)?;
    let mut session = Session::from_settings(&settings);
    session.compile(&settings.instructions, &settings.tape)?;

    let mut print = |record: &TraceRecord| -> Result<(), Box<dyn Error>> {
        if cli.json {
            println!("{}", serde_json::to_string(record)?);
        } else {
            println!("{}", record);
        }
        Ok(())
    };

    let steps = match pacing(cli, &settings) {
        Some(rate_limit) => run_paced(&mut session, rate_limit, cli.max_steps, &mut print)?,
        None => run_unpaced(&mut session, cli.max_steps, &mut print)?,
    };

    let halted = session.execution().is_some_and(|e| e.is_halted());
    let tape = session
        .execution()
        .map(|e| e.tape().snapshot())
        .unwrap_or_default();

    if cli.json {
        let summary = serde_json::json!({ "halted": halted, "steps": steps, "tape": tape });
        println!("{}", summary);
    } else {
        if halted {
            println!("\nMachine halted after {} steps.", steps);
        } else {
            println!("\nStopped after {} steps without halting.", steps);
        }
        println!("{}", tape.join(" "));
    }

    Ok(())
}

/// The rate a run is paced at, if any.
///
/// Runs are paced when `--fps` is given or the settings came from a file, and only while
/// auto mode is on. Otherwise records are stepped through one after another.
fn pacing(cli: &Cli, settings: &Settings) -> Option<f64> {
    let configured = cli.fps.is_some() || cli.settings.is_some();
    if configured && !settings.auto {
        log::info!("Auto mode is off, stepping records manually");
    }
    (configured && settings.auto).then_some(settings.rate_limit)
}

/// Pulls records as fast as possible.
fn run_unpaced(
    session: &mut Session,
    max_steps: usize,
    print: &mut impl FnMut(&TraceRecord) -> Result<(), Box<dyn Error>>,
) -> Result<usize, Box<dyn Error>> {
    let mut steps = 0;

    while steps < max_steps {
        match session.next_record()? {
            Some(record) => {
                steps += 1;
                print(&record)?;
            }
            None => break,
        }
    }

    Ok(steps)
}

/// Pulls one record per scheduler render, feeding the scheduler ticks from a real clock.
fn run_paced(
    session: &mut Session,
    rate_limit: f64,
    max_steps: usize,
    print: &mut impl FnMut(&TraceRecord) -> Result<(), Box<dyn Error>>,
) -> Result<usize, Box<dyn Error>> {
    let (sender, receiver) = mpsc::channel();
    let mut scheduler = Scheduler::with_rate_limit(rate_limit)?;
    scheduler.subscribe(move |event| {
        if let Err(e) = sender.send(event) {
            log::trace!("Dropped scheduler event: {}", e);
        }
    });

    scheduler.launch();

    let start = Instant::now();
    let mut steps = 0;

    while session.is_auto() && !session.is_finished() && steps < max_steps {
        scheduler.tick(start.elapsed());

        for event in receiver.try_iter() {
            if event == Event::Initialize {
                log::debug!("Scheduler initialized, first record on next render");
            }
            if let Some(record) = session.handle(event)? {
                steps += 1;
                print(&record)?;
            }
        }

        thread::sleep(TICK_CADENCE);
    }

    scheduler.pause();
    log::info!(
        "Paced run produced {} records in {:?} (last rate {:.2} steps/s)",
        steps,
        scheduler.elapsed(),
        scheduler.measured_rate()
    );

    Ok(steps)
}
