use std::path::PathBuf;
use std::process::ExitCode;

use emu_lib::{parse_listing, FileTrace, Processor, State};

use clap::Parser;
use clap_stdin::FileOrStdin;
use log::{error, info, LevelFilter};


/// PDP-11 Emulator
#[derive(Parser)]
#[command(about)]
struct Args {
    /// Program listing to execute (`-` for stdin)
    input: FileOrStdin,

    /// Write the memory transaction trace to this file
    #[arg(long)]
    trace: Option<PathBuf>,

    /// Stop after this many instructions
    #[arg(long)]
    max_steps: Option<u64>,

    /// Print the registers and condition codes when execution stops
    #[arg(long)]
    dump: bool,

    /// More logging; repeat for more
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    let level = match verbose {
        0 => None,
        1 => Some(LevelFilter::Info),
        2 => Some(LevelFilter::Debug),
        _ => Some(LevelFilter::Trace),
    };
    if let Some(level) = level {
        builder.filter_level(level);
    }
    builder.init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let listing = match args.input.contents() {
        Ok(listing) => listing,
        Err(e) => {
            error!("Can't read program: {e}");
            return ExitCode::FAILURE;
        },
    };
    let directives = match parse_listing(&listing) {
        Ok(directives) => directives,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        },
    };

    let mut cpu = match &args.trace {
        Some(path) => Processor::with_trace(FileTrace::create(path)),
        None => {
            let mut cpu = Processor::new();
            cpu.set_trace_enabled(false);
            cpu
        },
    };
    cpu.load_image(&directives);

    let mut state = State::Running;
    while !state.is_terminal() {
        if args.max_steps.is_some_and(|max| cpu.num_ins() >= max) {
            info!("Stopping after {} instructions", cpu.num_ins());
            break;
        }
        state = cpu.step();
    }
    cpu.flush_trace();

    if args.dump {
        println!("{}", cpu.registers());
    }
    info!("Executed {} instructions", cpu.num_ins());

    match state {
        State::Faulted(fault) => {
            error!("{fault}");
            ExitCode::FAILURE
        },
        _ => ExitCode::SUCCESS,
    }
}
