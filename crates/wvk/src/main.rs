use std::io::{self, Read};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand};
use log::info;

use wvk_core::prefix::Prefix;
use wvk_core::search::{SearchOutcome, SearchState, DEFAULT_BATCH_SIZE};

#[derive(Parser)]
#[command(name = "wvk", about = "WireGuard Curve25519 vanity public-key finder")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for an offset n such that Montgomery(P + n*O) starts with PREFIX.
    Offset {
        public_key: String,
        prefix: String,
        skip: u64,
        /// 0 means unlimited.
        limit: u64,
        #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
        batch_size: usize,
        /// Suppress the stderr timing summary.
        #[arg(long)]
        quiet: bool,
    },
    /// Reconstruct the private scalar for a verified offset, reading the
    /// base private scalar (44 base64 characters) from stdin.
    Add { offset: u64, prefix: String },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let code = match cli.command {
        Commands::Offset { public_key, prefix, skip, limit, batch_size, quiet } => {
            run_offset(&public_key, &prefix, skip, limit, batch_size, quiet)
        }
        Commands::Add { offset, prefix } => run_add(offset, &prefix),
    };

    ExitCode::from(code)
}

fn run_offset(public_key: &str, prefix: &str, skip: u64, limit: u64, batch_size: usize, quiet: bool) -> u8 {
    if batch_size == 0 || batch_size % 2 != 0 {
        eprintln!("--batch-size must be even and greater than zero");
        return 2;
    }

    let prefix = match Prefix::parse(prefix) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{e}");
            return 2;
        }
    };

    let victim = match wvk_core::decode_public_key(public_key) {
        Ok(v) => v,
        Err(wvk_core::Error::PublicKeyNotOnCurve) => {
            eprintln!("Invalid public key");
            return 1;
        }
        Err(e) => {
            eprintln!("{e}");
            return 2;
        }
    };

    let running = Arc::new(AtomicBool::new(true));
    install_sigint_handler(&running);

    info!("starting search: skip={skip} limit={limit} batch_size={batch_size}");
    let mut state = SearchState::new(victim, prefix, skip, limit, batch_size);

    let start = Instant::now();
    let outcome = state.run(&running);
    let elapsed = start.elapsed();

    match outcome {
        SearchOutcome::Found(n) => {
            println!("{n}");
            if !quiet {
                print_timing(elapsed, (n - skip) + 1);
            }
            0
        }
        SearchOutcome::LimitExhausted => {
            if !quiet {
                print_timing(elapsed, limit);
            }
            0
        }
        SearchOutcome::Interrupted => {
            eprintln!("interrupted");
            3
        }
    }
}

fn run_add(offset: u64, prefix: &str) -> u8 {
    let prefix = match Prefix::parse(prefix) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{e}");
            return 2;
        }
    };

    let mut input = String::new();
    if io::stdin().read_to_string(&mut input).is_err() {
        eprintln!("failed to read private scalar from stdin");
        return 2;
    }
    let scalar_text = input.trim();

    let scalar = match wvk_core::apply::decode_scalar(scalar_text) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{e}");
            return 2;
        }
    };

    match wvk_core::apply::apply_offset(&scalar, offset, &prefix) {
        Ok(encoded) => {
            println!("{encoded}");
            0
        }
        Err(wvk_core::Error::PrefixMismatch) => {
            eprintln!("Prefix mismatch");
            1
        }
        Err(e) => {
            eprintln!("{e}");
            2
        }
    }
}

fn print_timing(elapsed: std::time::Duration, attempts: u64) {
    let secs = elapsed.as_secs_f64();
    let rate = if secs > 0.0 { attempts as f64 / secs } else { 0.0 };
    eprintln!("{secs:.2}s, {rate:.0} attempts/sec");
}

/// Ctrl+C handling, mirroring the pattern this codebase already uses for
/// its mining loop: a process-wide `AtomicUsize` holds the address of the
/// `AtomicBool` the signal handler should flip, since a C signal handler
/// cannot close over anything.
static RUNNING_FLAG: AtomicUsize = AtomicUsize::new(0);

fn install_sigint_handler(running: &Arc<AtomicBool>) {
    #[cfg(unix)]
    unsafe {
        libc::signal(libc::SIGINT, handle_sigint as *const () as libc::sighandler_t);
        RUNNING_FLAG.store(running.as_ref() as *const AtomicBool as usize, Ordering::SeqCst);
    }
    #[cfg(not(unix))]
    {
        let _ = running;
    }
}

#[cfg(unix)]
extern "C" fn handle_sigint(_: libc::c_int) {
    let ptr = RUNNING_FLAG.load(Ordering::SeqCst);
    if ptr != 0 {
        let flag = unsafe { &*(ptr as *const AtomicBool) };
        flag.store(false, Ordering::Relaxed);
    }
}
