use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use stagedwrite::api::errors::{exit_code_for, id_str, ErrorId};
use stagedwrite::logging::LogSink;
use stagedwrite::policy::Policy;
use stagedwrite::types::parse_mode;
use stagedwrite::{AtomicWriter, CancelToken, WriteError, WriteReport, WriteRequest};
use tokio::signal::unix::{signal, Signal, SignalKind};

/// Atomically replace TARGET with the contents of INPUT.
#[derive(Debug, Parser)]
#[command(name = "stagedwrite", version, about)]
struct Cli {
    /// File to create or replace
    target: PathBuf,

    /// Read content from this file; `-` reads stdin
    #[arg(short, long, default_value = "-")]
    input: String,

    /// Reject the write unless more than this many bytes were written
    #[arg(long, value_name = "BYTES")]
    min_size: Option<u64>,

    /// Verify the staged file against a digest computed while writing
    #[arg(long)]
    checksum: bool,

    /// Verify the staged file against this hex digest instead
    #[arg(long, value_name = "HEX")]
    expected_checksum: Option<String>,

    /// Raw transfer mode (no-op on Unix)
    #[arg(long)]
    binary: bool,

    /// Permission bits in octal, e.g. 0644
    #[arg(short, long, value_name = "OCTAL")]
    mode: Option<String>,

    /// Owner as USER[:GROUP] (names or numeric ids)
    #[arg(short, long, value_name = "SPEC")]
    owner: Option<String>,

    /// Stage the temp file here instead of next to TARGET (same filesystem only)
    #[arg(long, value_name = "DIR")]
    tmpdir: Option<PathBuf>,

    /// Temp file name template, ending in at least four X
    #[arg(long, value_name = "TEMPLATE")]
    template: Option<String>,

    /// Create missing parent directories
    #[arg(short = 'p', long)]
    mkpath: bool,

    /// Skip the fsync of TARGET's directory after the rename
    #[arg(long)]
    no_fsync_dir: bool,

    /// Print debug facts and the final report
    #[arg(short, long)]
    verbose: bool,
}

fn open_input(input: &str) -> Result<Box<dyn Read>, WriteError> {
    if input == "-" {
        return Ok(Box::new(io::stdin().lock()));
    }
    File::open(input)
        .map(|f| Box::new(f) as Box<dyn Read>)
        .map_err(|e| WriteError::InvalidRequest(format!("cannot open input {input}: {e}")))
}

fn run(cli: Cli, token: CancelToken) -> Result<WriteReport, WriteError> {
    let mut policy = Policy::default();
    policy.durability.fsync_parent_dir = !cli.no_fsync_dir;
    let writer = AtomicWriter::new(LogSink, LogSink, policy).with_cancel_token(token);

    let mut req = WriteRequest::new(cli.target)
        .reader(open_input(&cli.input)?)
        .create_parent_dirs(cli.mkpath)
        .checksum(cli.checksum)
        .binary_mode(cli.binary);
    if let Some(n) = cli.min_size {
        req = req.min_size(n);
    }
    if let Some(hex) = cli.expected_checksum {
        req = req.expected_checksum(hex);
    }
    if let Some(m) = cli.mode.as_deref() {
        req = req.file_mode(parse_mode(m)?);
    }
    if let Some(spec) = cli.owner {
        req = req.owner(spec);
    }
    if let Some(dir) = cli.tmpdir {
        req = req.temp_dir(dir);
    }
    if let Some(t) = cli.template {
        req = req.temp_template(t);
    }
    writer.write(req)
}

/// How long a cancelled write may take to notice the token before the process gives up
/// on it. A worker blocked in a read of a silent pipe or a terminal never will.
const CANCEL_GRACE: Duration = Duration::from_secs(2);

/// SIGINT and SIGTERM streams, registered before the worker starts so that no signal
/// falls back to the default disposition mid-write.
struct Shutdown {
    int: Signal,
    term: Signal,
}

impl Shutdown {
    fn install() -> io::Result<Self> {
        Ok(Self {
            int: signal(SignalKind::interrupt())?,
            term: signal(SignalKind::terminate())?,
        })
    }

    async fn recv(&mut self) {
        tokio::select! {
            _ = self.int.recv() => {},
            _ = self.term.recv() => {},
        }
    }
}

/// Remove whatever the worker has staged and exit without waiting for it. The runtime
/// cannot be dropped while a blocking task is stuck, so this bypasses it.
fn abandon(token: &CancelToken) -> ! {
    if let Err(e) = token.remove_staged() {
        log::warn!("cannot remove staged file: {e}");
    }
    std::process::exit(exit_code_for(ErrorId::E_CANCELLED))
}

fn exit_with(id: ErrorId) -> ExitCode {
    ExitCode::from(u8::try_from(exit_code_for(id)).unwrap_or(1))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
    let verbose = cli.verbose;

    // Cleanup on SIGINT/SIGTERM: the first signal cancels the write and waits briefly for
    // the worker to remove its temp file; a second signal or an expired grace period removes
    // it from here and exits.
    let mut shutdown = match Shutdown::install() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("stagedwrite: cannot install signal handlers: {e}");
            return exit_with(ErrorId::E_GENERIC);
        }
    };
    let token = CancelToken::new();
    let worker_token = token.clone();
    let mut task = tokio::task::spawn_blocking(move || run(cli, worker_token));
    let joined = tokio::select! {
        res = &mut task => res,
        () = shutdown.recv() => {
            log::warn!("signal received, cancelling write");
            token.cancel();
            tokio::select! {
                res = &mut task => res,
                () = shutdown.recv() => abandon(&token),
                () = tokio::time::sleep(CANCEL_GRACE) => {
                    log::warn!("write did not stop within {CANCEL_GRACE:?}, abandoning it");
                    abandon(&token)
                }
            }
        }
    };

    match joined {
        Ok(Ok(report)) => {
            if verbose {
                match serde_json::to_string(&report) {
                    Ok(s) => println!("{s}"),
                    Err(e) => log::warn!("cannot render report: {e}"),
                }
            }
            ExitCode::SUCCESS
        }
        Ok(Err(e)) => {
            let id = ErrorId::from(&e);
            eprintln!("stagedwrite: {e} ({})", id_str(id));
            exit_with(id)
        }
        Err(e) => {
            eprintln!("stagedwrite: worker failed: {e}");
            exit_with(ErrorId::E_GENERIC)
        }
    }
}
