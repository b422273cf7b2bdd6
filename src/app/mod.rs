use anyhow::{Context, Result, anyhow};
use clap::Parser;
use crossbeam_channel::bounded;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::config::{CompiledConfig, DEFAULT_BATCH_SIZE, RuntimeConfig};
use crate::pipeline::{BatchProcessor, FilterProcessor, InputLine};
use crate::sinks::{CountSink, JsonlSink, MatchedRow, RecordSink};
use crate::utils::ProgressCounter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Input JSON Lines file (`-` for stdin)
    #[arg(short, long, default_value = "-")]
    pub input: PathBuf,

    /// Output file (`-` for stdout)
    #[arg(short, long, default_value = "-")]
    pub output: PathBuf,

    /// Predicate, e.g. "age>23 and sex in (boy,girl)"; overrides the config filter
    #[arg(short = 'w', long = "where", env = "YQL_WHERE")]
    pub predicate: Option<String>,

    /// Filter configuration file (YAML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Number of threads (default: all cores)
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// Lines evaluated per parallel batch
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Fail on the first line that is not a JSON object
    #[arg(long)]
    pub strict: bool,

    /// Print only the number of matching records
    #[arg(long)]
    pub count: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

pub type SinkHandle = Arc<Mutex<Box<dyn RecordSink + Send>>>;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub lines: u64,
    pub matched: u64,
    pub invalid: u64,
}

fn is_stdio(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn init_sink(cli: &Cli) -> Result<Box<dyn RecordSink + Send>> {
    let output = &cli.output;
    match (cli.count, is_stdio(output)) {
        (true, true) => {
            tracing::info!("Sink: count -> stdout");
            Ok(Box::new(CountSink::stdout()))
        }
        (true, false) => {
            tracing::info!("Sink: count -> {:?}", output);
            let file = File::create(output)
                .with_context(|| format!("CLI: Failed to create output {:?}", output))?;
            Ok(Box::new(CountSink::from_writer(Box::new(file))))
        }
        (false, true) => {
            tracing::info!("Sink: jsonl -> stdout");
            Ok(Box::new(JsonlSink::stdout()?))
        }
        (false, false) => {
            tracing::info!("Sink: jsonl -> {:?}", output);
            let sink = JsonlSink::new(output)
                .with_context(|| format!("CLI: Failed to create output {:?}", output))?;
            Ok(Box::new(sink))
        }
    }
}

pub fn open_input(input: &Path) -> Result<Box<dyn BufRead + Send>> {
    if is_stdio(input) {
        tracing::info!("Source: stdin");
        return Ok(Box::new(BufReader::new(std::io::stdin())));
    }
    tracing::info!("Source: {:?}", input);
    let file =
        File::open(input).with_context(|| format!("CLI: Failed to open input {:?}", input))?;
    Ok(Box::new(BufReader::new(file)))
}

fn lock_sink(sink: &SinkHandle) -> Result<std::sync::MutexGuard<'_, Box<dyn RecordSink + Send>>> {
    sink.lock()
        .map_err(|_| anyhow!("Pipeline: Sink lock poisoned by a failed writer"))
}

/// Read batches of lines, filter each batch in parallel, and stream matches
/// to the sink on a writer thread. Output keeps input order.
pub fn run_filter<P>(
    reader: Box<dyn BufRead + Send>,
    processor: Arc<P>,
    sink: SinkHandle,
    runtime: &RuntimeConfig,
    progress: &ProgressCounter,
) -> Result<RunStats>
where
    P: BatchProcessor + 'static,
{
    let (tx, rx) = bounded::<Vec<MatchedRow>>(64);

    let sink_handle = sink.clone();
    let writer = std::thread::spawn(move || -> Result<u64> {
        let mut sink = lock_sink(&sink_handle)?;
        let mut match_count = 0u64;
        for batch in rx {
            for row in batch {
                tracing::trace!("Match on line {}", row.line);
                sink.add_record(row)?;
                match_count += 1;
            }
        }
        Ok(match_count)
    });

    let batch_size = runtime.batch_size.max(1);
    let read_result = (|| -> Result<u64> {
        let mut invalid = 0u64;
        let mut batch = Vec::with_capacity(batch_size);
        let mut dispatch = |batch: Vec<InputLine>| -> Result<()> {
            let outcome = processor.process_batch(&batch)?;
            progress.inc(batch.len() as u64);
            invalid += outcome.invalid;
            if !outcome.rows.is_empty() {
                tx.send(outcome.rows)
                    .map_err(|err| anyhow!("Pipeline: Failed to send match batch: {}", err))?;
            }
            Ok(())
        };

        for (idx, line) in reader.split(b'\n').enumerate() {
            let number = idx as u64 + 1;
            let raw = line.with_context(|| format!("Pipeline: Failed to read line {}", number))?;
            batch.push(InputLine { number, raw });
            if batch.len() >= batch_size {
                dispatch(std::mem::replace(&mut batch, Vec::with_capacity(batch_size)))?;
            }
        }
        if !batch.is_empty() {
            dispatch(batch)?;
        }
        Ok(invalid)
    })();

    drop(tx);

    // Get writer thread result - it contains the root cause if there was an error
    let writer_join = writer.join();

    // Check writer thread first - it has the real error if the channel disconnected
    let matched = match writer_join {
        Ok(Ok(result)) => result,
        Ok(Err(writer_err)) => {
            return if read_result.is_err() {
                Err(writer_err
                    .context("Pipeline: Sink writer thread failed (caused channel disconnect)"))
            } else {
                Err(writer_err)
            };
        }
        Err(panic_payload) => {
            let panic_msg = panic_payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic_payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            return Err(anyhow!(
                "Pipeline: Sink writer thread panicked: {}",
                panic_msg
            ));
        }
    };

    // Only check read_result if writer succeeded
    let invalid = read_result?;

    progress.finish();
    Ok(RunStats {
        lines: progress.total(),
        matched,
        invalid,
    })
}

pub fn process_input(
    cli: &Cli,
    config: Arc<CompiledConfig>,
    runtime: Arc<RuntimeConfig>,
    sink: SinkHandle,
) -> Result<RunStats> {
    let reader = open_input(&cli.input)?;
    let progress = ProgressCounter::new("Lines", 100_000, cli.verbose);
    let processor = Arc::new(FilterProcessor {
        config,
        runtime: runtime.clone(),
    });

    tracing::info!(
        "Filtering in batches of {} lines (parallel)...",
        runtime.batch_size
    );
    run_filter(reader, processor, sink, &runtime, &progress)
}

pub fn finish_sink(sink: &SinkHandle) -> Result<()> {
    let mut sink = lock_sink(sink)?;
    sink.finish().context("Pipeline: Failed to finalize sink")
}
