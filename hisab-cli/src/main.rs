use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use hisab_core::{CsvRecordStore, ParseResult, ParseStatus, RecordStore, TransactionRecord, CURRENCY};
use hisab_engine::{EngineConfig, ParseSession, Reconciler, Today};
use hisab_parse::LocalParser;
use rust_decimal::Decimal;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod state;

#[derive(Parser, Debug)]
#[command(name = "hisab", version, about = "Turn mobile-banking notifications into transactions")]
struct Cli {
    /// Log level: error, warn, info, debug, trace (RUST_LOG takes precedence)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse one message; reconciled with the remote service when enabled
    Parse {
        text: String,

        /// Skip the remote service
        #[arg(long)]
        local: bool,

        /// Date to assume when the message has none (default: today in the configured timezone)
        #[arg(long)]
        today: Option<NaiveDate>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Treat each stdin line as a new edit of the message; print every update as a JSON line
    Watch {
        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// Local-parse a CSV `message` column and write transaction records as CSV
    Batch {
        #[arg(long)]
        csv: PathBuf,

        /// Output file (default: stdout)
        #[arg(long)]
        out: Option<PathBuf>,

        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// Config file commands
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default ~/.hisab/config.toml if none exists
    Init,
    /// Print the effective config
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(&cli.log_level);

    match cli.command {
        Command::Parse {
            text,
            local,
            today,
            json,
        } => {
            let cfg = config::load_config()?;
            let mut reconciler = build_reconciler(&cfg, local, today)?;
            reconciler.submit(&text);
            let update = reconciler.settle().await;
            if json {
                println!("{}", render_json(&update.result, update.status)?);
            } else {
                print_result(&update.result, update.status);
            }
        }

        Command::Watch { today } => {
            let cfg = config::load_config()?;
            run_watch(&cfg, today).await?;
        }

        Command::Batch { csv, out, today } => {
            let cfg = config::load_config()?;
            let today = match today {
                Some(d) => d,
                None => Today::from_config(&cfg.parser)?.date(),
            };
            run_batch(&csv, out, today)?;
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => config::show_config()?,
        },
    }

    Ok(())
}

fn setup_logging(level: &str) {
    // stderr keeps stdout clean for JSON/CSV output
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn build_reconciler(cfg: &EngineConfig, local_only: bool, today: Option<NaiveDate>) -> Result<Reconciler> {
    let mut cfg = cfg.clone();
    if local_only {
        cfg.remote.enabled = false;
    }
    let reconciler = Reconciler::from_config(&cfg)?;
    Ok(match today {
        Some(d) => reconciler.with_today(Today::Fixed(d)),
        None => reconciler,
    })
}

fn render_json(result: &ParseResult, status: ParseStatus) -> Result<String> {
    let v = serde_json::json!({ "status": status, "result": result });
    serde_json::to_string(&v).context("serialize update")
}

fn print_result(result: &ParseResult, status: ParseStatus) {
    let f = &result.fields;
    let or_dash = |v: Option<String>| v.unwrap_or_else(|| "-".to_string());

    println!("status:         {status}");
    println!(
        "amount:         {}",
        or_dash(f.amount.map(|a| format!("{a} {CURRENCY}")))
    );
    println!("direction:      {}", or_dash(f.direction.map(|d| d.to_string())));
    println!("category:       {}", or_dash(f.category.clone()));
    println!("merchant:       {}", or_dash(f.merchant.clone()));
    println!("transaction id: {}", or_dash(f.transaction_id.clone()));
    println!("date:           {}", or_dash(f.date.map(|d| d.to_string())));
    println!("confidence:     {}", result.confidence);
    println!("source:         {}", or_dash(result.source.clone()));
    if !result.insights.is_empty() {
        println!("insights:");
        for note in &result.insights {
            println!("  - {note}");
        }
    }
}

async fn run_watch(cfg: &EngineConfig, today: Option<NaiveDate>) -> Result<()> {
    let reconciler = build_reconciler(cfg, false, today)?;
    let grace = cfg.remote.timeout() + Duration::from_secs(1);
    let stdin = BufReader::new(tokio::io::stdin());
    watch_lines(reconciler, grace, stdin, &mut io::stdout()).await
}

/// One JSON line per update. After input closes, waits (up to `grace` per
/// update) for the last line to leave `pending`.
async fn watch_lines<R, W>(reconciler: Reconciler, grace: Duration, input: R, out: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut session = ParseSession::spawn(reconciler);
    let (tx, mut rx) = mpsc::unbounded_channel::<(u64, ParseStatus, String)>();
    let mut lines = input.lines();
    let mut submitted = 0u64;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("read input")? else { break };
                submitted += 1;
                let seq = submitted;
                let tx = tx.clone();
                session.start_reconciled_parse(&line, move |result, status| {
                    match render_json(result, status) {
                        Ok(json) => {
                            let _ = tx.send((seq, status, json));
                        }
                        Err(e) => warn!(error = %e, "could not render update"),
                    }
                });
            }
            Some((_, _, json)) = rx.recv() => writeln!(out, "{json}")?,
        }
    }

    if submitted > 0 {
        loop {
            match tokio::time::timeout(grace, rx.recv()).await {
                Ok(Some((seq, status, json))) => {
                    writeln!(out, "{json}")?;
                    if seq == submitted && status != ParseStatus::Pending {
                        break;
                    }
                }
                _ => {
                    warn!(line = submitted, "last message did not settle before exit");
                    break;
                }
            }
        }
    }

    out.flush()?;
    session.shutdown().await;
    Ok(())
}

/// Totals for one batch run
#[derive(Debug, Default, PartialEq)]
struct BatchSummary {
    written: usize,
    skipped: usize,
    income: Decimal,
    spent: Decimal,
}

fn run_batch(csv_path: &Path, out: Option<PathBuf>, today: NaiveDate) -> Result<BatchSummary> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(csv_path)
        .with_context(|| format!("opening {}", csv_path.display()))?;

    let column = rdr
        .headers()?
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case("message"))
        .with_context(|| format!("{} has no `message` column", csv_path.display()))?;

    let writer: Box<dyn Write> = match &out {
        Some(p) => Box::new(
            std::fs::File::create(p).with_context(|| format!("create {}", p.display()))?,
        ),
        None => Box::new(io::stdout()),
    };
    let mut store = CsvRecordStore::new(writer);
    let parser = LocalParser::new(today);
    let mut summary = BatchSummary::default();

    for (i, row) in rdr.records().enumerate() {
        let row = row.with_context(|| format!("reading row {}", i + 2))?;
        let parsed = parser.parse(row.get(column).unwrap_or(""));
        match TransactionRecord::from_result(&parsed) {
            Ok(record) => {
                store.save(&record)?;
                if record.is_income() {
                    summary.income += record.abs_amount();
                } else if record.is_expense() {
                    summary.spent += record.abs_amount();
                }
            }
            Err(e) => {
                // header is line 1
                warn!(line = i + 2, error = %e, "skipping message");
                summary.skipped += 1;
            }
        }
    }

    summary.written = store.written();
    info!(
        written = summary.written,
        skipped = summary.skipped,
        income = %summary.income,
        spent = %summary.spent,
        currency = CURRENCY,
        "batch complete"
    );
    store.into_inner()?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use hisab_engine::{InferenceClient, RemoteError, RemoteParse};
    use std::sync::Arc;

    fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("hisab-batch-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_batch_writes_records_and_skips_misses() {
        let dir = scratch_dir();
        let input = dir.join("messages.csv");
        let output = dir.join("records.csv");
        std::fs::write(
            &input,
            "id,message\n\
             1,\"Payment successful to Foodpanda. Amount BDT 1,250.00. TrxID 8FH5G6H7. 27/12/2025\"\n\
             2,hello there\n\
             3,Cash In Tk 2000 from Agent. TrxID AB12CD34EF\n",
        )
        .unwrap();

        let today = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let summary = run_batch(&input, Some(output.clone()), today).unwrap();
        assert_eq!(summary.written, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.spent.to_string(), "1250.00");
        assert_eq!(summary.income.to_string(), "2000");

        let written = std::fs::read_to_string(&output).unwrap();
        let lines: Vec<_> = written.lines().collect();
        assert_eq!(lines.len(), 3, "{written}");
        assert!(lines[1].starts_with("8FH5G6H7,2025-12-27,Foodpanda,-1250.00,BDT,expense,Shopping"));
        assert!(lines[2].starts_with("AB12CD34EF,2026-01-05,Agent,2000,BDT,income,Cash In"));
    }

    #[test]
    fn test_batch_requires_message_column() {
        let dir = scratch_dir();
        let input = dir.join("wrong.csv");
        std::fs::write(&input, "text\nTk 5\n").unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        assert!(run_batch(&input, Some(dir.join("unused.csv")), today).is_err());
    }

    #[test]
    fn test_render_json_shape() {
        let parser = LocalParser::new(NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());
        let result = parser.parse("Tk 500 paid to Daraz");
        let out = render_json(&result, ParseStatus::Fallback).unwrap();
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["status"], "fallback");
        assert_eq!(v["result"]["merchant"], "Daraz");
        assert_eq!(v["result"]["amount"], "500");
        assert_eq!(v["result"]["date"], "2026-01-05");
    }

    struct DelayedClient {
        delay: Duration,
    }

    #[async_trait]
    impl InferenceClient for DelayedClient {
        async fn infer(&self, message: &str) -> Result<RemoteParse, RemoteError> {
            tokio::time::sleep(self.delay).await;
            let mut parse = RemoteParse::default();
            parse.parsed.merchant = Some(format!("remote:{}", message.len()));
            Ok(parse)
        }
    }

    fn fixed_today() -> Today {
        Today::Fixed(NaiveDate::from_ymd_opt(2026, 1, 5).unwrap())
    }

    fn statuses(out: &[u8]) -> Vec<serde_json::Value> {
        std::str::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_watch_prints_result_when_input_closes_at_once() {
        let reconciler = Reconciler::new(None, Duration::from_secs(1), fixed_today());
        let mut out = Vec::new();
        watch_lines(reconciler, Duration::from_secs(1), &b"Tk 500 paid to Daraz\n"[..], &mut out)
            .await
            .unwrap();

        let updates = statuses(&out);
        assert_eq!(updates.len(), 1, "{updates:?}");
        assert_eq!(updates[0]["status"], "fallback");
        assert_eq!(updates[0]["result"]["merchant"], "Daraz");
    }

    #[tokio::test]
    async fn test_watch_waits_for_last_remote_result() {
        let client: Arc<dyn InferenceClient> = Arc::new(DelayedClient {
            delay: Duration::from_millis(20),
        });
        let reconciler = Reconciler::new(Some(client), Duration::from_secs(1), fixed_today());
        let input = &b"Tk 1 paid to A\nTk 500 paid to Daraz\n"[..];
        let mut out = Vec::new();
        watch_lines(reconciler, Duration::from_secs(2), input, &mut out)
            .await
            .unwrap();

        let updates = statuses(&out);
        let last = updates.last().unwrap();
        assert_eq!(last["status"], "ready");
        assert_eq!(last["result"]["merchant"], "remote:20");
        // the first line was superseded before its call finished
        assert_eq!(
            updates.iter().filter(|u| u["status"] == "ready").count(),
            1,
            "{updates:?}"
        );
    }

    #[tokio::test]
    async fn test_watch_with_no_input_prints_nothing() {
        let reconciler = Reconciler::new(None, Duration::from_secs(1), fixed_today());
        let mut out = Vec::new();
        watch_lines(reconciler, Duration::from_secs(1), &b""[..], &mut out)
            .await
            .unwrap();
        assert!(out.is_empty());
    }
}
