//! Trine - forward-chaining reasoner CLI
//!
//! Loads rule and data files, derives every consequence, and prints the
//! resulting fact store.
//!
//! ## Usage
//!
//! ```bash
//! # Text output, one statement per line
//! trine --rules family.n3 --data people.nt
//!
//! # JSON output with reasoner counters
//! TRINE_OUTPUT=json trine -r family.n3 -d people.nt --stats
//!
//! # Watch each inference and every reasoner step
//! trine -r family.n3 -d people.nt --show-inferences --trace
//! ```

mod config;

use clap::Parser;
use config::{Config, OutputFormat};
use log::{debug, info};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use trine_graph::{parse_file, write_facts, Statement};
use trine_logic::{BuiltinRegistry, KnowledgeBase, Reasoner, ReasonerStats, RuleParser};

type BoxError = Box<dyn std::error::Error>;

/// Trine forward-chaining reasoner
#[derive(Parser, Debug)]
#[command(name = "trine")]
#[command(author = "Trine Developers")]
#[command(version)]
#[command(about = "Derive the consequences of triples under forward-chaining rules", long_about = None)]
struct Args {
    /// Rule file (repeatable)
    #[arg(short, long, value_name = "FILE")]
    rules: Vec<PathBuf>,

    /// Data file (repeatable); facts are added in order
    #[arg(short, long, value_name = "FILE")]
    data: Vec<PathBuf>,

    /// JSON configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log every reasoner step
    #[arg(long)]
    trace: bool,

    /// Output format for the final store
    #[arg(short, long, value_enum)]
    output: Option<OutputFormat>,

    /// Print each inferred fact to stderr as it is derived
    #[arg(long)]
    show_inferences: bool,

    /// Print reasoner counters to stderr after the run
    #[arg(long)]
    stats: bool,
}

impl Args {
    /// Layers defaults, the config file, the environment, then flags.
    fn config(&self) -> Result<Config, BoxError> {
        let base = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };
        let mut config = base.apply_env();

        if !self.rules.is_empty() {
            config.rules = self.rules.clone();
        }
        if !self.data.is_empty() {
            config.data = self.data.clone();
        }
        if let Some(output) = self.output {
            config.output = output;
        }
        config.trace |= self.trace;
        config.show_inferences |= self.show_inferences;
        config.stats |= self.stats;

        Ok(config)
    }

    fn log_filter(&self, config: &Config) -> String {
        match self.verbose {
            // Trace output is logged at debug and would be filtered out otherwise.
            0 if config.trace => "debug".to_string(),
            0 => config.log_level.clone(),
            1 => "debug".to_string(),
            _ => "trace".to_string(),
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match args.config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Initialize logging
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(args.log_filter(&config)),
    )
    .init();

    let stdout = io::stdout();
    match run(&config, &mut stdout.lock()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Loads rules and data, runs inference, and writes the final store to `out`.
fn run<W: Write>(config: &Config, out: &mut W) -> Result<ReasonerStats, BoxError> {
    let registry = BuiltinRegistry::standard();
    let parser = RuleParser::new(&registry);

    let mut rules = Vec::new();
    for path in &config.rules {
        let parsed = parser
            .parse_file(path)
            .map_err(|e| format!("{}: {}", path.display(), e))?;
        rules.extend(parsed);
    }
    info!(
        "Loaded {} rules from {} files",
        rules.len(),
        config.rules.len()
    );

    let mut reasoner = Reasoner::new(rules).with_tracing(config.trace);
    if config.show_inferences {
        reasoner.set_listener(|fact: &Statement| eprintln!("inferred: {}", fact));
    }
    let mut kb = KnowledgeBase::new(reasoner);

    for path in &config.data {
        let facts = parse_file(path).map_err(|e| format!("{}: {}", path.display(), e))?;
        let total = facts.len();
        let added = kb.extend(facts)?;
        debug!("{}: {} facts, {} new", path.display(), total, added);
    }
    info!("Store holds {} facts", kb.len());

    match config.output {
        OutputFormat::Text => write_facts(&mut *out, kb.facts())?,
        OutputFormat::Json => {
            let facts: Vec<&Statement> = kb.facts().collect();
            serde_json::to_writer_pretty(&mut *out, &facts)?;
            writeln!(out)?;
        }
    }
    out.flush()?;

    let stats = kb.reasoner().stats().clone();
    if config.stats {
        print_stats(&stats, config.output)?;
    }
    Ok(stats)
}

fn print_stats(stats: &ReasonerStats, format: OutputFormat) -> Result<(), BoxError> {
    match format {
        OutputFormat::Json => eprintln!("{}", serde_json::to_string_pretty(stats)?),
        OutputFormat::Text => {
            eprintln!("Statistics:");
            eprintln!("  Triggers:         {}", stats.triggers);
            eprintln!("  Data matches:     {}", stats.data_matches);
            eprintln!("  Rules fired:      {}", stats.rules_fired);
            eprintln!("  Facts inferred:   {}", stats.facts_inferred);
            eprintln!("  Builtin failures: {}", stats.builtin_failures);
            eprintln!("  Unbound heads:    {}", stats.unbound_heads);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use tempfile::NamedTempFile;

    const RULES: &str = r#"
        @minor { ?x <age> ?a . ?a lt "18" } => { ?x <status> "minor" } .
    "#;

    const DATA: &str = r#"
        <alice> <age> "17" .
        <bob> <age> "21" .
    "#;

    fn file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn config(rules: &NamedTempFile, data: &NamedTempFile) -> Config {
        Config {
            rules: vec![rules.path().to_path_buf()],
            data: vec![data.path().to_path_buf()],
            ..Config::default()
        }
    }

    #[test]
    fn test_run_text_output() {
        let (rules, data) = (file(RULES), file(DATA));
        let mut out = Vec::new();
        let stats = run(&config(&rules, &data), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(r#"<alice> <status> "minor" ."#));
        assert!(!text.contains(r#"<bob> <status>"#));
        assert_eq!(text.lines().count(), 3);
        assert_eq!(stats.facts_inferred, 1);
    }

    #[test]
    fn test_run_json_output() {
        let (rules, data) = (file(RULES), file(DATA));
        let mut cfg = config(&rules, &data);
        cfg.output = OutputFormat::Json;
        cfg.stats = true;

        let mut out = Vec::new();
        run(&cfg, &mut out).unwrap();

        let facts: Vec<serde_json::Value> = serde_json::from_slice(&out).unwrap();
        assert_eq!(facts.len(), 3);
        assert!(facts.iter().all(|f| f.get("subject").is_some()));
    }

    #[test]
    fn test_run_reports_bad_files() {
        let data = file(DATA);
        let cfg = Config {
            rules: vec![PathBuf::from("/nonexistent/rules.n3")],
            data: vec![data.path().to_path_buf()],
            ..Config::default()
        };
        assert!(run(&cfg, &mut Vec::new()).is_err());

        let (rules, bad) = (file(RULES), file("<a> <b> ?c ."));
        assert!(run(&config(&rules, &bad), &mut Vec::new()).is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let args = Args::parse_from(["trine", "-r", "x.n3", "--output", "json", "--stats"]);
        let config = args.config().unwrap();
        assert_eq!(config.rules, vec![PathBuf::from("x.n3")]);
        assert_eq!(config.output, OutputFormat::Json);
        assert!(config.stats);
    }

    #[test]
    fn test_log_filter() {
        let config = Config::default();
        assert_eq!(Args::parse_from(["trine"]).log_filter(&config), "info");
        assert_eq!(Args::parse_from(["trine", "-vv"]).log_filter(&config), "trace");
        assert_eq!(Args::parse_from(["trine", "--trace"]).log_filter(&Config {
            trace: true,
            ..Config::default()
        }), "debug");
    }
}
