use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use chumsky::Parser as _;
use clap::Parser;
use colored::*;
use earley_chart::grammar_parser::grammar_file;
use earley_chart::{Grammar, Recognizer};
use log::{Level, LevelFilter, Log, Metadata, Record};

/// Answer YES/NO for every word of a grammar document.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Grammar document to read; stdin when omitted
    path: Option<PathBuf>,

    /// Extra word to test after the document's own queries (repeatable)
    #[arg(short, long = "word")]
    words: Vec<String>,

    /// Print the chart built for each word
    #[arg(long)]
    chart: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Log verbosity, repeat for more detail
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let level = match record.level() {
            Level::Error => "ERROR".red().bold(),
            Level::Warn => "WARN".yellow().bold(),
            Level::Info => "INFO".green(),
            Level::Debug => "DEBUG".cyan(),
            Level::Trace => "TRACE".dimmed(),
        };
        eprintln!("{} {}", level, record.args());
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }
    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }

    let input = match read_input(cli.path.as_ref()) {
        Ok(input) => input,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            return ExitCode::FAILURE;
        }
    };

    let result = grammar_file().parse(&input);
    if result.has_errors() {
        for e in result.errors() {
            eprintln!("{} {} at {}", "Error:".red().bold(), e, e.span());
        }
        return ExitCode::FAILURE;
    }
    let Some(file) = result.output() else {
        eprintln!("{} no grammar parsed", "Error:".red().bold());
        return ExitCode::FAILURE;
    };

    let mut recognizer = Recognizer::new();
    if let Err(e) = Grammar::try_from(file).and_then(|g| recognizer.fit(g).map(|_| ())) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        return ExitCode::FAILURE;
    }

    let words = file
        .words()
        .iter()
        .copied()
        .chain(cli.words.iter().map(String::as_str));
    for word in words {
        let chart = match recognizer.chart(word) {
            Ok(chart) => chart,
            Err(e) => {
                eprintln!("{} {}", "Error:".red().bold(), e);
                return ExitCode::FAILURE;
            }
        };
        if cli.chart {
            println!("{}", format!("--- {:?} ---", word).bold());
            chart.print_chart();
        }
        if chart.accepted() {
            println!("{}", "YES".green());
        } else {
            println!("{}", "NO".red());
        }
    }

    ExitCode::SUCCESS
}

fn read_input(path: Option<&PathBuf>) -> io::Result<String> {
    match path {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut input = String::new();
            io::stdin().read_to_string(&mut input)?;
            Ok(input)
        }
    }
}
