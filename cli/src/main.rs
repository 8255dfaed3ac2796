mod error_formatter;
mod formatter;
mod server;

use anyhow::Result;
use clap::{Parser, Subcommand};
use equate::sampler::seeded_rng;
use equate::{
    AnswerExtractor, EngineConfig, ExpressionService, Grader, MathExpressionService,
    PatternExtractor, SessionTelemetry, VariableBinding,
};
use error_formatter::ExpressionError;
use formatter::Formatter;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Parser)]
#[command(name = "equate")]
#[command(about = "Is the student's answer the expected one?")]
#[command(
    long_about = "Equate decides whether a free-form math answer is equivalent to the expected answer and grades the attempt.\nThe CLI checks and grades answers, prints canonical forms, or runs Equate as an HTTP server."
)]
#[command(version)]
struct Cli {
    /// Engine configuration file (JSON, partial overrides allowed)
    #[arg(short = 'c', long, global = true, env = "EQUATE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two answers and print the verdict
    ///
    /// Runs the exact, canonical-form and numeric-trial stages in order and
    /// reports the first conclusive one.
    Check {
        /// The student's answer
        student: String,
        /// The expected answer
        expected: String,
        /// Seed for the numeric trials (reproducible verdicts)
        #[arg(long)]
        seed: Option<u64>,
        /// Skip the canonical-form stage
        #[arg(long)]
        no_canonical: bool,
        /// Print the verdict as JSON
        #[arg(long)]
        json: bool,
    },
    /// Grade a submission
    ///
    /// Checks the answer, then applies the hint and attempt penalties.
    ///
    /// Examples:
    ///   equate grade "2x + 2" --expected "2(x + 1)"
    ///   equate grade "x" --expected "x" --attempts 5 --hints 1
    Grade {
        /// The student's answer (omit to grade a missing answer)
        student: Option<String>,
        /// The expected answer
        #[arg(short = 'e', long)]
        expected: Option<String>,
        /// Number of attempts made so far, including this one
        #[arg(short = 'a', long, default_value = "1")]
        attempts: u32,
        /// Number of hints used
        #[arg(long, default_value = "0")]
        hints: u32,
        /// Seed for the numeric trials (reproducible grades)
        #[arg(long)]
        seed: Option<u64>,
        /// Pull the answer out of free-form text first (\boxed{..}, "answer is ..", "x = ..")
        #[arg(short = 'x', long)]
        extract: bool,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the canonical form of an expression
    Simplify {
        /// Expression to simplify
        expression: String,
    },
    /// Evaluate an expression with integer variable values
    ///
    /// Examples: equate eval "x^2 + y" x=3 y=-1
    Eval {
        /// Expression to evaluate
        expression: String,
        /// Variable values (format: name=integer)
        bindings: Vec<String>,
    },
    /// Start HTTP REST API server (default: localhost:3000)
    ///
    /// API: GET /health, POST /check with {student, expected},
    /// POST /grade with {student, expected, attempts, hints_used}
    Server {
        /// Host address to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        /// Port number to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let result = load_config(cli.config.as_deref()).and_then(|config| match &cli.command {
        Commands::Check {
            student,
            expected,
            seed,
            no_canonical,
            json,
        } => check_command(config, student, expected, *seed, *no_canonical, *json),
        Commands::Grade {
            student,
            expected,
            attempts,
            hints,
            seed,
            extract,
            json,
        } => grade_command(
            config,
            student.as_deref(),
            expected.as_deref(),
            SessionTelemetry::new(*attempts, *hints),
            *seed,
            *extract,
            *json,
        ),
        Commands::Simplify { expression } => simplify_command(config, expression),
        Commands::Eval {
            expression,
            bindings,
        } => eval_command(config, expression, bindings),
        Commands::Server { host, port } => server_command(config, host, *port),
    });

    if let Err(e) = result {
        // Parse errors get a source excerpt, everything else the plain message
        if let Some(expression_err) = e.downcast_ref::<ExpressionError>() {
            eprintln!("{}", error_formatter::format_error(expression_err));
        } else {
            eprintln!("Error: {}", e);
        }
        std::process::exit(1);
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "equate=info,tower_http=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => {
            debug!("loading configuration from {}", path.display());
            EngineConfig::from_json_file(path)
                .map_err(|e| anyhow::anyhow!("{} ({})", e, path.display()))
        }
        None => Ok(EngineConfig::default()),
    }
}

fn check_command(
    mut config: EngineConfig,
    student: &str,
    expected: &str,
    seed: Option<u64>,
    no_canonical: bool,
    json: bool,
) -> Result<()> {
    if no_canonical {
        config.equivalence.canonical_form = false;
    }
    let grader = Grader::with_config(config);

    let verdict = match seed {
        Some(seed) => grader.check_with_rng(student, expected, &mut seeded_rng(seed)),
        None => grader.check(student, expected),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&verdict)?);
    } else {
        let formatter = Formatter::default();
        print!("{}", formatter.format_verdict(student, expected, &verdict));
    }

    Ok(())
}

fn grade_command(
    config: EngineConfig,
    student: Option<&str>,
    expected: Option<&str>,
    telemetry: SessionTelemetry,
    seed: Option<u64>,
    extract: bool,
    json: bool,
) -> Result<()> {
    let extracted = if extract {
        let found = student.and_then(|text| PatternExtractor::new().extract(text));
        debug!("extracted answer: {:?}", found);
        found
    } else {
        student.map(str::to_string)
    };
    let student = extracted.as_deref();

    let grader = Grader::with_config(config);
    let result = match seed {
        Some(seed) => grader.grade_with_rng(student, expected, telemetry, &mut seeded_rng(seed)),
        None => grader.grade(student, expected, telemetry),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        let formatter = Formatter::default();
        print!("{}", formatter.format_grade(student, expected, &result));
    }

    Ok(())
}

fn simplify_command(config: EngineConfig, expression: &str) -> Result<()> {
    let service = MathExpressionService::with_limits(config.limits);
    let expr = service
        .parse(expression)
        .map_err(|error| ExpressionError::new(expression, error))?;

    println!("{}", service.simplify(&expr));
    Ok(())
}

fn eval_command(config: EngineConfig, expression: &str, bindings: &[String]) -> Result<()> {
    let service = MathExpressionService::with_limits(config.limits);
    let bindings = parse_bindings(bindings)?;
    let expr = service
        .parse(expression)
        .map_err(|error| ExpressionError::new(expression, error))?;

    let value = service.evaluate(&expr, &bindings)?;
    println!("{}", value);
    Ok(())
}

fn server_command(config: EngineConfig, host: &str, port: u16) -> Result<()> {
    #[cfg(feature = "server")]
    {
        use tokio::runtime::Runtime;
        let rt = Runtime::new()?;
        rt.block_on(async {
            let grader = Grader::with_config(config);
            server::http::start_server(grader, host, port).await
        })?;
    }

    #[cfg(not(feature = "server"))]
    {
        let _ = (config, host, port);
        eprintln!("Error: Server feature not enabled");
        eprintln!("Recompile with: cargo build --features server");
        std::process::exit(1);
    }

    Ok(())
}

/// Parse "name=value" pairs into integer variable bindings
fn parse_bindings(pairs: &[String]) -> Result<VariableBinding> {
    let mut bindings = VariableBinding::new();
    for pair in pairs {
        let (name, value) = pair
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("Invalid binding '{}': expected name=integer", pair))?;
        let name = name.trim();
        if name.is_empty() {
            anyhow::bail!("Invalid binding '{}': missing variable name", pair);
        }
        let value: i64 = value
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid binding '{}': value must be an integer", pair))?;
        bindings.insert(name, value);
    }
    Ok(bindings)
}
