//! Command-line interface for wcmp

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand, ValueEnum};

#[cfg(feature = "cli")]
use std::path::PathBuf;
#[cfg(feature = "cli")]
use std::time::Duration;

#[cfg(feature = "cli")]
use wcmp::{
    parse_wcmp_file, CacheLayout, LinkChecker, ProfileSchema, TopicHierarchy,
};

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "wcmp")]
#[command(author, version, about = "WMO Core Metadata Profile validation tool", long_about = None)]
struct Cli {
    /// Logging verbosity
    #[arg(short = 'v', long, global = true, value_enum)]
    verbosity: Option<Verbosity>,

    /// Cache directory holding the profile schema, codelists and topics
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(ValueEnum, Clone, Copy, Debug)]
enum Verbosity {
    Error,
    Warning,
    Info,
    Debug,
}

#[cfg(feature = "cli")]
#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a metadata record against the profile schema
    Validate {
        /// Path to the XML metadata record
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Check a link (URL) for accessibility
    CheckLink {
        /// The URL to check
        #[arg(value_name = "URL")]
        url: String,

        /// Skip TLS certificate verification on the first attempt
        #[arg(long)]
        no_verify_tls: bool,

        /// Request timeout in seconds
        #[arg(long, default_value_t = wcmp::links::DEFAULT_TIMEOUT_SECS)]
        timeout: u64,
    },

    /// Topic hierarchy utilities
    Topics {
        #[command(subcommand)]
        command: TopicsCommands,
    },
}

#[cfg(feature = "cli")]
#[derive(Subcommand, Debug)]
enum TopicsCommands {
    /// List topic hierarchies at a given level
    List {
        /// Topic hierarchy
        #[arg(short = 't', long)]
        topic_hierarchy: Option<String>,
    },

    /// Validate a topic hierarchy
    Validate {
        /// Topic hierarchy
        #[arg(short = 't', long)]
        topic_hierarchy: String,
    },
}

#[cfg(feature = "cli")]
fn init_tracing(verbosity: Option<Verbosity>) {
    // CLI logging policy: an explicit -v wins; otherwise honour RUST_LOG,
    // defaulting to errors only.
    let filter = match verbosity {
        Some(Verbosity::Error) => tracing_subscriber::EnvFilter::new("error"),
        Some(Verbosity::Warning) => tracing_subscriber::EnvFilter::new("warn"),
        Some(Verbosity::Info) => tracing_subscriber::EnvFilter::new("info"),
        Some(Verbosity::Debug) => tracing_subscriber::EnvFilter::new("debug"),
        None => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "error".into()),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(feature = "cli")]
fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbosity);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(feature = "cli")]
fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let cache = match &cli.cache_dir {
        Some(dir) => CacheLayout::new(dir),
        None => CacheLayout::default_location()?,
    };

    match cli.command {
        Commands::Validate { file } => cmd_validate(&cache, file),
        Commands::CheckLink {
            url,
            no_verify_tls,
            timeout,
        } => cmd_check_link(&url, !no_verify_tls, timeout),
        Commands::Topics { command } => cmd_topics(&cache, command),
    }
}

#[cfg(feature = "cli")]
fn cmd_validate(cache: &CacheLayout, file: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let record = parse_wcmp_file(&file)?;
    let schema = ProfileSchema::load(cache)?;

    match schema.validate(&record) {
        Ok(()) => {
            println!("✓ {} is a valid WCMP record", file.display());
            Ok(())
        }
        Err(e) => {
            println!("✗ {} is not valid", file.display());
            println!();
            println!("{}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(feature = "cli")]
fn cmd_check_link(
    url: &str,
    verify_tls: bool,
    timeout: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    let checker = LinkChecker::new().with_timeout(Duration::from_secs(timeout));
    let result = checker.check(url, verify_tls);

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

#[cfg(feature = "cli")]
fn cmd_topics(
    cache: &CacheLayout,
    command: TopicsCommands,
) -> Result<(), Box<dyn std::error::Error>> {
    let hierarchy = TopicHierarchy::load(cache)?;

    match command {
        TopicsCommands::List { topic_hierarchy } => {
            let (level, children) = hierarchy.list_children(topic_hierarchy.as_deref())?;
            println!("Level: {}", level);
            println!("Children:");
            for child in children {
                println!("- {}", child);
            }
        }
        TopicsCommands::Validate { topic_hierarchy } => {
            if hierarchy.validate(Some(&topic_hierarchy))? {
                println!("Valid");
            } else {
                println!("Invalid");
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Rebuild with --features cli");
    std::process::exit(1);
}
