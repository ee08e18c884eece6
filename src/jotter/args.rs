use clap::{Parser, Subcommand};

/// Returns the version string, including git hash and commit date for non-release builds.
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

#[derive(Parser, Debug)]
#[command(name = "jotter", bin_name = "jotter", version = get_version())]
#[command(about = "Command-line client for a REST notes service", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Notes API base URL (overrides configuration)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List notes
    #[command(alias = "ls")]
    List {
        /// Only show notes whose title or content contains this
        #[arg(short = 'q', long)]
        search: Option<String>,
    },

    /// Show a single note
    #[command(alias = "v")]
    Show { id: String },

    /// Create a note
    #[command(alias = "n")]
    Create {
        title: String,

        #[arg(required = false)]
        content: Option<String>,
    },

    /// Change the title and/or content of a note
    #[command(alias = "e")]
    Edit {
        id: String,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        content: Option<String>,
    },

    /// Delete a note
    #[command(alias = "rm")]
    Delete { id: String },

    /// Print the resolved configuration
    Config,
}
