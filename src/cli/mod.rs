pub mod commands;
pub mod context;
pub mod output;

use clap::{Parser, Subcommand};

/// App Store Connect command-line client.
#[derive(Parser, Debug)]
#[command(name = "asc", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Credential profile to use (overrides ASC_PROFILE)
    #[arg(long, global = true)]
    pub profile: Option<String>,

    /// Reject credentials assembled from more than one source
    #[arg(long, global = true)]
    pub strict_auth: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage App Store Connect API credentials
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum AuthAction {
    /// Create a template config.json for authentication
    Init {
        /// Write ./.asc/config.json in the current directory instead of ~/.asc/config.json
        #[arg(long)]
        local: bool,
        /// Overwrite an existing config.json
        #[arg(long)]
        force: bool,
    },

    /// Register and store an App Store Connect API key
    Login {
        /// Friendly name for this key
        #[arg(long)]
        name: String,
        /// App Store Connect API key ID
        #[arg(long)]
        key_id: String,
        /// App Store Connect issuer ID
        #[arg(long)]
        issuer_id: String,
        /// Path to the private key (.p8) file
        #[arg(long)]
        private_key: String,
        /// Store credentials in config.json instead of the system keychain
        #[arg(long)]
        bypass_keychain: bool,
        /// With --bypass-keychain, write ./.asc/config.json
        #[arg(long, requires = "bypass_keychain")]
        local: bool,
        /// Do not parse the private key before storing it
        #[arg(long)]
        skip_validation: bool,
    },

    /// Switch the default authentication profile
    Switch {
        /// Profile name to set as default
        #[arg(long)]
        name: String,
    },

    /// Remove stored API credentials (all of them unless --name is given)
    Logout {
        /// Remove every stored credential
        #[arg(long, conflicts_with = "name")]
        all: bool,
        /// Remove a single named credential
        #[arg(long)]
        name: Option<String>,
    },

    /// Show current authentication status
    Status,

    /// Validate the credentials commands would use and print a JSON report
    Validate {
        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
}
