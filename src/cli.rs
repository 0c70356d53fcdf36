use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Save a URL or search your links, decided from the input itself:
    /// anything that looks like a URL is saved, everything else is searched
    Go {
        /// The text to classify and dispatch
        text: Vec<String>,
    },

    /// Save a URL as a new reference
    Add {
        /// The URL to save
        url: String,
    },

    /// Semantic search over your saved links
    Search {
        /// Free-text query
        query: Vec<String>,
    },

    /// List all saved links, newest first
    List {},

    /// Print the sign-in URL to open in a browser
    Login {},

    /// Sign out and clear the local session
    Logout {},

    /// Show the currently signed-in user
    Whoami {},
}
