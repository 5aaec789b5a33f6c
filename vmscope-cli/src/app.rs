use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// vmscope - locate the VM function handler of protected .NET assemblies
#[derive(Debug, Parser)]
#[command(name = "vmscope", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared across all subcommands.
#[derive(Debug, Parser)]
pub struct GlobalOptions {
    /// Emit output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose (debug-level) logging output.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Locate the VM type and its function handler.
    Locate {
        /// Path to the module dump.
        #[arg(value_name = "FILE")]
        path: PathBuf,

        /// Scan types on all cores.
        #[arg(long)]
        parallel: bool,

        /// Treatment of several qualifying types: first, report, or reject.
        #[arg(long, default_value = "first")]
        ambiguity: String,
    },

    /// List every type declaring a method that qualifies as handler.
    Candidates {
        /// Path to the module dump.
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },

    /// List types in traversal order.
    Types {
        /// Path to the module dump.
        #[arg(value_name = "FILE")]
        path: PathBuf,

        /// Filter by namespace.
        #[arg(long)]
        namespace: Option<String>,
    },
}
