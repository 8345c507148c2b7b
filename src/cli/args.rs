//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum, ValueHint};

/// Browse degree programme trees from the Kori catalog and track student progress
#[derive(Parser, Debug)]
#[command(name = "degreetree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output: -d info, -dd debug, -ddd trace
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Config file (default: global config)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List degree programmes of the configured curriculum period
    Programmes,

    /// Fetch and print a programme or module tree
    Tree {
        /// Group id of the root module
        group_id: String,
        /// How far below the root to fetch
        #[arg(long, value_enum, default_value_t = Depth::Full)]
        depth: Depth,
    },

    /// Show a single course
    Course {
        /// Course group id
        group_id: String,
    },

    /// Full-text course search
    Search {
        /// At least three letters or digits
        keyword: String,
    },

    /// Manage students
    Student {
        #[command(subcommand)]
        command: StudentCommands,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Depth {
    /// Root plus immediate children
    One,
    /// Whole tree
    Full,
}

#[derive(Subcommand, Debug)]
pub enum StudentCommands {
    /// List stored students
    List,

    /// Register a student
    Add {
        /// 3-16 letters or digits
        student_id: String,
        first_name: String,
        last_name: String,
    },

    /// Change a student's name
    Edit {
        student_id: String,
        first_name: String,
        last_name: String,
    },

    /// Show a student and their programme tree
    Show { student_id: String },

    /// Delete a student
    Delete { student_id: String },

    /// Fetch and attach a degree programme
    Programme {
        student_id: String,
        /// Group id of the degree programme
        programme_id: String,
    },

    /// Set or clear a course grade
    Grade {
        student_id: String,
        module_id: String,
        course_id: String,
        /// 0-5, pass or fail; omit to clear
        grade: Option<String>,
    },

    /// Choose a course in a module (fetched if not listed)
    Choose {
        student_id: String,
        module_id: String,
        course_id: String,
    },

    /// Un-choose a course
    Unchoose {
        student_id: String,
        module_id: String,
        course_id: String,
    },

    /// Remove a course from the programme; mandatory courses are kept
    Drop {
        student_id: String,
        course_id: String,
        /// Only delete below this module
        #[arg(long)]
        module: Option<String>,
    },

    /// Show completed credits
    Credits { student_id: String },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Print a config template
    Template,

    /// Show config paths
    Path,
}
