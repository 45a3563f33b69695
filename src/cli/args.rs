//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};
use serde_json::Value;

/// Tree documents for form-builder pickers: edit, select, search
#[derive(Parser, Debug)]
#[command(name = "formtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (default: $XDG_CONFIG_HOME/formtree/formtree.toml)
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Write the edited document here instead of in place ("-" for stdout)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the tree
    Show {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Check a document against the node rules
    Validate {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Assign fresh ids to every node of a document
    Seed {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Insert a node right after TARGET
    AddSibling {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        target: String,
        /// Node name (default: settings.default_node_name)
        #[arg(short, long)]
        name: Option<String>,
        /// Create a branch instead of a leaf
        #[arg(short, long)]
        branch: bool,
    },

    /// Append a leaf under PARENT
    AddChild {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        parent: String,
        /// Node name (default: settings.default_node_name)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Copy a subtree with fresh ids next to the original
    Duplicate {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        id: String,
    },

    /// Remove a node and its subtree
    Delete {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        id: String,
    },

    /// Change a node's name
    Rename {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        id: String,
        name: String,
    },

    /// Pick an icon for a node and decide how far it applies
    Icon {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        id: String,
        icon: String,
        /// Icon was uploaded by the user
        #[arg(short, long)]
        user: bool,
        /// Apply to every branch (branch target) or every child node (leaf target)
        #[arg(long, conflicts_with_all = ["single", "dismiss"])]
        cascade: bool,
        /// Apply to the target only (default)
        #[arg(long, conflicts_with = "dismiss")]
        single: bool,
        /// Discard the choice
        #[arg(long)]
        dismiss: bool,
    },

    /// Merge custom properties into a node
    Props {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        id: String,
        /// KEY=VALUE, VALUE parsed as JSON when possible
        #[arg(required = true, value_parser = parse_prop)]
        props: Vec<(String, Value)>,
    },

    /// Set expand/collapse hints
    Expand {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Node to change (omit with --all)
        #[arg(required_unless_present = "all")]
        id: Option<String>,
        /// Every branch node
        #[arg(short, long, conflicts_with = "id")]
        all: bool,
        /// Collapse instead of expand
        #[arg(short, long)]
        collapse: bool,
    },

    /// Show only nodes matching TERM and their ancestors
    Filter {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        term: String,
        /// Print the filtered document as JSON
        #[arg(long)]
        json: bool,
    },

    /// Click checkboxes in order and print the resulting tri-state tree
    Select {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        ids: Vec<String>,
        /// Single-selection mode regardless of settings
        #[arg(long)]
        single: bool,
    },

    /// Print the line guides drawn in front of a node
    Lines {
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        id: String,
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

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Print a commented config template
    Template,
}

fn parse_prop(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{raw}'"));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use serde_json::json;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn given_prop_values_when_parsing_then_json_or_string() {
        assert_eq!(parse_prop("n=4").unwrap(), ("n".to_string(), json!(4)));
        assert_eq!(parse_prop("on=true").unwrap(), ("on".to_string(), json!(true)));
        assert_eq!(parse_prop("dept=sales").unwrap(), ("dept".to_string(), json!("sales")));
        assert_eq!(parse_prop("eq=a=b").unwrap(), ("eq".to_string(), json!("a=b")));
        assert!(parse_prop("novalue").is_err());
        assert!(parse_prop("=x").is_err());
    }

    #[test]
    fn given_conflicting_icon_flags_when_parsing_then_rejected() {
        let res = Cli::try_parse_from(["formtree", "icon", "t.json", "a", "star", "--cascade", "--dismiss"]);
        assert!(res.is_err());
    }

    #[test]
    fn given_expand_without_target_when_parsing_then_rejected() {
        assert!(Cli::try_parse_from(["formtree", "expand", "t.json"]).is_err());
        assert!(Cli::try_parse_from(["formtree", "expand", "t.json", "--all"]).is_ok());
    }
}
