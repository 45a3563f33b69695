//! Command dispatch: load the document, run one engine operation, report.

use std::io::{self, Write};
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::EditSession;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::Settings;
use crate::domain::render::default_label;
use crate::domain::{CascadeDecision, CustomProps, Forest, IconChoice, TreeNode, TreeRender};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    if let Commands::Completion { shell } = &cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let settings = Settings::load(cli.config.as_deref())?;
    let container = ServiceContainer::new(settings);
    let out = cli.output.as_deref();

    match &cli.command {
        Commands::Show { file } => cmd_show(&container, file),
        Commands::Validate { file } => cmd_validate(&container, file),
        Commands::Seed { file } => cmd_seed(&container, file, out),
        Commands::AddSibling {
            file,
            target,
            name,
            branch,
        } => edit(&container, file, out, |s| {
            let name = name.as_deref().unwrap_or(&container.settings.default_node_name);
            s.add_sibling(target, name, !branch).map(|_| ())
        }),
        Commands::AddChild { file, parent, name } => edit(&container, file, out, |s| {
            let name = name.as_deref().unwrap_or(&container.settings.default_node_name);
            s.add_child(parent, name).map(|_| ())
        }),
        Commands::Duplicate { file, id } => edit(&container, file, out, |s| s.duplicate(id).map(|_| ())),
        Commands::Delete { file, id } => edit(&container, file, out, |s| s.delete(id).map(|_| ())),
        Commands::Rename { file, id, name } => {
            edit(&container, file, out, |s| s.rename(id, name).map(|_| ()))
        }
        Commands::Icon {
            file,
            id,
            icon,
            user,
            cascade,
            single: _,
            dismiss,
        } => {
            let decision = if *cascade {
                CascadeDecision::Cascade
            } else if *dismiss {
                CascadeDecision::Dismiss
            } else {
                CascadeDecision::Single
            };
            edit(&container, file, out, |s| {
                s.pick_icon(id, IconChoice::new(icon.as_str(), *user));
                s.confirm_icon(decision).map(|_| ())
            })
        }
        Commands::Props { file, id, props } => {
            let props: CustomProps = props.iter().cloned().collect();
            edit(&container, file, out, |s| s.set_custom_props(id, &props).map(|_| ()))
        }
        Commands::Expand {
            file,
            id,
            all,
            collapse,
        } => edit(&container, file, out, |s| {
            let expanded = !collapse;
            match (id, all) {
                (_, true) if expanded => s.expand_all().map(|_| ()),
                (_, true) => s.collapse_all().map(|_| ()),
                (Some(id), false) => s.set_expanded(id, expanded).map(|_| ()),
                (None, false) => Ok(()),
            }
        }),
        Commands::Filter { file, term, json } => cmd_filter(&container, file, term, *json),
        Commands::Select { file, ids, single } => cmd_select(&container, file, ids, *single),
        Commands::Lines { file, id } => cmd_lines(&container, file, id),
        Commands::Config { command } => cmd_config(&container, command),
        Commands::Completion { .. } => Ok(()),
    }
}

fn load(container: &ServiceContainer, file: &Path) -> CliResult<Forest> {
    if !container.fs.exists(file) {
        return Err(CliError::MissingInput(file.to_path_buf()));
    }
    Ok(container.tree_service().load(file)?)
}

/// Writes the document to `--output`, stdout for "-", or back in place.
fn persist(container: &ServiceContainer, file: &Path, out: Option<&Path>, tree: &Forest) -> CliResult<()> {
    match out {
        Some(path) if path == Path::new("-") => {
            let json = container.tree_service().to_json(tree)?;
            writeln!(io::stdout().lock(), "{json}").map_err(|e| InfraError::io("write document to stdout", e))?;
        }
        Some(path) => {
            container.tree_service().save(path, tree)?;
            output::action("Saved", &path.display());
        }
        None => {
            container.tree_service().save(file, tree)?;
            output::action("Saved", &file.display());
        }
    }
    Ok(())
}

#[instrument(level = "debug", skip(container, op))]
fn edit<F>(container: &ServiceContainer, file: &Path, out: Option<&Path>, op: F) -> CliResult<()>
where
    F: FnOnce(&mut EditSession) -> crate::application::ApplicationResult<()>,
{
    let tree = load(container, file)?;
    let before = tree.len();
    let mut session = container.session(tree);
    op(&mut session)?;
    let tree = session.into_tree();
    debug!("edit done: {before} -> {} nodes", tree.len());
    persist(container, file, out, &tree)
}

fn cmd_show(container: &ServiceContainer, file: &Path) -> CliResult<()> {
    let tree = load(container, file)?;
    output::info(&tree.to_tree_string());
    output::header("Summary");
    output::detail(&format!("nodes:  {}", tree.len()));
    output::detail(&format!("depth:  {}", tree.depth()));
    output::detail(&format!("leaves: {}", tree.leaf_ids().len()));
    Ok(())
}

fn cmd_validate(container: &ServiceContainer, file: &Path) -> CliResult<()> {
    let tree = load(container, file)?;
    output::success(&format!("{}: {} nodes, valid", file.display(), tree.len()));
    Ok(())
}

fn cmd_seed(container: &ServiceContainer, file: &Path, out: Option<&Path>) -> CliResult<()> {
    if !container.fs.exists(file) {
        return Err(CliError::MissingInput(file.to_path_buf()));
    }
    let mut ids = container.id_generator();
    let tree = container.tree_service().load_seeded(file, ids.as_mut())?;
    persist(container, file, out, &tree)
}

fn cmd_filter(container: &ServiceContainer, file: &Path, term: &str, json: bool) -> CliResult<()> {
    let session = container.session(load(container, file)?);
    let filtered = session.filtered(term);
    if json {
        output::info(&container.tree_service().to_json(&filtered)?);
    } else if filtered.is_empty() {
        output::warning(&format!("nothing matches '{term}'"));
    } else {
        output::info(&filtered.to_tree_string());
    }
    Ok(())
}

fn cmd_select(container: &ServiceContainer, file: &Path, ids: &[String], single: bool) -> CliResult<()> {
    let mut session = container.session(load(container, file)?);
    if single {
        let mut policy = container.settings.selection;
        policy.multiple = false;
        session.set_policy(policy);
    }
    for id in ids {
        if !session.toggle(id) {
            output::warning(&format!("cannot toggle '{id}'"));
        }
    }

    let rendered = session
        .tree()
        .to_tree_with(&|node: &TreeNode| {
            format!("{} {}", session.state_of(node.id().as_str()).glyph(), default_label(node))
        });
    output::info(&rendered);
    output::header("Selected");
    output::detail(&session.selection().selected().iter().join(", "));
    Ok(())
}

fn cmd_lines(container: &ServiceContainer, file: &Path, id: &str) -> CliResult<()> {
    let session = container.session(load(container, file)?);
    let Some(node) = session.tree().get(id) else {
        return Err(CliError::InvalidArgs(format!("unknown node '{id}'")));
    };
    let guides = session.line_guides(id);
    let prefix: String = guides
        .iter()
        .map(|&last| if last { "    " } else { "│   " })
        .collect();
    output::info(&format!("{prefix}{}", default_label(node)));
    output::detail(&format!("path:   {}", session.tree().path_to(id).join(" / ")));
    output::detail(&format!("guides: [{}]", guides.iter().join(", ")));
    Ok(())
}

fn cmd_config(container: &ServiceContainer, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => output::info(&container.settings.to_toml()?),
        ConfigCommands::Template => output::info(&Settings::template()),
    }
    Ok(())
}
