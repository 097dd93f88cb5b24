use anyhow::{bail, Context};
use colored::Colorize;
use flowsim_sdk::{
    Branch, BranchCommit, BranchKind, FileId, FileStatus, FileView, SimConfig, Simulator,
    StatusEntry,
};
use serde::Serialize;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    let format = cli.format;
    let verbose = cli.verbose;

    let command = cli.command;
    if let Command::Init(args) = command {
        return cmd_init(config, &args, format);
    }

    let mut sim = Simulator::open(config).context("failed to load simulation state")?;
    let mutated = match command {
        Command::Status => {
            cmd_status(&sim, format)?;
            false
        }
        Command::Log => {
            cmd_log(&sim, format)?;
            false
        }
        Command::History(args) => {
            cmd_history(&sim, args, format)?;
            false
        }
        Command::Graph => {
            cmd_graph(&sim, format)?;
            false
        }
        Command::Branch(BranchArgs { name: None, .. }) => {
            cmd_branches(&sim, format)?;
            false
        }
        command => {
            cmd_mutate(&mut sim, command, format)?;
            true
        }
    };

    if mutated {
        if verbose {
            for event in sim.drain_events() {
                eprintln!("  {}", event.to_string().dimmed());
            }
        }
        sim.save().context("failed to save simulation state")?;
    }
    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<SimConfig> {
    let mut config = match &cli.config {
        Some(path) => SimConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => SimConfig::default(),
    };
    if let Some(state) = &cli.state {
        config.state_file = state.clone();
    }
    Ok(config)
}

fn emit_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_init(config: SimConfig, args: &InitArgs, format: OutputFormat) -> anyhow::Result<()> {
    if config.state_file.exists() && !args.force {
        bail!(
            "{} already exists (use --force to start over)",
            config.state_file.display()
        );
    }
    let sim = Simulator::new(config);
    sim.save()?;
    match format {
        OutputFormat::Json => emit_json(&sim.snapshot()),
        OutputFormat::Text => {
            println!(
                "{} Initialized simulation in {}",
                "✓".green().bold(),
                sim.config().state_file.display().to_string().bold()
            );
            println!("  Branch: {}", "master".yellow());
            Ok(())
        }
    }
}

fn cmd_mutate(sim: &mut Simulator, command: Command, format: OutputFormat) -> anyhow::Result<()> {
    let message = match command {
        Command::Create(args) => {
            let id = sim.create_file(&args.name)?;
            return report_file(sim, id, format, "Created");
        }
        Command::Track(args) => {
            sim.track_file(args.id)?;
            return report_file(sim, args.id, format, "Tracked");
        }
        Command::Edit(args) => {
            sim.edit_file(args.id, &args.content)?;
            return report_file(sim, args.id, format, "Edited");
        }
        Command::Stage(args) => {
            sim.stage_file(args.id)?;
            match sim.file(args.id) {
                Some(_) => return report_file(sim, args.id, format, "Staged"),
                None => format!("Removed {}", args.id),
            }
        }
        Command::Unstage(args) => {
            sim.unstage_file(args.id)?;
            match sim.file(args.id) {
                Some(_) => return report_file(sim, args.id, format, "Unstaged"),
                None => format!("Removed {}", args.id),
            }
        }
        Command::Rm(args) => {
            sim.delete_file(args.id)?;
            match sim.file(args.id) {
                Some(_) => return report_file(sim, args.id, format, "Deleted (staged)"),
                None => format!("Removed {}", args.id),
            }
        }
        Command::Commit(args) => {
            let ids = sim.commit_files(&args.ids, &args.message)?;
            if format == OutputFormat::Json {
                return emit_json(&ids);
            }
            let list: Vec<String> = ids.iter().map(ToString::to_string).collect();
            format!("Committed {} \"{}\"", list.join(", ").yellow(), args.message)
        }
        Command::Revert(args) => {
            sim.revert_file(args.id, args.index)?;
            match sim.file(args.id) {
                Some(_) => return report_file(sim, args.id, format, "Reverted"),
                None => format!("Reverted {} to a removal", args.id),
            }
        }
        Command::Branch(BranchArgs { name: Some(name), from }) => {
            let Some(source) = from else {
                bail!("--from <source> is required to create a branch");
            };
            sim.create_branch(&name, &source)?;
            return report_branch(sim, &name, format, "Created branch");
        }
        Command::CommitCode(args) => {
            sim.commit_code(&args.branch, &args.message)?;
            return report_branch(sim, &args.branch, format, "Committed on");
        }
        Command::Merge(args) => {
            sim.merge_branch(&args.source, &args.target, args.version.as_deref())?;
            if format == OutputFormat::Json {
                return emit_json(&sim.merges().last());
            }
            let into_master =
                sim.branch(&args.target).map(|b| b.kind) == Some(BranchKind::Master);
            match args.version {
                Some(version) if into_master && !version.trim().is_empty() => format!(
                    "Merged {} into {} as {}",
                    args.source.yellow(),
                    args.target.yellow(),
                    version.cyan()
                ),
                _ => format!("Merged {} into {}", args.source.yellow(), args.target.yellow()),
            }
        }
        Command::Init(_)
        | Command::Status
        | Command::Log
        | Command::History(_)
        | Command::Graph
        | Command::Branch(BranchArgs { name: None, .. }) => bail!("not a state-changing command"),
    };

    match format {
        OutputFormat::Json => emit_json(&serde_json::json!({ "result": message })),
        OutputFormat::Text => {
            println!("{} {}", "✓".green().bold(), message);
            Ok(())
        }
    }
}

fn report_file(
    sim: &Simulator,
    id: FileId,
    format: OutputFormat,
    verb: &str,
) -> anyhow::Result<()> {
    let Some(view) = sim.file(id) else {
        bail!("file {id} is gone");
    };
    match format {
        OutputFormat::Json => emit_json(&view),
        OutputFormat::Text => {
            println!("{} {} {}", "✓".green().bold(), verb, describe(&view));
            Ok(())
        }
    }
}

fn report_branch(
    sim: &Simulator,
    name: &str,
    format: OutputFormat,
    verb: &str,
) -> anyhow::Result<()> {
    let Some(branch) = sim.branch(name) else {
        bail!("branch {name} is gone");
    };
    match format {
        OutputFormat::Json => emit_json(branch),
        OutputFormat::Text => {
            println!("{} {} {}", "✓".green().bold(), verb, describe_branch(branch));
            Ok(())
        }
    }
}

fn describe(view: &FileView) -> String {
    let staged = if view.staged { " +staged" } else { "" };
    format!(
        "{} {} [{}{}]",
        view.id.to_string().yellow(),
        view.name.bold(),
        paint(view.status),
        staged
    )
}

fn describe_branch(branch: &Branch) -> String {
    format!(
        "{} ({}, order {}, {} commits)",
        branch.name.yellow().bold(),
        branch.kind,
        branch.order,
        branch.commits.len()
    )
}

fn paint(status: FileStatus) -> colored::ColoredString {
    let label = status.to_string();
    match status {
        FileStatus::Untracked => label.red(),
        FileStatus::Tracked => label.normal(),
        FileStatus::Staged => label.green(),
        FileStatus::Committed => label.blue(),
        FileStatus::Modified => label.yellow(),
        FileStatus::Deleted => label.red().strikethrough(),
    }
}

fn cmd_status(sim: &Simulator, format: OutputFormat) -> anyhow::Result<()> {
    let status = sim.status();
    if format == OutputFormat::Json {
        return emit_json(&status);
    }
    if status.is_clean() {
        println!("Nothing to commit. Working set clean.");
        return Ok(());
    }

    let section = |title: &str, entries: &[StatusEntry]| {
        if entries.is_empty() {
            return;
        }
        println!("{}", title.bold());
        for entry in entries {
            let drift = if status.changed_since_staging.contains(&entry.id) {
                " (changed since staging)".dimmed().to_string()
            } else {
                String::new()
            };
            println!(
                "  {} {} {}{}",
                entry.id.to_string().yellow(),
                entry.name,
                paint(entry.status),
                drift
            );
        }
    };
    section("Staged for commit:", &status.staged);
    section("Modified:", &status.modified);
    section("Changes not staged:", &status.unstaged_changes);
    section("Deleted:", &status.deleted);
    section("Untracked:", &status.untracked);
    section("Committed:", &status.committed);
    Ok(())
}

fn cmd_log(sim: &Simulator, format: OutputFormat) -> anyhow::Result<()> {
    let log = sim.log();
    if format == OutputFormat::Json {
        return emit_json(&log);
    }
    if log.is_empty() {
        println!("No commits yet.");
    }
    for entry in &log {
        let removal = if entry.removal { " (removed)".red().to_string() } else { String::new() };
        println!(
            "{} {} {}@{}  {}{}",
            entry.content_id.short_hex().dimmed(),
            entry.timestamp.to_string().dimmed(),
            entry.id.to_string().yellow(),
            entry.index,
            entry.message,
            removal
        );
    }
    Ok(())
}

fn cmd_history(sim: &Simulator, args: FileArgs, format: OutputFormat) -> anyhow::Result<()> {
    let record = sim.history(args.id)?;
    if format == OutputFormat::Json {
        return emit_json(record);
    }
    println!("History of {} {}", record.id.to_string().yellow(), record.name.bold());
    for (index, version) in record.versions.iter().enumerate() {
        let body = if version.removal {
            "(removed)".red().to_string()
        } else {
            format!("{:?}", version.content)
        };
        println!(
            "  [{index}] {} {}  {}",
            version.content_id.short_hex().dimmed(),
            version.message,
            body
        );
    }
    Ok(())
}

fn cmd_branches(sim: &Simulator, format: OutputFormat) -> anyhow::Result<()> {
    let branches = sim.branches();
    if format == OutputFormat::Json {
        return emit_json(&branches);
    }
    for branch in branches {
        println!("  {}", describe_branch(branch));
        for commit in &branch.commits {
            match commit {
                BranchCommit::Message { message } => println!("    {}", message),
                BranchCommit::Tag { tag } => println!("    {}", tag.cyan()),
            }
        }
    }
    Ok(())
}

fn cmd_graph(sim: &Simulator, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => emit_json(sim.graph()),
        OutputFormat::Text => {
            print!("{}", sim.graph());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn run(state: &std::path::Path, args: &[&str]) -> anyhow::Result<()> {
        let mut argv = vec!["flowsim", "--state", state.to_str().unwrap()];
        argv.extend_from_slice(args);
        run_command(Cli::try_parse_from(argv).unwrap())
    }

    #[test]
    fn commands_persist_between_runs() {
        let dir = tempfile::tempdir().unwrap();
        let state = dir.path().join("state.json");

        run(&state, &["init"]).unwrap();
        run(&state, &["create", "a.txt"]).unwrap();
        run(&state, &["track", "1"]).unwrap();
        run(&state, &["edit", "1", "hello"]).unwrap();
        run(&state, &["stage", "1"]).unwrap();
        run(&state, &["commit", "-m", "init", "1"]).unwrap();
        run(&state, &["branch", "develop", "--from", "master"]).unwrap();
        run(&state, &["commit-code", "develop", "-m", "fix"]).unwrap();

        let sim = Simulator::open(SimConfig {
            state_file: state.clone(),
            ..SimConfig::default()
        })
        .unwrap();
        assert_eq!(sim.file(FileId::new(1)).unwrap().status, FileStatus::Committed);
        assert_eq!(sim.branch("develop").unwrap().commits.len(), 1);
    }

    #[test]
    fn rejected_command_fails_and_saves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let state = dir.path().join("state.json");
        run(&state, &["init"]).unwrap();
        let before = std::fs::read_to_string(&state).unwrap();

        assert!(run(&state, &["commit-code", "master", "-m", "x"]).is_err());
        assert!(run(&state, &["track", "7"]).is_err());
        assert_eq!(std::fs::read_to_string(&state).unwrap(), before);
    }

    #[test]
    fn init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let state = dir.path().join("state.json");
        run(&state, &["init"]).unwrap();
        assert!(run(&state, &["init"]).is_err());
        assert!(run(&state, &["init", "--force"]).is_ok());
    }

    #[test]
    fn config_file_sets_limits() {
        let dir = tempfile::tempdir().unwrap();
        let state = dir.path().join("state.json");
        let config = dir.path().join("flowsim.toml");
        std::fs::write(&config, "[rules]\nmax_commit_message_len = 30\n").unwrap();
        let config = config.to_str().unwrap();

        run(&state, &["--config", config, "branch", "develop", "--from", "master"]).unwrap();
        let long = "a much longer message";
        assert!(run(&state, &["--config", config, "commit-code", "develop", "-m", long]).is_ok());
        assert!(run(&state, &["commit-code", "develop", "-m", long]).is_err());
    }
}
