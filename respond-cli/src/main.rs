//! respond CLI
//!
//! Edits the media-query stylesheet of a project from the terminal: list,
//! add and remove breakpoints, set rules, and show how the cascade resolves
//! a selector at a breakpoint.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use respond_common::Preferences;
use respond_css::parse_declaration_line;
use respond_query::{
    FileStore, PALETTE, ParseReport, QueryColor, QueryManager, ResolvedRule, RuleResolver, Session,
    StylesheetStore, parse_width, render_editor,
};

/// respond - responsive breakpoint editor
#[derive(Parser, Debug)]
#[command(name = "respond")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Show the breakpoints of the project in the current directory
    respond list

    # Add a 600px breakpoint and give it a rule
    respond add 600px
    respond rule --width 600 --selector body "color: red;"

    # See what applies to body at 300px
    respond resolve --width 300 --selector body --seed "color: black"

    # Rewrite the stylesheet in canonical form
    respond --file site/css/mq.css format
"#)]
struct Cli {
    /// Project root holding .respond.json
    #[arg(long, value_name = "DIR", default_value = ".", global = true)]
    project: PathBuf,

    /// Stylesheet to edit instead of the one named in the preferences
    #[arg(long, value_name = "PATH", global = true)]
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List breakpoints, narrowest first, with the preview preferences
    List {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Add a breakpoint (e.g. `600` or `600px`)
    Add {
        /// Breakpoint width
        #[arg(value_parser = parse_width)]
        width: u32,
    },
    /// Remove a breakpoint and its rules
    Remove {
        /// Breakpoint width
        #[arg(value_parser = parse_width)]
        width: u32,
    },
    /// Set rules on an existing breakpoint
    Rule {
        /// Breakpoint width
        #[arg(long, value_parser = parse_width)]
        width: u32,
        /// Selector the rules apply to
        #[arg(long)]
        selector: String,
        /// Declarations such as `color: red;`
        #[arg(required = true, value_name = "DECL")]
        declarations: Vec<String>,
    },
    /// Show the rules that apply to a selector at a breakpoint
    Resolve {
        /// Breakpoint width
        #[arg(long, value_parser = parse_width)]
        width: u32,
        /// Selector to resolve
        #[arg(long)]
        selector: String,
        /// Base declarations of the selector, outside any breakpoint
        #[arg(long = "seed", value_name = "DECL")]
        seeds: Vec<String>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Rewrite the stylesheet in canonical form
    Format,
    /// Report blocks that cannot be loaded as breakpoints
    Check,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let path = stylesheet_path(&cli)?;

    match cli.command {
        Command::List { json } => {
            let (manager, _) = load(&path)?;
            if json {
                let queries: Vec<_> = manager.sorted().collect();
                println!("{}", serde_json::to_string_pretty(&queries)?);
            } else {
                let prefs = load_preferences(&cli.project)?;
                print_queries(&manager, &path, &prefs);
            }
        }
        Command::Add { width } => {
            let (mut session, _) = Session::enter(FileStore::new(&path))?;
            let query = session.add_breakpoint(width)?;
            println!("{} {}", "added".green().bold(), swatch(query.width(), query.color()));
        }
        Command::Remove { width } => {
            let (mut session, _) = Session::enter(FileStore::new(&path))?;
            let query = session.remove_breakpoint(width)?;
            println!("{} {}", "removed".red().bold(), swatch(query.width(), query.color()));
        }
        Command::Rule {
            width,
            selector,
            declarations,
        } => {
            let (mut session, _) = Session::enter(FileStore::new(&path))?;
            let _ = session.select(width)?;
            for declaration in &declarations {
                if session.edit_rule(&selector, declaration)? {
                    println!("{} {selector} {{ {} }} @ {width}px", "set".green().bold(), declaration.trim());
                } else {
                    println!("{} not a declaration: '{}'", "skipped".yellow().bold(), declaration.trim());
                }
            }
        }
        Command::Resolve {
            width,
            selector,
            seeds,
            json,
        } => {
            let (manager, _) = load(&path)?;
            let seed = parse_seed(&seeds)?;
            let rules = RuleResolver::new(&manager).resolve(width, &selector, &seed)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&rules)?);
            } else {
                print_resolved(width, &selector, &rules);
            }
        }
        Command::Format => {
            let (mut session, report) = Session::enter(FileStore::new(&path))?;
            session.flush()?;
            println!(
                "{} {} ({} breakpoints, {} blocks dropped)",
                "formatted".green().bold(),
                path.display(),
                session.manager().len(),
                report.skipped.len()
            );
        }
        Command::Check => {
            let (manager, report) = load(&path)?;
            check(&manager, &report, &path)?;
        }
    }

    Ok(())
}

/// Stylesheet location from `--file` or the project preferences.
fn stylesheet_path(cli: &Cli) -> Result<PathBuf> {
    if let Some(file) = &cli.file {
        return Ok(file.clone());
    }
    Ok(load_preferences(&cli.project)?.media_query_path(&cli.project))
}

fn load_preferences(project: &Path) -> Result<Preferences> {
    Preferences::load(project)
        .with_context(|| format!("loading preferences from {}", project.display()))
}

/// Preview settings a host UI reads from the preferences.
fn describe_preferences(prefs: &Preferences) -> String {
    let preview = if prefs.use_live_preview_url {
        "live preview URL"
    } else {
        "open file"
    };
    format!("layout: {}, preview: {preview}", prefs.preferred_layout)
}

/// Read-only load; a missing stylesheet is an empty registry.
fn load(path: &Path) -> Result<(QueryManager, ParseReport)> {
    let css = FileStore::new(path).read()?.unwrap_or_default();
    Ok(QueryManager::from_css(&css))
}

fn parse_seed(seeds: &[String]) -> Result<Vec<(String, String)>> {
    seeds
        .iter()
        .map(|seed| {
            let declaration = parse_declaration_line(seed)?;
            Ok((declaration.property, declaration.value))
        })
        .collect()
}

fn check(manager: &QueryManager, report: &ParseReport, path: &Path) -> Result<()> {
    if report.is_clean() {
        println!(
            "{} {} ({} breakpoints)",
            "ok".green().bold(),
            path.display(),
            manager.len()
        );
        return Ok(());
    }
    for skipped in &report.skipped {
        println!("  {} {skipped}", "-".yellow());
    }
    bail!(
        "{}: {} of {} blocks cannot be edited as breakpoints",
        path.display(),
        report.skipped.len(),
        report.applied + report.skipped.len()
    )
}

fn print_queries(manager: &QueryManager, path: &Path, prefs: &Preferences) {
    println!("=== {} ===", path.display());
    println!("{}", describe_preferences(prefs).dimmed());
    if manager.is_empty() {
        println!("{}", "no breakpoints".dimmed());
        return;
    }
    for query in manager.sorted() {
        let selectors = query.selectors().count();
        let rules: usize = query.selectors().map(|(_, rules)| rules.len()).sum();
        println!(
            "{}  {selectors} selectors, {rules} rules",
            swatch(query.width(), query.color())
        );
    }
}

fn print_resolved(width: u32, selector: &str, rules: &[ResolvedRule]) {
    let editor = render_editor(selector, rules);
    for (index, line) in editor.contents.lines().enumerate() {
        match editor.highlights.iter().find(|h| h.line == index) {
            Some(highlight) => {
                let (r, g, b) = hex_rgb(PALETTE[highlight.color_index % PALETTE.len()].bottom);
                let origin = if highlight.width == width {
                    format!("{}px", highlight.width)
                } else {
                    format!("from {}px", highlight.width)
                };
                println!("{}  {}", line.truecolor(r, g, b), origin.dimmed());
            }
            None => println!("{line}"),
        }
    }
}

/// `600px` painted in the breakpoint's color.
fn swatch(width: u32, color: QueryColor) -> String {
    let (r, g, b) = hex_rgb(color.top);
    format!("{width}px").truecolor(r, g, b).bold().to_string()
}

fn hex_rgb(hex: &str) -> (u8, u8, u8) {
    let channel = |at: usize| {
        hex.get(at..at + 2)
            .and_then(|digits| u8::from_str_radix(digits, 16).ok())
            .unwrap_or(0)
    };
    (channel(1), channel(3), channel(5))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors_parse() {
        assert_eq!(hex_rgb("#2f8fd8"), (0x2f, 0x8f, 0xd8));
        assert_eq!(hex_rgb("#zz"), (0, 0, 0));
    }

    #[test]
    fn seed_declarations_parse() {
        let seed = parse_seed(&["color: black;".to_string()]).unwrap();
        assert_eq!(seed, vec![("color".to_string(), "black".to_string())]);
        assert!(parse_seed(&["color".to_string()]).is_err());
    }

    #[test]
    fn preferences_are_described() {
        assert_eq!(
            describe_preferences(&Preferences::default()),
            "layout: vertical, preview: open file"
        );
        let prefs =
            Preferences::from_json(r#"{"preferredLayout": "horizontal", "useLivePreviewUrl": true}"#)
                .unwrap();
        assert_eq!(describe_preferences(&prefs), "layout: horizontal, preview: live preview URL");
    }

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
