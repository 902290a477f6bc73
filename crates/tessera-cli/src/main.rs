mod policy;

use anyhow::{Context, Result, bail};
use std::{env, path::PathBuf, process};
use tessera_config::Config;
use tessera_engine::{
    DeleteOutcome, Direction, EditingPolicy, NodeId, NodeKind, NormalizeMode, Position, Range,
    Tree, classify, delete_backward, delete_forward, delete_range, normalize,
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Show,
    Classify(String),
    Delete(String, String),
    Backspace(String),
    DeleteForward(String),
    Normalize(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Args {
    file: PathBuf,
    config: Option<PathBuf>,
    command: Command,
}

const USAGE: &str = "<file> [--config <path>] <command>

commands:
  show                     print the parsed tree
  classify <pos>           content type on each side of a position
  delete <pos> <pos>       delete a range
  backspace <pos>          delete one step backward
  delete-forward <pos>     delete one step forward
  normalize <pos>          print the normalized caret position

positions are written i/j/k:offset";

fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut rest = args.iter();
    let file = rest.next().ok_or("missing <file>")?;

    let mut config = None;
    let mut words: Vec<&str> = Vec::new();
    while let Some(arg) = rest.next() {
        if arg == "--config" {
            let path = rest.next().ok_or("--config needs a path")?;
            config = Some(PathBuf::from(path));
        } else {
            words.push(arg);
        }
    }

    let command = match words.as_slice() {
        ["show"] => Command::Show,
        ["classify", pos] => Command::Classify(pos.to_string()),
        ["delete", from, to] => Command::Delete(from.to_string(), to.to_string()),
        ["backspace", pos] => Command::Backspace(pos.to_string()),
        ["delete-forward", pos] => Command::DeleteForward(pos.to_string()),
        ["normalize", pos] => Command::Normalize(pos.to_string()),
        [] => return Err("missing <command>".to_string()),
        [name, ..] => return Err(format!("unknown command or wrong arguments: {name}")),
    };

    Ok(Args {
        file: PathBuf::from(file),
        config,
        command,
    })
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from_path(path)?
            .with_context(|| format!("No config file at {}", path.display())),
        None => {
            let config = Config::load()?;
            if config.is_none() {
                log::debug!(
                    "no config at {}, using HTML defaults",
                    Config::config_path().display()
                );
            }
            Ok(config.unwrap_or_default())
        }
    }
}

fn position(tree: &Tree, spec: &str) -> Result<Position> {
    tree.resolve_path(spec)
        .with_context(|| format!("Invalid position '{spec}'"))
}

/// Indented outline of the tree, one node per line.
fn outline(tree: &Tree, node: NodeId, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    let path: Vec<String> = tree.path_of(node).iter().map(usize::to_string).collect();
    let path = path.join("/");
    match tree.get(node) {
        Some(NodeKind::Element(el)) => {
            let mut label = el.tag.to_string();
            for class in &el.classes {
                label.push('.');
                label.push_str(class);
            }
            out.push_str(&format!("{indent}{label} [{path}]\n"));
        }
        Some(NodeKind::Text(text)) => out.push_str(&format!("{indent}{text:?} [{path}]\n")),
        Some(NodeKind::Comment(text)) => out.push_str(&format!("{indent}<!--{text}--> [{path}]\n")),
        None => {}
    }
    for child in tree.children(node) {
        outline(tree, child, depth + 1, out);
    }
}

fn print_outcome(tree: &Tree, outcome: Option<DeleteOutcome>) {
    let Some(outcome) = outcome else {
        println!("nothing to delete");
        return;
    };
    println!("{}", tree.to_markup());
    println!("cursor: {}", tree.path_string(outcome.cursor));
    if outcome.merged {
        println!("merged");
    }
    if outcome.intercepted {
        println!("handled by hook");
    }
    if let Some(report) = outcome.restore {
        log::info!(
            "restoration: {} applied, {} stale, {} unchanged",
            report.applied,
            report.skipped_stale,
            report.unchanged
        );
    }
}

fn run(args: Args) -> Result<()> {
    let config = load_config(args.config.as_ref())?;
    let policy: EditingPolicy = policy::build_policy(&config);

    let markup = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let mut tree = Tree::from_markup(&markup);
    log::debug!("loaded {}", args.file.display());

    match args.command {
        Command::Show => {
            let mut out = String::new();
            for child in tree.children(tree.root()) {
                outline(&tree, child, 0, &mut out);
            }
            print!("{out}");
            println!("{}", tree.to_markup());
        }
        Command::Classify(spec) => {
            let pos = position(&tree, &spec)?;
            let left = classify(&tree, policy.schema(), pos, Direction::Left);
            let right = classify(&tree, policy.schema(), pos, Direction::Right);
            println!("left: {left}");
            println!("right: {right}");
        }
        Command::Delete(from, to) => {
            let range = Range::new(&tree, position(&tree, &from)?, position(&tree, &to)?);
            let outcome = delete_range(&mut tree, &policy, range)?;
            print_outcome(&tree, Some(outcome));
        }
        Command::Backspace(spec) => {
            let pos = position(&tree, &spec)?;
            let outcome = delete_backward(&mut tree, &policy, pos)?;
            print_outcome(&tree, outcome);
        }
        Command::DeleteForward(spec) => {
            let pos = position(&tree, &spec)?;
            let outcome = delete_forward(&mut tree, &policy, pos)?;
            print_outcome(&tree, outcome);
        }
        Command::Normalize(spec) => {
            let pos = position(&tree, &spec)?;
            let normalized = normalize(&tree, &policy, pos, NormalizeMode::Full);
            println!("{}", tree.path_string(normalized));
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("tessera-cli");

    let parsed = match parse_args(args.get(1..).unwrap_or_default()) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Usage: {program} {USAGE}");
            process::exit(1);
        }
    };
    if !parsed.file.exists() {
        bail!("File '{}' does not exist", parsed.file.display());
    }

    run(parsed)
}
