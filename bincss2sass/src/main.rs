//! css2sass command-line tool: convert CSS stylesheets to Sass.
//!
//! Usage: css2sass [OPTIONS] [FILE|DIR]
//!
//! Reads from stdin when no path (or `-`) is given. A directory converts
//! every `.css` file in it.

use clap::{ArgAction, Parser};
use libcss2sass::{Css, Options};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Convert flat CSS stylesheets into nested Sass.
#[derive(Parser, Debug)]
#[command(name = "css2sass", version, about)]
struct Cli {
    /// Input file or directory (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Write output to the specified file (not valid with directory input)
    #[arg(short, long, conflicts_with = "write")]
    output: Option<PathBuf>,

    /// Write output next to each input, with a .sass extension
    #[arg(short, long)]
    write: bool,

    /// Only check that the input parses (exit 0 if valid, 1 if invalid)
    #[arg(long)]
    check: bool,

    /// Print the transformed tree outline instead of Sass
    #[arg(long)]
    tree: bool,

    /// Spaces per indentation level (0-16)
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u8).range(0..=16))]
    indent: u8,

    /// Put a blank line after every top-level rule
    #[arg(long)]
    spaced: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn options(&self) -> Options {
        Options::default()
            .indent_width(usize::from(self.indent))
            .blank_line_between_rules(self.spaced)
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let input = cli.input.as_deref().filter(|p| *p != Path::new("-"));

    if let Some(path) = input {
        if path.is_dir() {
            if cli.output.is_some() {
                eprintln!("Error: --output cannot be used with directory input");
                process::exit(1);
            }
            process::exit(process_directory(path, &cli));
        }
    }

    let css = match input {
        Some(path) => match fs::read_to_string(path) {
            Ok(text) => Css::with_options(text, cli.options().filename(path.display().to_string())),
            Err(e) => {
                eprintln!("Error reading {}: {}", path.display(), e);
                process::exit(1);
            }
        },
        None => match Css::from_reader(io::stdin().lock(), cli.options()) {
            Ok(css) => css,
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        },
    };

    process::exit(process_input(&css, input, &cli));
}

/// Log to stderr. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn process_directory(dir: &Path, cli: &Cli) -> i32 {
    let entries = match fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("Error reading directory {}: {}", dir.display(), e);
            return 1;
        }
    };

    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().map(|e| e == "css").unwrap_or(false))
        .collect();
    paths.sort();
    debug!(dir = %dir.display(), files = paths.len(), "converting directory");

    let mut had_errors = false;
    for path in &paths {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("Error reading {}: {}", path.display(), e);
                had_errors = true;
                continue;
            }
        };
        let css = Css::with_options(text, cli.options().filename(path.display().to_string()));
        if process_input(&css, Some(path), cli) != 0 {
            had_errors = true;
        }
    }

    if had_errors {
        1
    } else {
        0
    }
}

/// Convert one document and write the result. Returns the exit code.
fn process_input(css: &Css, input_file: Option<&Path>, cli: &Cli) -> i32 {
    let tree = match css.build_tree() {
        Ok(tree) => tree,
        Err(e) => {
            eprintln!("{}", e);
            return 1;
        }
    };

    if cli.check {
        match input_file {
            Some(path) => println!("{}: ok", path.display()),
            None => println!("ok"),
        }
        return 0;
    }

    let output = if cli.tree {
        tree.to_string()
    } else {
        libcss2sass::render_tree(&tree, css.options())
    };

    match write_text_output(&output, input_file, cli) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{}", e);
            1
        }
    }
}

fn write_text_output(output: &str, input_file: Option<&Path>, cli: &Cli) -> Result<(), String> {
    if let Some(path) = &cli.output {
        fs::write(path, output).map_err(|e| format!("Error writing {}: {}", path.display(), e))
    } else if cli.write {
        let input_path = input_file.ok_or("Error: --write requires an input file")?;
        let output_path = input_path.with_extension("sass");
        fs::write(&output_path, output)
            .map_err(|e| format!("Error writing {}: {}", output_path.display(), e))
    } else {
        print!("{}", output);
        Ok(())
    }
}
