use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use slidenav::SlideFragment;
use slidenav::config::Config;

use crate::app::LaunchOptions;

#[derive(Parser)]
#[command(name = "slidenav")]
#[command(author, version, about)]
#[command(long_about = "A slide presentation controller.\n\n\
    Navigate with the keyboard, swipes or clicks; the current slide is kept\n\
    in the address fragment (#slide-N).\n\n\
    Examples:\n  \
    slidenav talk.md               Present (fullscreen)\n  \
    slidenav talk.md --windowed    Present in a window\n  \
    slidenav 'talk.md#slide-4'     Start on slide 4\n  \
    slidenav config show           Show configuration")]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Markdown deck to present, optionally followed by `#slide-N`
    pub file: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Launch in a window instead of fullscreen
    #[arg(long, global = false)]
    pub windowed: bool,

    /// Start on a specific slide (1-indexed)
    #[arg(long, global = false)]
    pub slide: Option<usize>,

    /// Color theme for the presenter chrome
    #[arg(long, value_enum, global = false)]
    pub theme: Option<ThemeName>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// View and modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Display current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (defaults.theme, defaults.start_slide, defaults.windowed)
        key: String,

        /// Value to set
        value: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ThemeName {
    Light,
    Dark,
}

impl ThemeName {
    fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        match self.command {
            Some(Commands::Config { command }) => crate::commands::config::run(command),
            Some(Commands::Completion { shell }) => {
                crate::commands::completion::run(shell);
                Ok(())
            }
            Some(Commands::Version) => {
                crate::commands::print_version();
                Ok(())
            }
            None => {
                let Some(arg) = self.file.as_deref() else {
                    use clap::CommandFactory;
                    let mut cmd = Self::command();
                    cmd.print_help()?;
                    println!();
                    return Ok(());
                };
                let (file, fragment) = split_fragment(arg);
                if !file.exists() {
                    anyhow::bail!("File not found: {}", file.display());
                }

                let config = Config::load_or_default();
                let options = LaunchOptions {
                    windowed: self.windowed || config.windowed(),
                    initial_fragment: initial_fragment(self.slide, fragment, &config),
                    theme: self.theme.map(|t| t.as_str().to_string()),
                    config_theme: config.theme().map(str::to_string),
                };
                crate::app::run(file, options)
            }
        }
    }
}

/// Split `deck.md#slide-3` into the path and the fragment. A `#` that is
/// part of an existing file name is left alone.
fn split_fragment(arg: &str) -> (PathBuf, Option<String>) {
    if Path::new(arg).exists() {
        return (PathBuf::from(arg), None);
    }
    match arg.rsplit_once('#') {
        Some((path, fragment)) if !path.is_empty() => {
            (PathBuf::from(path), Some(fragment.to_string()))
        }
        _ => (PathBuf::from(arg), None),
    }
}

/// Pick the starting fragment: `--slide` beats the file's fragment, which
/// beats the configured start slide.
fn initial_fragment(
    slide: Option<usize>,
    fragment: Option<String>,
    config: &Config,
) -> Option<String> {
    slide
        .map(|n| SlideFragment(n).to_string())
        .or(fragment)
        .or_else(|| config.start_slide().map(|n| SlideFragment(n).to_string()))
}
