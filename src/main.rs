use clap::{Parser, Subcommand};
use plainblog::build::{self, BuildOptions, Overrides};
use plainblog::content::PostFormat;
use plainblog::{config, new_post, output, theme};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "plainblog")]
#[command(about = "Static blog generator for plain-text posts")]
#[command(long_about = "\
Static blog generator for plain-text posts

Every .txt or .md file in the content directory is a post. The first line
is the title, the rest is the body, and the file's modification time is its
date. Posts are listed newest first.

Project structure:

  .
  ├── config.toml                  # Site config (optional)
  ├── content/
  │   ├── 01.hello-world.txt       # Post: title line, blank line, body
  │   ├── 02.notes.md              # Markdown post
  │   └── navi.txt                 # External links: name | url | date
  └── themes/
      └── minimal/
          ├── theme.toml           # Optional name and description
          ├── templates/
          │   ├── base.html        # Page shell
          │   └── post.html        # Post body
          └── static/              # Copied to <output>/static/

Templates use {{ title }}, {{ content }}, {{ date }}, {{ base_path }},
{{ site_title }}, {{ navigation }}, {{ reading_time }} and {{ word_count }}.

Run 'plainblog gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Project root holding config.toml
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Content directory (overrides config.toml)
    #[arg(long, global = true)]
    source: Option<PathBuf>,

    /// Output directory (overrides config.toml)
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Themes directory (overrides config.toml)
    #[arg(long, global = true)]
    themes: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

/// Theme selection shared by commands that read a theme.
#[derive(clap::Args, Clone)]
struct ThemeArgs {
    /// Theme directory name under the themes directory
    #[arg(long, env = "BLOG_THEME")]
    theme: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Regenerate the whole site into the output directory
    Build(ThemeArgs),
    /// Load config, theme and posts without writing anything
    Check(ThemeArgs),
    /// Create a new numbered post in the content directory
    New {
        /// Post title
        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,
        /// Create a markdown (.md) post instead of plain text
        #[arg(long)]
        markdown: bool,
    },
    /// List available themes, marking the one a build would use
    Themes(ThemeArgs),
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let overrides = |theme: Option<String>| Overrides {
        content_dir: cli.source.clone(),
        output_dir: cli.output.clone(),
        themes_dir: cli.themes.clone(),
        theme,
    };

    match &cli.command {
        Command::Build(args) => {
            let options = BuildOptions::load(&cli.root, &overrides(args.theme.clone()))?;
            println!("==> Building {}", options.output_dir.display());
            let report = build::build_site(&options)?;
            output::print_build_output(&report);
        }
        Command::Check(args) => {
            let options = BuildOptions::load(&cli.root, &overrides(args.theme.clone()))?;
            println!("==> Checking {}", options.content_dir.display());
            let inventory = build::check_site(&options)?;
            output::print_check_output(&inventory);
        }
        Command::New { title, markdown } => {
            let options = BuildOptions::load(&cli.root, &overrides(None))?;
            let format = if *markdown {
                PostFormat::Markdown
            } else {
                PostFormat::Text
            };
            let path = new_post::create_post(&options.content_dir, &title.join(" "), format)?;
            output::print_new_post(&path);
        }
        Command::Themes(args) => {
            let options = BuildOptions::load(&cli.root, &overrides(args.theme.clone()))?;
            let themes = theme::list_themes(&options.themes_dir)?;
            output::print_themes(&themes, &options.theme);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Log to stderr so command output on stdout stays clean.
///
/// Default level is `warn`; `-v` shows build stages, `-vv` every file.
/// `RUST_LOG` overrides both.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .without_time()
        .with_target(false)
        .with_writer(std::io::stderr);
    let filter_layer = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
