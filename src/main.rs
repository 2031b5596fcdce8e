use clap::{Parser, Subcommand};
use log::LevelFilter;
use simple_logger::SimpleLogger;
use std::path::PathBuf;
use twig::pipeline::{BuildPaths, SiteBuilder};
use twig::{config, output, scaffold, serve};

#[derive(clap::Args, Debug)]
struct ServeArgs {
    /// Serve the output directory locally after building
    #[arg(long, global = true)]
    serve: bool,

    /// Port for the preview server (default: serve.port from config.toml, else 8080)
    #[arg(long, global = true)]
    port: Option<u16>,
}

#[derive(Parser)]
#[command(name = "twig")]
#[command(about = "Minimal static site generator for markdown documents")]
#[command(long_about = "\
Minimal static site generator for markdown documents

Every .md file under the source directory becomes an HTML page rendered
through one layout template. A generated index.html lists every page.

Content structure:

  content/
  ├── config.toml            # Optional settings (twig gen-config)
  ├── about.md               # → public/about.html
  ├── index.md               # → public/index.html, replaced by the index listing
  └── blog/
      └── first-post.md      # → public/blog/first-post.html
  template.html              # Liquid layout: Title, Content, Root, AllPages

Title: first '# heading' line, else the file name with - and _ as spaces.
Navigation order: newest first (pages are stamped as they are read).

Run 'twig init' (or 'twig --init') to create a sample project.
'twig --serve' builds and then serves the output.")]
#[command(version)]
struct Cli {
    /// Source directory containing markdown files
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    /// Output directory for generated HTML files
    #[arg(long, default_value = "public", global = true)]
    output: PathBuf,

    /// Layout template file
    #[arg(long, default_value = "template.html", global = true)]
    template: PathBuf,

    /// Log debug details
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    serve: ServeArgs,

    /// Create a sample project in DIR (default: current directory) instead of building
    #[arg(long, value_name = "DIR", num_args = 0..=1, default_missing_value = ".")]
    init: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    /// The command to run; a bare `twig` builds.
    fn resolved_command(&mut self) -> Command {
        if let Some(dir) = self.init.take() {
            return Command::Init { dir };
        }
        self.command.take().unwrap_or(Command::Build)
    }
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Build the site (the default when no command is given)
    Build,
    /// Serve an already built output directory
    Serve,
    /// Create a sample project in a directory
    Init {
        /// Target directory
        #[arg(default_value = ".")]
        dir: PathBuf,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut cli = Cli::parse();
    init_logging(cli.verbose)?;

    match cli.resolved_command() {
        Command::Build => {
            let site_config = config::load_config(&cli.source)?;
            let port = cli.serve.port.unwrap_or(site_config.serve.port);
            let paths = BuildPaths::new(&cli.source, &cli.output, &cli.template);

            println!("==> Building {} → {}", cli.source.display(), cli.output.display());
            let report = SiteBuilder::new(paths).with_config(site_config).build()?;
            output::print_build_output(&report);
            println!("Site built successfully! Output: {}", cli.output.display());

            if cli.serve.serve {
                serve::serve(&cli.output, port)?;
            }
        }
        Command::Serve => {
            let site_config = config::load_config(&cli.source)?;
            serve::serve(&cli.output, cli.serve.port.unwrap_or(site_config.serve.port))?;
        }
        Command::Init { dir } => {
            let report = scaffold::init_project(&dir)?;
            output::print_init_output(&report);
            println!("Project initialized in {}", dir.display());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) -> Result<(), log::SetLoggerError> {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    SimpleLogger::new()
        .with_level(LevelFilter::Warn)
        .with_module_level("twig", level)
        .without_timestamps()
        .init()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("twig").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn bare_invocation_builds() {
        let mut cli = parse(&[]);
        assert_eq!(cli.resolved_command(), Command::Build);
        assert!(!cli.serve.serve);
        assert_eq!(cli.source, PathBuf::from("content"));
    }

    #[test]
    fn top_level_serve_and_port_apply_to_default_build() {
        let mut cli = parse(&["--serve", "--port", "9000"]);
        assert_eq!(cli.resolved_command(), Command::Build);
        assert!(cli.serve.serve);
        assert_eq!(cli.serve.port, Some(9000));
    }

    #[test]
    fn serve_flags_after_build_subcommand() {
        let mut cli = parse(&["build", "--serve", "--port", "9001"]);
        assert_eq!(cli.resolved_command(), Command::Build);
        assert!(cli.serve.serve);
        assert_eq!(cli.serve.port, Some(9001));
    }

    #[test]
    fn serve_subcommand_takes_port() {
        let mut cli = parse(&["serve", "--port", "9002"]);
        assert_eq!(cli.resolved_command(), Command::Serve);
        assert_eq!(cli.serve.port, Some(9002));
    }

    #[test]
    fn init_flag_and_subcommand() {
        let mut cli = parse(&["--init"]);
        assert_eq!(
            cli.resolved_command(),
            Command::Init { dir: PathBuf::from(".") }
        );
        let mut cli = parse(&["--init", "site"]);
        assert_eq!(
            cli.resolved_command(),
            Command::Init { dir: PathBuf::from("site") }
        );
        let mut cli = parse(&["init", "blog"]);
        assert_eq!(
            cli.resolved_command(),
            Command::Init { dir: PathBuf::from("blog") }
        );
    }
}
