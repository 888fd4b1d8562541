use clap::{Parser, Subcommand};
use penpress::{admin, config, generate};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "penpress")]
#[command(about = "Minimal file-based blog publishing")]
#[command(long_about = "\
Minimal file-based blog publishing

Your filesystem is the data source. Markdown files become posts, two-line
text stubs become external links, and a numeric filename prefix controls
homepage order.

Content structure:

  penpress.toml                    # Site config (optional, defaults shown by gen-config)
  theme/main.html                  # Page template (provisioned on first run)
  content/
  ├── posts/
  │   ├── 010--hello-world.md      # Post (numbered = ordered on the homepage)
  │   ├── my-notes.md              # Unnumbered posts sort last, by title
  │   └── wip.md                   # status: draft in front matter = unpublished
  └── links/
      └── 020--conference.txt      # Line 1: '# Title', line 2: URL
  public/                          # Generated site (index, posts/, sitemap.xml)
  data/                            # Login tokens, sessions, rate-limit records

Posts start with front matter between '---' lines; 'title' and 'date' are
required, 'status: draft' keeps a post out of the published site, and
'<!--more-->' in the body marks the homepage teaser cut.

Run 'penpress gen-config' for a documented penpress.toml.")]
#[command(version)]
struct Cli {
    /// Config file
    #[arg(long, default_value = "penpress.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate the site into the output directory
    Generate {
        /// Rewrite every page even when its output is up to date
        #[arg(long)]
        force: bool,
    },
    /// Validate config and content without writing output
    Check,
    /// List posts with title and creation time
    List,
    /// Issue a one-time admin login link (no mail, no rate limit)
    Login,
    /// Print a stock penpress.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    env_logger::init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = config::BlogConfig::load(&cli.config)?;

    match cli.command {
        Command::Generate { force } => {
            let summary = generate::generate(&config, force)?;
            println!("Generated: {summary}");
            println!("Site at {}", config.output_dir.display());
        }
        Command::Check => {
            config.validate()?;
            let admin = admin::Admin::new(config);
            let posts = admin.list_posts()?;
            let problems = admin.check_content()?;
            if !problems.is_empty() {
                for problem in &problems {
                    eprintln!("{problem}");
                }
                return Err(format!("{} content problem(s) found", problems.len()).into());
            }
            println!("Config OK, {} post(s) found", posts.len());
        }
        Command::List => {
            let admin = admin::Admin::new(config);
            for post in admin.list_posts()? {
                let title = if post.title.is_empty() {
                    "(untitled)"
                } else {
                    &post.title
                };
                println!("{:<40} {}", post.filename, title);
            }
        }
        Command::Login => {
            let admin = admin::Admin::new(config);
            let (_, url) = admin.issue_login_link()?;
            println!("{url}");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }
    Ok(())
}
