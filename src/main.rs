use clap::{Parser, Subcommand};
use sitekit::env::BuildEnv;
use sitekit::site::{self, BuildOptions};
use sitekit::{config, output};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

fn version_string() -> &'static str {
    let on_tag = env!("SITEKIT_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("SITEKIT_GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "sitekit")]
#[command(about = "Static site builder for a bilingual (uk/en) marketing site")]
#[command(long_about = "\
Static site builder for a bilingual (uk/en) marketing site

Hand-written Ukrainian pages in the project root are the source of truth.
The build derives everything else:

  site/
  ├── site.toml              # Build config (optional, see gen-config)
  ├── index.html             # Home page → /
  ├── about.html             # → /about/ (about.html and about/index.html)
  ├── style.css, *.js        # Assets, stamped with ?v=<hash>
  ├── img/                   # Source images; variants are written next to them
  └── en/                    # English mirror, regenerated by `translate`

Stages:
  1. images     derive optimized images, favicons and WebP alternates
  2. translate  refresh en/ from the [translate] tables
  3. assemble   rewrite every page into dist/ (SEO, hreflang, analytics, versions)
  4. minify     only when SITE_MINIFY is set

Environment:
  SITE_BASE_URL               canonical origin (default https://alpik.com.ua)
  SITE_GTM_ID                 GTM-XXXX container
  SITE_GA4_ID                 G-XXXX measurement ID
  SITE_ADS_ID                 AW-XXXX Ads account
  SITE_ADS_CONVERSION_LABEL   conversion label for contact clicks
  SITE_MINIFY                 1/true/yes to minify the output

Run 'sitekit gen-config' to print a documented site.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Project root holding the source pages
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Output directory (erased on every assemble)
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Directory for intermediate files (image manifest)
    #[arg(long, default_value = ".sitekit-temp", global = true)]
    temp_dir: PathBuf,

    /// Log every rewrite decision
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Derive image variants listed in [images]
    Images,
    /// Regenerate the English mirror under en/
    Translate,
    /// Write the output tree from the current sources
    Assemble,
    /// Run the full pipeline: images → translate → assemble → minify (default)
    Build,
    /// Print a stock site.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let options = BuildOptions {
        root: cli.root,
        output: cli.output,
        temp_dir: cli.temp_dir,
    };

    match cli.command.unwrap_or(Command::Build) {
        Command::Images => {
            let site = site::load_site_config(&options)?;
            let report = site::run_images(&options, &site)?;
            output::print_images_output(&report);
        }
        Command::Translate => {
            let site = site::load_site_config(&options)?;
            let report = site::run_translate(&options, &site)?;
            output::print_translate_output(&report);
        }
        Command::Assemble => {
            let env = BuildEnv::from_env();
            let site = site::load_site_config(&options)?;
            let report = site::run_assemble(&options, &site, &env)?;
            output::print_assemble_output(&report);
            if let Some(report) = site::run_minify(&options, &env)? {
                output::print_minify_output(&report);
            }
        }
        Command::Build => {
            let report = site::build(&options, &BuildEnv::from_env())?;

            println!("==> Stage 1: Preparing images in {}", options.root.display());
            output::print_images_output(&report.images);

            println!("==> Stage 2: Translating pages → {}/en", options.root.display());
            output::print_translate_output(&report.translate);

            println!("==> Stage 3: Assembling site → {}", options.output.display());
            output::print_assemble_output(&report.assemble);

            if let Some(minify) = &report.minify {
                println!("==> Stage 4: Minifying output");
                output::print_minify_output(minify);
            }

            println!("==> Build complete: {}", options.output.display());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
