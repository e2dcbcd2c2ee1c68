//! Pressroom - compile R Markdown sources and drive Hugo.

mod cli;
mod compiler;
mod config;
mod core;
mod embed;
mod freshness;
mod generator;
mod logger;
mod orchestrator;
mod serve;
mod theme;
mod utils;

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::Options;
use generator::Generator;
use orchestrator::Orchestrator;
use theme::{InstallOptions, ThemeReference};
use utils::shortcode::{Delimiter, Shortcode};

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let options = Options::load(&cli)?;

    match &cli.command {
        Commands::Build { local, full, .. } => {
            let orchestrator = Orchestrator::new(&options, Generator::discover(&options)?);
            let report = orchestrator.build(*local, *full)?;
            log!("build"; "{}", report.summary());
            Ok(())
        }
        Commands::Watch { local } => {
            let orchestrator = Orchestrator::new(&options, Generator::discover(&options)?);
            Ok(orchestrator.watch(*local)?)
        }
        Commands::Serve { theme, .. } => {
            let orchestrator = Orchestrator::new(&options, Generator::discover(&options)?);
            Ok(serve::serve(&options, &orchestrator, theme.clone())?)
        }
        Commands::NewSite {
            dir,
            format,
            theme,
            theme_example,
            no_sample,
            install_hugo,
            serve,
            ..
        } => {
            let site = cli::site::NewSite {
                dir: dir.clone(),
                format: *format,
                theme: theme.clone(),
                theme_example: *theme_example,
                sample: !no_sample,
                install_hugo: *install_hugo,
            };
            let (options, generator) = cli::site::new_site(&options, &site)?;
            if *serve {
                let orchestrator = Orchestrator::new(&options, generator);
                serve::serve(&options, &orchestrator, None)?;
            }
            Ok(())
        }
        Commands::NewContent { path, kind, open } => {
            let generator = Generator::discover(&options)?;
            let kind = kind.as_deref().or(options.content.kind.as_deref());
            let path = cli::content::new_content(&options, &generator, path, kind)?;
            if *open {
                cli::content::open_in_editor(&path)?;
            }
            Ok(())
        }
        Commands::NewPost {
            title,
            author,
            date,
            slug,
            categories,
            tags,
            subdir,
            ext,
            kind,
            open,
        } => {
            let generator = Generator::discover(&options)?;
            let post = cli::content::NewPost {
                title: title.clone(),
                author: author.clone(),
                date: date.clone(),
                slug: slug.clone(),
                categories: categories.clone(),
                tags: tags.clone(),
                subdir: subdir.clone(),
                ext: ext.clone(),
                kind: kind.clone(),
            };
            let path = cli::content::new_post(&options, &generator, &post)?;
            if *open {
                cli::content::open_in_editor(&path)?;
            }
            Ok(())
        }
        Commands::InstallTheme {
            theme,
            force,
            example,
            no_config,
            ..
        } => {
            let reference = ThemeReference::parse(theme)?;
            let install = InstallOptions {
                force: *force,
                example_site: *example,
                skip_config: *no_config,
            };
            theme::install_theme(&options.site()?, &reference, &options.theme.host, &install)
                .with_context(|| format!("Failed to install theme `{reference}`"))?;
            Ok(())
        }
        Commands::InstallHugo { .. } => {
            generator::install(&options)?;
            Ok(())
        }
        Commands::Convert {
            to,
            unsafe_,
            output,
        } => {
            let generator = Generator::discover(&options)?;
            cli::convert::convert(&options, &generator, *to, *unsafe_, output.as_deref())
        }
        Commands::Shortcode {
            name,
            params,
            inner,
            percent,
        } => {
            println!("{}", shortcode(name, params, inner.as_deref(), *percent));
            Ok(())
        }
        Commands::Version => print_versions(&options),
    }
}

fn shortcode(name: &str, params: &[String], inner: Option<&str>, percent: bool) -> Shortcode {
    let mut sc = params.iter().fold(Shortcode::new(name), |sc, raw| sc.param(raw));
    if percent {
        sc = sc.delimiter(Delimiter::Percent);
    }
    if let Some(inner) = inner {
        sc = sc.inner(inner);
    }
    sc
}

/// Tool version, then the Hugo binary and version if one is found.
fn print_versions(options: &Options) -> Result<()> {
    println!("pressroom {}", env!("CARGO_PKG_VERSION"));
    let generator = match Generator::discover(options) {
        Ok(generator) => generator,
        Err(e) => {
            log!("warn"; "{}", e);
            return Ok(());
        }
    };
    match generator.version(&options.root)? {
        Some(version) => println!("hugo {} ({})", version, generator.binary().display()),
        None => println!("hugo (unknown version) ({})", generator.binary().display()),
    }
    Ok(())
}
