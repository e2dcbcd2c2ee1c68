//! Command-line interface definitions.

use crate::config::Dialect;
use clap::{ColorChoice, Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;

/// Pressroom: compile R Markdown sources and drive Hugo
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Project root (default: nearest ancestor with a site config)
    #[arg(short, long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub root: Option<PathBuf>,

    /// Tool config file path (default: pressroom.toml)
    #[arg(short = 'C', long, global = true, default_value = "pressroom.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Hugo binary to use instead of searching for one
    #[arg(long, global = true, value_hint = clap::ValueHint::ExecutablePath)]
    pub hugo: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Compile changed documents and build the site with Hugo
    #[command(visible_alias = "b")]
    Build {
        /// Build for local preview (relative base URL, drafts and future posts)
        #[arg(short, long)]
        local: bool,

        /// Recompile every document, ignoring fingerprints
        #[arg(short, long)]
        full: bool,

        /// Include drafts
        #[arg(short = 'D', long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        drafts: Option<bool>,

        /// Include content with a future publish date
        #[arg(short = 'F', long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        future: Option<bool>,

        /// Theme override for this build
        #[arg(short, long)]
        theme: Option<String>,
    },

    /// Rebuild whenever sources, config or theme change
    #[command(visible_alias = "w")]
    Watch {
        /// Build for local preview
        #[arg(short, long)]
        local: bool,
    },

    /// Run `hugo server` next to the compile loop
    #[command(visible_alias = "s")]
    Serve {
        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short = 'i', long)]
        host: Option<IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Recompile documents on change
        #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        watch: Option<bool>,

        /// Theme override for this session
        #[arg(short, long)]
        theme: Option<String>,
    },

    /// Create a new site
    #[command(visible_alias = "init")]
    NewSite {
        /// Site directory (must be empty or missing)
        #[arg(default_value = ".", value_hint = clap::ValueHint::DirPath)]
        dir: PathBuf,

        /// Site config format
        #[arg(short, long, value_enum, default_value = "yaml")]
        format: Dialect,

        /// Theme to install (`owner/repo[@ref]` or a .zip URL)
        #[arg(short, long, default_value = "yihui/hugo-lithium")]
        theme: String,

        /// Host for `owner/repo` theme references
        #[arg(long)]
        theme_host: Option<String>,

        /// Copy the theme's exampleSite into the new site
        #[arg(long)]
        theme_example: bool,

        /// Skip the sample post
        #[arg(long)]
        no_sample: bool,

        /// Install Hugo when it is not found
        #[arg(long)]
        install_hugo: bool,

        /// Serve the site once created
        #[arg(long)]
        serve: bool,
    },

    /// Create a content file from an archetype
    #[command(visible_alias = "n")]
    NewContent {
        /// Path under the content dir, e.g. `post/hello.Rmd`
        path: PathBuf,

        /// Archetype kind
        #[arg(short, long)]
        kind: Option<String>,

        /// Open the file in $VISUAL or $EDITOR
        #[arg(short, long)]
        open: bool,
    },

    /// Create a post with title, author, date and taxonomies filled in
    #[command(visible_alias = "p")]
    NewPost {
        /// Post title
        title: String,

        /// Author (default: [content] author)
        #[arg(short, long)]
        author: Option<String>,

        /// Publish date, YYYY-MM-DD (default: today)
        #[arg(short, long)]
        date: Option<String>,

        /// Slug (default: derived from the title)
        #[arg(short, long)]
        slug: Option<String>,

        /// Categories (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        categories: Vec<String>,

        /// Tags (comma-separated)
        #[arg(short = 'T', long, value_delimiter = ',')]
        tags: Vec<String>,

        /// Subdirectory of the content dir (default: [content] subdir)
        #[arg(long)]
        subdir: Option<String>,

        /// File extension (default: [content] ext)
        #[arg(short, long)]
        ext: Option<String>,

        /// Archetype kind (default: [content] kind)
        #[arg(short, long)]
        kind: Option<String>,

        /// Open the file in $VISUAL or $EDITOR
        #[arg(short, long)]
        open: bool,
    },

    /// Install a theme into the themes dir
    #[command(visible_alias = "t")]
    InstallTheme {
        /// `owner/repo[@ref]`, a .zip URL, or a local .zip file
        theme: String,

        /// Host for `owner/repo` references
        #[arg(long)]
        host: Option<String>,

        /// Replace an existing theme directory
        #[arg(short, long)]
        force: bool,

        /// Copy the theme's exampleSite into the project
        #[arg(short, long)]
        example: bool,

        /// Do not set `theme` in the site config
        #[arg(long)]
        no_config: bool,
    },

    /// Download Hugo into the install dir
    InstallHugo {
        /// Version to install (default: latest release)
        #[arg(long)]
        version: Option<String>,
    },

    /// Convert content front matter with `hugo convert`
    Convert {
        /// Target dialect
        #[arg(value_enum)]
        to: Dialect,

        /// Convert in place
        #[arg(long = "unsafe")]
        unsafe_: bool,

        /// Write converted content to this directory instead
        #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
        output: Option<PathBuf>,
    },

    /// Print a Hugo shortcode call
    Shortcode {
        /// Shortcode name
        name: String,

        /// Parameters: `key=value` is named, anything else positional
        params: Vec<String>,

        /// Inner content (adds the closing tag)
        #[arg(long)]
        inner: Option<String>,

        /// Use `{{% %}}` delimiters
        #[arg(long)]
        percent: bool,
    },

    /// Show tool and Hugo versions
    Version,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_new_post() {
        let cli = Cli::parse_from([
            "pressroom", "new-post", "Hello World", "-c", "R,stats", "-T", "a", "--date", "2024-01-02",
        ]);
        match cli.command {
            Commands::NewPost {
                title,
                categories,
                tags,
                date,
                ..
            } => {
                assert_eq!(title, "Hello World");
                assert_eq!(categories, ["R", "stats"]);
                assert_eq!(tags, ["a"]);
                assert_eq!(date.as_deref(), Some("2024-01-02"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_parse_serve_flags() {
        let cli = Cli::parse_from(["pressroom", "serve", "-i", "0.0.0.0", "-p", "1313", "-w", "false"]);
        match cli.command {
            Commands::Serve { host, port, watch, .. } => {
                assert_eq!(host, Some("0.0.0.0".parse().unwrap()));
                assert_eq!(port, Some(1313));
                assert_eq!(watch, Some(false));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_convert_dialect() {
        let cli = Cli::parse_from(["pressroom", "convert", "yaml", "--unsafe"]);
        assert!(matches!(
            cli.command,
            Commands::Convert {
                to: Dialect::Yaml,
                unsafe_: true,
                ..
            }
        ));
    }
}
