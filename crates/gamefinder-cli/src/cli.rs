//! Argument parsing, startup and command dispatch.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use gamefinder_config::CatalogOverrides;
use gamefinder_telemetry::{
    GlobalContextGuard, LoggingConfig, build_sha, init_logging, with_command_context,
};

use crate::client::{AppContext, CliResult};
use crate::commands::browse::{handle_browse, handle_featured};
use crate::commands::game::{handle_game, handle_genres, handle_platforms};
use crate::commands::live::handle_live;
use crate::commands::wishlist::{
    handle_wishlist_add, handle_wishlist_list, handle_wishlist_remove, handle_wishlist_toggle,
};

/// Parses CLI arguments, installs logging and executes the requested command.
/// Returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    let command_name = command_label(&cli.command);
    let ctx = match AppContext::from_env(&cli) {
        Ok(ctx) => ctx,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            return err.exit_code();
        }
    };

    let logging = LoggingConfig {
        level: &ctx.config.logging.level,
        format: ctx.config.logging.format,
        build_sha: option_env!("GAMEFINDER_BUILD_SHA").unwrap_or_else(build_sha),
    };
    if let Err(err) = init_logging(&logging) {
        eprintln!("warning: logging unavailable: {err}");
    }
    let _context = GlobalContextGuard::new(command_name);

    match with_command_context(command_name, dispatch(cli.command, &ctx)).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

async fn dispatch(command: Command, ctx: &AppContext) -> CliResult<()> {
    match command {
        Command::Browse(args) => handle_browse(ctx, args).await,
        Command::Featured => handle_featured(ctx).await,
        Command::Game(args) => handle_game(ctx, args).await,
        Command::Genres => handle_genres(ctx).await,
        Command::Platforms => handle_platforms(ctx).await,
        Command::Wishlist(wishlist) => match wishlist {
            WishlistCommand::List => handle_wishlist_list(ctx),
            WishlistCommand::Add(args) => handle_wishlist_add(ctx, args).await,
            WishlistCommand::Remove(args) => handle_wishlist_remove(ctx, args),
            WishlistCommand::Toggle(args) => handle_wishlist_toggle(ctx, args).await,
        },
        Command::Live(args) => handle_live(ctx, args).await,
    }
}

#[derive(Parser)]
#[command(
    name = "gamefinder",
    about = "Search, filter and save games from the online catalog"
)]
pub(crate) struct Cli {
    #[arg(long, global = true, help = "Catalog API base URL")]
    pub(crate) api_url: Option<String>,
    #[arg(long, global = true, help = "Catalog API key")]
    pub(crate) api_key: Option<String>,
    #[arg(long, global = true, help = "Games requested per page (1-40)")]
    pub(crate) page_size: Option<u32>,
    #[arg(long, global = true, help = "Per-request timeout in seconds")]
    pub(crate) timeout_secs: Option<u64>,
    #[arg(long, global = true, help = "Directory holding the wishlist")]
    pub(crate) data_dir: Option<PathBuf>,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        env = "GAMEFINDER_OUTPUT",
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render structured data"
    )]
    pub(crate) output: OutputFormat,
    #[command(subcommand)]
    pub(crate) command: Command,
}

impl Cli {
    pub(crate) fn overrides(&self) -> CatalogOverrides {
        CatalogOverrides {
            api_url: self.api_url.clone(),
            api_key: self.api_key.clone(),
            page_size: self.page_size,
            timeout_secs: self.timeout_secs,
            data_dir: self.data_dir.clone(),
        }
    }
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Browse games matching filters, optionally loading several pages.
    Browse(BrowseArgs),
    /// Show the top-rated featured panel.
    Featured,
    /// Show one game with its screenshots.
    Game(GameArgs),
    /// List genres usable with --genres.
    Genres,
    /// List platforms usable with --platforms.
    Platforms,
    /// Manage the local wishlist.
    #[command(subcommand)]
    Wishlist(WishlistCommand),
    /// Search interactively; results refresh once typing pauses.
    Live(LiveArgs),
}

#[derive(Subcommand)]
pub(crate) enum WishlistCommand {
    /// List saved games.
    List,
    /// Save a game by id.
    Add(GameArgs),
    /// Remove a saved game.
    Remove(GameArgs),
    /// Save a game, or remove it when already saved.
    Toggle(GameArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct BrowseArgs {
    #[arg(long, help = "Free-text search")]
    pub(crate) search: Option<String>,
    #[arg(long, help = "Sort key such as -rating, name or -released")]
    pub(crate) ordering: Option<String>,
    #[arg(long, help = "Comma-separated platform ids")]
    pub(crate) platforms: Option<String>,
    #[arg(long, help = "Comma-separated genre ids")]
    pub(crate) genres: Option<String>,
    #[arg(long, help = "Minimum rating (0-5)")]
    pub(crate) rating_min: Option<f64>,
    #[arg(long, help = "Maximum rating (0-5)")]
    pub(crate) rating_max: Option<f64>,
    #[arg(
        long,
        help = "Start from a saved query string, e.g. 'search=zelda&ordering=-rating&page=2'"
    )]
    pub(crate) query: Option<String>,
    #[arg(
        long,
        default_value_t = 1,
        value_parser = clap::value_parser!(u32).range(1..=50),
        help = "Number of pages to accumulate"
    )]
    pub(crate) pages: u32,
}

#[derive(Args, Debug)]
pub(crate) struct GameArgs {
    #[arg(help = "Catalog game id")]
    pub(crate) id: u64,
}

#[derive(Args, Debug, Default)]
pub(crate) struct LiveArgs {
    #[arg(long, help = "Override the search debounce window in milliseconds")]
    pub(crate) debounce_ms: Option<u64>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}

const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::Browse(_) => "browse",
        Command::Featured => "featured",
        Command::Game(_) => "game",
        Command::Genres => "genres",
        Command::Platforms => "platforms",
        Command::Wishlist(WishlistCommand::List) => "wishlist_list",
        Command::Wishlist(WishlistCommand::Add(_)) => "wishlist_add",
        Command::Wishlist(WishlistCommand::Remove(_)) => "wishlist_remove",
        Command::Wishlist(WishlistCommand::Toggle(_)) => "wishlist_toggle",
        Command::Live(_) => "live",
    }
}
