use tracing::warn;

use crate::cli::GameArgs;
use crate::client::{AppContext, CliResult};
use crate::output::{render_facets, render_game_detail};

pub(crate) async fn handle_game(ctx: &AppContext, args: GameArgs) -> CliResult<()> {
    println!("{}", game_report(ctx, args.id).await?);
    Ok(())
}

pub(crate) async fn handle_genres(ctx: &AppContext) -> CliResult<()> {
    let genres = ctx.catalog()?.fetch_genres().await?;
    println!("{}", render_facets(&genres, ctx.output)?);
    Ok(())
}

pub(crate) async fn handle_platforms(ctx: &AppContext) -> CliResult<()> {
    let platforms = ctx.catalog()?.fetch_platforms().await?;
    println!("{}", render_facets(&platforms, ctx.output)?);
    Ok(())
}

/// Detail and screenshots are requested together; missing screenshots never
/// hide the detail.
pub(crate) async fn game_report(ctx: &AppContext, id: u64) -> CliResult<String> {
    let client = ctx.catalog()?;
    let (detail, screenshots) =
        tokio::join!(client.fetch_game(id), client.fetch_screenshots(id));
    let detail = detail?;
    let screenshots = screenshots.unwrap_or_else(|err| {
        warn!(game_id = id, kind = %err.kind, "screenshots unavailable");
        Vec::new()
    });
    let saved = ctx.wishlist().contains(id);
    render_game_detail(&detail, &screenshots, saved, ctx.output)
}
