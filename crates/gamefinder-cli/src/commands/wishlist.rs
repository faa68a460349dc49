use gamefinder_browse::{ToggleOutcome, WishlistEntry};

use crate::cli::GameArgs;
use crate::client::{AppContext, CliResult, log_events};
use crate::output::render_wishlist;

pub(crate) fn handle_wishlist_list(ctx: &AppContext) -> CliResult<()> {
    let store = ctx.wishlist();
    println!("{}", render_wishlist(store.entries(), ctx.output)?);
    Ok(())
}

pub(crate) async fn handle_wishlist_add(ctx: &AppContext, args: GameArgs) -> CliResult<()> {
    println!("{}", add_game(ctx, args.id).await?);
    Ok(())
}

pub(crate) fn handle_wishlist_remove(ctx: &AppContext, args: GameArgs) -> CliResult<()> {
    println!("{}", remove_game(ctx, args.id)?);
    Ok(())
}

pub(crate) async fn handle_wishlist_toggle(ctx: &AppContext, args: GameArgs) -> CliResult<()> {
    println!("{}", toggle_game(ctx, args.id).await?);
    Ok(())
}

pub(crate) async fn add_game(ctx: &AppContext, id: u64) -> CliResult<String> {
    let mut store = ctx.wishlist();
    if let Some(entry) = store.get(id) {
        return Ok(format!("{} is already in the wishlist", entry.name));
    }
    let entry = fetch_entry(ctx, id).await?;
    let name = entry.name.clone();
    let mut stream = store.subscribe();
    store.add(entry)?;
    log_events(&mut stream);
    Ok(format!("added {name} ({} saved)", store.len()))
}

pub(crate) fn remove_game(ctx: &AppContext, id: u64) -> CliResult<String> {
    let mut store = ctx.wishlist();
    let Some(name) = store.get(id).map(|entry| entry.name.clone()) else {
        return Ok(format!("game {id} is not in the wishlist"));
    };
    let mut stream = store.subscribe();
    store.remove(id)?;
    log_events(&mut stream);
    Ok(format!("removed {name} ({} saved)", store.len()))
}

/// Removal needs no network access; adding fetches the record to save.
pub(crate) async fn toggle_game(ctx: &AppContext, id: u64) -> CliResult<String> {
    let mut store = ctx.wishlist();
    let entry = match store.get(id) {
        Some(saved) => saved.clone(),
        None => fetch_entry(ctx, id).await?,
    };
    let name = entry.name.clone();
    let mut stream = store.subscribe();
    let outcome = store.toggle(entry)?;
    log_events(&mut stream);
    Ok(match outcome {
        ToggleOutcome::Added => format!("added {name} ({} saved)", store.len()),
        ToggleOutcome::Removed => format!("removed {name} ({} saved)", store.len()),
    })
}

async fn fetch_entry(ctx: &AppContext, id: u64) -> CliResult<WishlistEntry> {
    let detail = ctx.catalog()?.fetch_game(id).await?;
    Ok(WishlistEntry::from(&detail))
}
