use std::sync::Arc;

use gamefinder_browse::query::{decode_location, parse_query_string};
use gamefinder_browse::{
    BrowseSession, CatalogSource, Completion, CriteriaPatch, DisplayState, FilterCriteria,
    FilterModel, Location,
};
use tracing::info;

use crate::cli::{BrowseArgs, OutputFormat};
use crate::client::{AppContext, CliError, CliResult, log_events};
use crate::output::render_session;

pub(crate) async fn handle_browse(ctx: &AppContext, args: BrowseArgs) -> CliResult<()> {
    println!("{}", browse_report(ctx, &args).await?);
    Ok(())
}

pub(crate) async fn handle_featured(ctx: &AppContext) -> CliResult<()> {
    println!("{}", featured_report(ctx).await?);
    Ok(())
}

pub(crate) async fn browse_report(ctx: &AppContext, args: &BrowseArgs) -> CliResult<String> {
    let location = location_from_args(args);
    let client = ctx.catalog()?;
    let client = match location.page_size {
        Some(size) => client.with_page_size(size),
        None => client,
    };
    let mut stream = ctx.events.subscribe(None);
    let mut session = BrowseSession::new("browse", Arc::new(client), location.criteria)
        .with_events(ctx.events.clone());

    load_pages(&mut session, location.page).await;
    log_events(&mut stream);
    finish_report(&session, location.page_size, ctx.output)
}

pub(crate) async fn featured_report(ctx: &AppContext) -> CliResult<String> {
    let source = Arc::new(
        ctx.catalog()?
            .with_page_size(ctx.config.browse.featured_limit),
    );
    let mut stream = ctx.events.subscribe(None);
    let mut session = BrowseSession::featured(source).with_events(ctx.events.clone());

    session.start().await;
    log_events(&mut stream);
    finish_report(&session, None, ctx.output)
}

fn finish_report<S>(
    session: &BrowseSession<S>,
    page_size: Option<u32>,
    format: OutputFormat,
) -> CliResult<String>
where
    S: CatalogSource + ?Sized + 'static,
{
    let engine = session.engine();
    if let DisplayState::LoadFailed(err) = engine.display_state() {
        return Err(CliError::from(err.clone()));
    }
    info!(
        session = session.label(),
        items = engine.items().len(),
        page = engine.current_page(),
        status = engine.status().as_str(),
        "browse finished"
    );
    render_session(engine, page_size, format)
}

/// Criteria, page to reach and page size described by the browse flags.
///
/// A `--query` string seeds all three; individual flags then override the
/// criteria field by field. The page reached is the larger of the seed's page
/// and `--pages`. A `page_size` in the seed replaces the configured size.
pub(crate) fn location_from_args(args: &BrowseArgs) -> Location {
    let seed = args.query.as_deref().map_or_else(
        || Location::new(FilterCriteria::default()),
        |raw| decode_location(&parse_query_string(raw)),
    );
    let mut model = FilterModel::with_criteria(seed.criteria);
    if let Some(search) = &args.search {
        model.update(CriteriaPatch::search(search.clone()));
    }
    if let Some(ordering) = &args.ordering {
        model.update(CriteriaPatch::ordering_param(ordering));
    }
    if let Some(platforms) = &args.platforms {
        model.update(CriteriaPatch::platform_list(platforms));
    }
    if let Some(genres) = &args.genres {
        model.update(CriteriaPatch::genre_list(genres));
    }
    if args.rating_min.is_some() || args.rating_max.is_some() {
        let current = model.current().rating;
        model.update(CriteriaPatch::rating(
            args.rating_min.unwrap_or(current.min),
            args.rating_max.unwrap_or(current.max),
        ));
    }
    Location {
        criteria: model.current().clone(),
        page: seed.page.max(args.pages),
        page_size: seed.page_size,
    }
}

/// Load page 1, then keep loading until `pages` pages are in or the list ends.
pub(crate) async fn load_pages<S>(session: &mut BrowseSession<S>, pages: u32)
where
    S: CatalogSource + ?Sized + 'static,
{
    if session.start().await != Completion::Applied {
        return;
    }
    while session.engine().current_page() < pages {
        if session.next_page().await != Some(Completion::Applied) {
            break;
        }
    }
}
