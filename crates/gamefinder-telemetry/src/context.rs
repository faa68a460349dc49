//! Process and command scoped logging context.
//!
//! # Design
//! - The `app` span is entered once at startup and tags every record with the
//!   command and build identifier.
//! - The running command name is also kept in task-local storage for code that
//!   needs it outside the span.

use std::future::Future;
use std::sync::Arc;

use tracing::span::Entered;
use tracing::{Span, info_span};

use crate::init::build_sha;

tokio::task_local! {
    static ACTIVE_COMMAND: Arc<str>;
}

/// Keeps the `app` span entered until dropped.
pub struct GlobalContextGuard {
    _entered: Entered<'static>,
}

impl GlobalContextGuard {
    /// Enter the `app` span for `command`.
    ///
    /// The span is leaked so the guard can live as long as the process.
    #[must_use]
    pub fn new(command: &str) -> Self {
        let span: &'static Span = Box::leak(Box::new(info_span!(
            "app",
            command = %command,
            build_sha = %build_sha()
        )));
        Self {
            _entered: span.enter(),
        }
    }
}

/// Name of the command running in the current task, if one was scoped.
#[must_use]
pub fn current_command() -> Option<String> {
    ACTIVE_COMMAND.try_with(ToString::to_string).ok()
}

/// Run `fut` with `command` visible through [`current_command`].
pub async fn with_command_context<Fut, T>(command: &str, fut: Fut) -> T
where
    Fut: Future<Output = T>,
{
    ACTIVE_COMMAND.scope(Arc::from(command), fut).await
}
