//! Type-specific loaders.
//!
//! Every loader follows the same path: fetch the entry through
//! [`try_fetch_entry`], decode the body, apply it to the UI and, for theme,
//! widget and script mods, wait for the mod's ready event. Failures end as
//! `false` for that mod only.

use std::sync::Arc;

use common::LoaderConfig;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::bridge::{EventBus, ReadySignal};
use crate::error::ApplyError;
use crate::events::{LoadThemeEvent, LoadWidgetEvent};
use crate::host::{UiHost, guard_apply};
use crate::manifest::ModManifest;
use crate::resource::{FetchResponse, ResourceFetcher, entry_url};

/// Everything a loader needs from the outside world.
#[derive(Clone)]
pub struct LoaderContext {
    pub fetcher: Arc<dyn ResourceFetcher>,
    pub ui: Arc<dyn UiHost>,
    pub bus: EventBus,
    pub config: LoaderConfig,
    pub cancel: CancellationToken,
}

/// Fetch `manifest.entry` once and hand a successful response to
/// `on_success`, whose verdict is returned unchanged.
///
/// A non-success status or a transport failure is logged and reported as
/// `false`; no error escapes.
pub async fn try_fetch_entry<F, Fut>(ctx: &LoaderContext, manifest: &ModManifest, on_success: F) -> bool
where
    F: FnOnce(FetchResponse) -> Fut,
    Fut: Future<Output = bool>,
{
    let url = entry_url(&ctx.config.scheme, &manifest.entry);
    debug!(mod_name = %manifest.name, url = %url, "fetching");

    match ctx.fetcher.fetch(&url).await {
        Ok(response) if !response.is_ok() => {
            warn!(
                mod_type = %manifest.mod_type,
                mod_name = %manifest.name,
                status = response.status,
                status_text = %response.status_text,
                "Failed to load {} mod {} with status {} | {}",
                manifest.mod_type,
                manifest.name,
                response.status,
                response.status_text
            );
            false
        }
        Ok(response) => on_success(response).await,
        Err(e) => {
            warn!(
                mod_type = %manifest.mod_type,
                mod_name = %manifest.name,
                error = %e,
                "Failed to load {} mod {} with reason {}",
                manifest.mod_type,
                manifest.name,
                e
            );
            false
        }
    }
}

/// Append the stylesheet to the style-mod container. Completes as soon as it
/// is inserted; `readyEvent` is not consulted.
pub async fn load_style(ctx: &LoaderContext, manifest: &ModManifest) -> bool {
    if manifest.ready_event.is_some() {
        debug!(mod_name = %manifest.name, "Style mods do not wait for ready events");
    }

    try_fetch_entry(ctx, manifest, |response| async move {
        let Some(css) = decode(manifest, response) else {
            return false;
        };
        let style = format!("<style>{css}</style>");
        report_apply(
            manifest,
            guard_apply(|| ctx.ui.append_style(&ctx.config.style_container, &style)),
        )
    })
    .await
}

/// Broadcast the theme payload for the UI to pick up.
pub async fn load_theme(ctx: &LoaderContext, manifest: &ModManifest) -> bool {
    try_fetch_entry(ctx, manifest, |response| async move {
        let Some(theme) = decode(manifest, response) else {
            return false;
        };
        let ready = ctx.bus.ready_signal(manifest.ready_event.as_deref());
        let applied = guard_apply(|| {
            ctx.bus.trigger(&LoadThemeEvent {
                manifest: manifest.clone(),
                theme,
            });
            Ok(())
        });
        report_apply(manifest, applied) && await_ready(ctx, manifest, ready).await
    })
    .await
}

/// Broadcast widget markup for the HUD to wrap and mount.
pub async fn load_widget(ctx: &LoaderContext, manifest: &ModManifest) -> bool {
    try_fetch_entry(ctx, manifest, |response| async move {
        let Some(html) = decode(manifest, response) else {
            return false;
        };
        let ready = ctx.bus.ready_signal(manifest.ready_event.as_deref());
        let applied = guard_apply(|| {
            ctx.bus.trigger(&LoadWidgetEvent {
                manifest: manifest.clone(),
                html,
            });
            Ok(())
        });
        report_apply(manifest, applied) && await_ready(ctx, manifest, ready).await
    })
    .await
}

/// Execute the script in the UI's global scope. Used for both `script` and
/// `total-conversion` mods.
pub async fn load_script(ctx: &LoaderContext, manifest: &ModManifest) -> bool {
    try_fetch_entry(ctx, manifest, |response| async move {
        let Some(js) = decode(manifest, response) else {
            return false;
        };
        let ready = ctx.bus.ready_signal(manifest.ready_event.as_deref());
        let applied = guard_apply(|| ctx.ui.eval_script(manifest, &js));
        report_apply(manifest, applied) && await_ready(ctx, manifest, ready).await
    })
    .await
}

fn decode(manifest: &ModManifest, response: FetchResponse) -> Option<String> {
    match response.text() {
        Ok(text) => Some(text),
        Err(e) => {
            warn!(
                mod_type = %manifest.mod_type,
                mod_name = %manifest.name,
                error = %e,
                "Failed to read entry body"
            );
            None
        }
    }
}

fn report_apply(manifest: &ModManifest, applied: Result<(), ApplyError>) -> bool {
    match applied {
        Ok(()) => {
            debug!(mod_name = %manifest.name, "applied");
            true
        }
        Err(e) => {
            warn!(
                mod_type = %manifest.mod_type,
                mod_name = %manifest.name,
                error = %e,
                "Failed to apply mod"
            );
            false
        }
    }
}

async fn await_ready(ctx: &LoaderContext, manifest: &ModManifest, ready: ReadySignal) -> bool {
    let Some(event) = ready.event().map(str::to_owned) else {
        return true;
    };
    debug!(mod_name = %manifest.name, ready_event = %event, "awaiting ready");

    match ready.wait(ctx.config.ready_timeout(), &ctx.cancel).await {
        Ok(()) => {
            info!(mod_name = %manifest.name, ready_event = %event, "Mod reported ready");
            true
        }
        Err(e) => {
            warn!(
                mod_type = %manifest.mod_type,
                mod_name = %manifest.name,
                error = %e,
                "Mod never reported ready"
            );
            false
        }
    }
}
