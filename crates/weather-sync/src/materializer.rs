//! Icon materializer.
//!
//! Turns an icon reference into a bitmap in a background task. The asset
//! download and PNG decode run under one bound; a link that is down fails
//! the request at once. Failures keep the current icon. Each request
//! carries the sequence number of its update, and the cache only accepts an
//! icon newer than the one installed, so a slow fetch for an older update
//! cannot overwrite a newer icon.

use std::sync::Arc;

use embassy_time::{with_timeout, Duration};
use image::ImageFormat;
use platform::{AssetRef, CompanionLink};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::cache::CacheState;
use crate::error::{IconFailure, SyncError};
use crate::snapshot::WeatherIcon;
use crate::stats::SyncStats;

/// What became of one icon request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconOutcome {
    /// The icon is now in the cache.
    Installed,
    /// Decoded, but a newer icon was already installed (or the cache was
    /// reset since).
    Superseded,
    /// Resolution failed; the previous icon was kept.
    Failed(IconFailure),
}

/// Spawns icon resolutions against one link.
pub struct IconMaterializer<L: CompanionLink> {
    link: Arc<L>,
    cache: Arc<CacheState>,
    stats: Arc<SyncStats>,
    timeout: Duration,
    runtime: Handle,
}

impl<L: CompanionLink> IconMaterializer<L> {
    /// Materializer writing into `cache`, bounding each resolution by
    /// `timeout`.
    pub fn new(
        link: Arc<L>,
        cache: Arc<CacheState>,
        stats: Arc<SyncStats>,
        timeout: Duration,
        runtime: Handle,
    ) -> Self {
        Self {
            link,
            cache,
            stats,
            timeout,
            runtime,
        }
    }

    /// Resolve `reference` for update `generation` in the background.
    ///
    /// Without a reference nothing is spawned and the cached icon stays.
    pub fn request(
        &self,
        reference: Option<AssetRef>,
        generation: u64,
    ) -> Option<JoinHandle<IconOutcome>> {
        let Some(asset) = reference else {
            tracing::debug!(generation, "update has no icon; keeping cached icon");
            return None;
        };
        let link = Arc::clone(&self.link);
        let cache = Arc::clone(&self.cache);
        let stats = Arc::clone(&self.stats);
        let bound = self.timeout;

        Some(self.runtime.spawn(async move {
            match resolve(link.as_ref(), &asset, bound)
                .await
                .map(|icon| cache.install_icon(Arc::new(icon), generation))
            {
                Ok(true) => {
                    stats.record_icon_resolved();
                    tracing::info!(generation, asset = asset.digest(), "weather icon updated");
                    IconOutcome::Installed
                }
                Ok(false) => {
                    stats.record_icon_superseded();
                    tracing::debug!(generation, "icon superseded by a newer update; discarded");
                    IconOutcome::Superseded
                }
                Err(failure) => {
                    stats.record_icon_failed();
                    tracing::warn!(
                        generation,
                        asset = asset.digest(),
                        error = %SyncError::IconResolutionFailed(failure.clone()),
                        "keeping previous icon"
                    );
                    IconOutcome::Failed(failure)
                }
            }
        }))
    }
}

/// Fetch and decode `asset`, giving up after `bound`.
pub async fn resolve<L: CompanionLink>(
    link: &L,
    asset: &AssetRef,
    bound: Duration,
) -> Result<WeatherIcon, IconFailure> {
    // Only the session opens the link.
    if !link.is_connected() {
        return Err(IconFailure::NotConnected("link is down".into()));
    }
    let fetch = async {
        let bytes = link
            .open_asset(asset)
            .await
            .map_err(|e| IconFailure::Transport(e.to_string()))?
            .filter(|bytes| !bytes.is_empty())
            .ok_or(IconFailure::EmptyStream)?;
        decode_png(&bytes)
    };
    with_timeout(bound, fetch)
        .await
        .map_err(|_| IconFailure::Timeout(bound.as_millis()))?
}

/// Decode a PNG into an RGBA bitmap.
pub fn decode_png(bytes: &[u8]) -> Result<WeatherIcon, IconFailure> {
    let rgba = image::load_from_memory_with_format(bytes, ImageFormat::Png)
        .map_err(|e| IconFailure::Undecodable(e.to_string()))?
        .into_rgba8();
    let (width, height) = rgba.dimensions();
    WeatherIcon::from_rgba(width, height, rgba.into_raw())
        .ok_or_else(|| IconFailure::Undecodable("pixel buffer size mismatch".into()))
}
