//! # Native Player
//!
//! Playback adapter binding a [`MediaDataSource`] to an externally owned
//! [`MediaElement`].
//!
//! ## Lifecycle
//!
//! ```text
//! Unbound --attach--> Bound-Idle --load--> Bound-Loaded
//!    ^                  |    ^                  |
//!    +------detach------+    +------unload------+
//! ```
//!
//! `destroy` is reachable from every state and is terminal. A pending seek
//! is kept alongside the binding and consumed when the element reports its
//! metadata.
//!
//! ## Concurrency
//!
//! State lives behind a single mutex. The lock is never held while calling
//! into the element or invoking listeners, so element callbacks and
//! listeners may call back into the player.
//! Teardown waits for a statistics tick that is already emitting, so no
//! statistics event reaches a listener once a teardown call has returned,
//! even on a multi-threaded runtime.
//!
//! ## Usage
//!
//! ```ignore
//! let player = NativePlayer::new(MediaDataSource::new("mp4", url), None)?;
//! player.on(PlayerEventKind::StatisticsInfo, |event| {
//!     tracing::info!(?event, "stats");
//! });
//! player.attach_media_element(element)?;
//! player.load()?;
//! player.play().await?;
//! ```

use crate::error::{PlayerError, Result};
use crate::events::{PlayerEvent, PlayerEventKind};
use crate::reporter::StatisticsReporter;
use crate::snapshot::{self, MediaInfo, StatisticsInfo};
use crate::source::MediaDataSource;
use bridge_traits::media::{
    ElementListenerId, MediaElement, MediaElementEvent, ReadyState, TimeRanges,
};
use core_runtime::config::{PlayerConfig, PlayerConfigOverrides};
use core_runtime::events::{EventEmitter, ListenerId, Receiver};
use core_runtime::logging::redact_url;
use parking_lot::{Mutex, ReentrantMutex};
use serde_json::Value;
use std::fmt;
use std::ops::ControlFlow;
use std::sync::{Arc, Weak};
use tokio::runtime::Handle;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Player type reported in statistics snapshots.
pub const PLAYER_TYPE: &str = "NativePlayer";

/// Identifies one player instance in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlayerId(Uuid);

impl PlayerId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct Binding {
    element: Arc<dyn MediaElement>,
    metadata_listener: ElementListenerId,
}

#[derive(Default)]
struct PlayerState {
    binding: Option<Binding>,
    pending_seek: Option<f64>,
    reporter: Option<StatisticsReporter>,
    generation: u64,
    destroyed: bool,
}

struct PlayerInner {
    id: PlayerId,
    source: MediaDataSource,
    config: PlayerConfig,
    state: Mutex<PlayerState>,
    /// Held by a statistics tick from its generation check through emission.
    report_gate: ReentrantMutex<()>,
    emitter: EventEmitter<PlayerEvent>,
}

/// Player for sources the media element can play on its own (mp4, webm, ...).
///
/// Dropping the player destroys it.
pub struct NativePlayer {
    inner: Arc<PlayerInner>,
}

impl NativePlayer {
    /// Create a player for `source`, with `overrides` merged over the default
    /// configuration.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for flv sources, segmented sources and invalid
    /// configuration.
    pub fn new(source: MediaDataSource, overrides: Option<PlayerConfigOverrides>) -> Result<Self> {
        if source.media_type.eq_ignore_ascii_case("flv") {
            return Err(PlayerError::InvalidArgument(
                "NativePlayer doesn't support flv MediaDataSource input".to_string(),
            ));
        }
        if source.is_segmented() {
            return Err(PlayerError::InvalidArgument(format!(
                "NativePlayer({}) doesn't support multipart playback",
                source.media_type
            )));
        }

        let config = PlayerConfig::merged(overrides)?;
        let id = PlayerId::new();

        debug!(
            player_id = %id,
            media_type = %source.media_type,
            url = %redact_url(&source.url),
            interval_ms = config.statistics_info_report_interval,
            "Created native player"
        );

        Ok(Self {
            inner: Arc::new(PlayerInner {
                id,
                source,
                config,
                state: Mutex::new(PlayerState::default()),
                report_gate: ReentrantMutex::new(()),
                emitter: EventEmitter::default(),
            }),
        })
    }

    /// Create a player from an untyped source descriptor.
    pub fn from_value(value: Value, overrides: Option<PlayerConfigOverrides>) -> Result<Self> {
        Self::new(MediaDataSource::from_value(value)?, overrides)
    }

    pub fn id(&self) -> PlayerId {
        self.inner.id
    }

    pub fn player_type(&self) -> &'static str {
        PLAYER_TYPE
    }

    pub fn source(&self) -> &MediaDataSource {
        &self.inner.source
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.inner.config
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.state.lock().destroyed
    }

    pub fn is_attached(&self) -> bool {
        self.inner.state.lock().binding.is_some()
    }

    /// Whether a statistics reporter is currently armed.
    pub fn is_loaded(&self) -> bool {
        self.inner.state.lock().reporter.is_some()
    }

    /// Seek target waiting for the element to become ready.
    pub fn pending_seek(&self) -> Option<f64> {
        self.inner.state.lock().pending_seek
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Bind `element`, replacing any element bound before.
    ///
    /// A pending seek is applied right away when the element already has
    /// metadata and accepts it; otherwise it waits for `loadedmetadata`.
    #[instrument(skip(self, element), fields(player_id = %self.inner.id))]
    pub fn attach_media_element(&self, element: Arc<dyn MediaElement>) -> Result<()> {
        self.inner.ensure_alive()?;
        self.detach_media_element();

        let weak = Arc::downgrade(&self.inner);
        let metadata_listener = element.add_event_listener(
            MediaElementEvent::LoadedMetadata,
            Arc::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.on_loaded_metadata();
                }
            }),
        );

        let pending = {
            let mut state = self.inner.state.lock();
            if state.destroyed {
                drop(state);
                element.remove_event_listener(MediaElementEvent::LoadedMetadata, metadata_listener);
                return Err(PlayerError::Destroyed);
            }
            state.binding = Some(Binding {
                element: Arc::clone(&element),
                metadata_listener,
            });
            state.pending_seek
        };

        debug!(kind = ?element.kind(), "Media element attached");

        if let Some(seconds) = pending {
            self.inner.try_apply_pending(&element, seconds);
        }
        Ok(())
    }

    /// Release the bound element. No-op when nothing is bound.
    #[instrument(skip(self), fields(player_id = %self.inner.id))]
    pub fn detach_media_element(&self) {
        let (binding, reporter) = {
            let mut state = self.inner.state.lock();
            (state.binding.take(), state.reporter.take())
        };

        if let Some(reporter) = reporter {
            self.inner.retire_reporter(reporter);
        }

        if let Some(binding) = binding {
            binding.element.clear_src();
            binding
                .element
                .remove_event_listener(MediaElementEvent::LoadedMetadata, binding.metadata_listener);
            debug!("Media element detached");
        }
    }

    /// Point the element at the source URL, start loading and arm the
    /// statistics reporter.
    ///
    /// Loading again without `unload` replaces the running reporter.
    ///
    /// # Errors
    ///
    /// `IllegalState` when no element is attached or when called outside a
    /// Tokio runtime; `Destroyed` after `destroy`.
    #[instrument(skip(self), fields(player_id = %self.inner.id))]
    pub fn load(&self) -> Result<()> {
        let element = self.inner.bound_element()?;
        let handle = Handle::try_current().map_err(|_| {
            PlayerError::IllegalState("load requires a Tokio runtime context".to_string())
        })?;

        element.set_src(&self.inner.source.url);
        if element.ready_state().has_metadata() {
            if let Err(err) = element.set_current_time(0.0) {
                warn!(error = %err, "Failed to rewind reused media element");
            }
        }
        element.set_preload(self.inner.config.preload);
        element.load();

        let interval = self.inner.config.report_interval();
        let (previous, generation) = {
            let mut state = self.inner.state.lock();
            if state.destroyed {
                return Err(PlayerError::Destroyed);
            }
            let still_bound = state
                .binding
                .as_ref()
                .is_some_and(|binding| same_element(&binding.element, &element));
            if !still_bound {
                debug!("Binding changed during load, reporter not armed");
                return Ok(());
            }

            state.generation += 1;
            let generation = state.generation;
            let weak = Arc::downgrade(&self.inner);
            let reporter = StatisticsReporter::arm(&handle, interval, generation, move || {
                match weak.upgrade() {
                    Some(inner) => inner.report_statistics(generation),
                    None => ControlFlow::Break(()),
                }
            });
            (state.reporter.replace(reporter), generation)
        };

        if let Some(previous) = previous {
            self.inner.retire_reporter(previous);
        }

        info!(
            url = %redact_url(&self.inner.source.url),
            interval_ms = interval.as_millis() as u64,
            generation,
            "Media loaded"
        );
        Ok(())
    }

    /// Stop the reporter and empty the element's source. No-op when idle.
    #[instrument(skip(self), fields(player_id = %self.inner.id))]
    pub fn unload(&self) {
        let (reporter, element) = {
            let mut state = self.inner.state.lock();
            (
                state.reporter.take(),
                state.binding.as_ref().map(|binding| Arc::clone(&binding.element)),
            )
        };

        if let Some(reporter) = reporter {
            self.inner.retire_reporter(reporter);
        }
        if let Some(element) = element {
            element.clear_src();
        }
    }

    /// Unload, detach and drop every listener. Idempotent.
    #[instrument(skip(self), fields(player_id = %self.inner.id))]
    pub fn destroy(&self) {
        {
            let mut state = self.inner.state.lock();
            if state.destroyed {
                return;
            }
            state.destroyed = true;
            state.pending_seek = None;
        }

        self.unload();
        self.detach_media_element();
        self.inner.emitter.remove_all_listeners();
        info!("Player destroyed");
    }

    // ========================================================================
    // Playback control
    // ========================================================================

    /// Start playback. The element's rejection (e.g. autoplay policy) is
    /// returned as `PlayerError::MediaElement`.
    pub async fn play(&self) -> Result<()> {
        let element = self.inner.bound_element()?;
        element.play().await?;
        Ok(())
    }

    pub fn pause(&self) -> Result<()> {
        self.inner.bound_element()?.pause();
        Ok(())
    }

    // ========================================================================
    // Properties
    // ========================================================================

    /// Buffered ranges; empty when unbound.
    pub fn buffered(&self) -> TimeRanges {
        self.inner
            .element()
            .map(|element| element.buffered())
            .unwrap_or_default()
    }

    /// Element duration in seconds (NaN while unknown).
    pub fn duration(&self) -> Option<f64> {
        self.inner.element().map(|element| element.duration())
    }

    pub fn volume(&self) -> Option<f64> {
        self.inner.element().map(|element| element.volume())
    }

    pub fn set_volume(&self, volume: f64) -> Result<()> {
        self.inner.bound_element()?.set_volume(volume)?;
        Ok(())
    }

    pub fn muted(&self) -> Option<bool> {
        self.inner.element().map(|element| element.muted())
    }

    pub fn set_muted(&self, muted: bool) -> Result<()> {
        self.inner.bound_element()?.set_muted(muted);
        Ok(())
    }

    /// Playback position in seconds; `0.0` when unbound.
    pub fn current_time(&self) -> f64 {
        self.inner
            .element()
            .map(|element| element.current_time())
            .unwrap_or(0.0)
    }

    /// Seek to `seconds`.
    ///
    /// Stored as the pending seek when unbound, when the element has no
    /// metadata yet, or when it rejects the assignment. A newer request
    /// overwrites an unconsumed older one.
    pub fn set_current_time(&self, seconds: f64) {
        let element = {
            let mut state = self.inner.state.lock();
            if state.destroyed {
                return;
            }
            match &state.binding {
                Some(binding) => Arc::clone(&binding.element),
                None => {
                    state.pending_seek = Some(seconds);
                    return;
                }
            }
        };

        if element.ready_state().has_metadata() {
            match element.set_current_time(seconds) {
                Ok(()) => {
                    self.inner.state.lock().pending_seek = None;
                    return;
                }
                Err(err) => debug!(
                    player_id = %self.inner.id,
                    error = %err,
                    seconds,
                    "Seek rejected, deferring"
                ),
            }
        }

        let mut state = self.inner.state.lock();
        if !state.destroyed {
            state.pending_seek = Some(seconds);
        }
    }

    pub fn media_info(&self) -> MediaInfo {
        self.inner.media_info()
    }

    pub fn statistics_info(&self) -> StatisticsInfo {
        self.inner.statistics_info()
    }

    // ========================================================================
    // Subscriptions
    // ========================================================================

    /// Register `listener` for `kind`.
    ///
    /// For kinds that replay on subscribe, a listener added while the bound
    /// element already has metadata also receives the current snapshot
    /// once, from a spawned task rather than inline.
    pub fn on<F>(&self, kind: PlayerEventKind, listener: F) -> ListenerId
    where
        F: Fn(&PlayerEvent) + Send + Sync + 'static,
    {
        if self.is_destroyed() {
            return self.inner.emitter.reserve_id();
        }

        let id = self.inner.emitter.add_listener(kind, listener);
        if kind.replays_on_subscribe() {
            self.schedule_replay(kind, id);
        }
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn off(&self, kind: PlayerEventKind, id: ListenerId) -> bool {
        self.inner.emitter.remove_listener(kind, id)
    }

    /// Receive every future event on a broadcast channel.
    pub fn subscribe(&self) -> Receiver<PlayerEvent> {
        self.inner.emitter.subscribe()
    }

    fn schedule_replay(&self, kind: PlayerEventKind, id: ListenerId) {
        let Some(element) = self.inner.element() else {
            return;
        };
        if !element.ready_state().has_metadata() {
            return;
        }

        let Ok(handle) = Handle::try_current() else {
            debug!(player_id = %self.inner.id, %kind, "No runtime context, replay skipped");
            return;
        };

        let weak: Weak<PlayerInner> = Arc::downgrade(&self.inner);
        handle.spawn(async move {
            if let Some(inner) = weak.upgrade() {
                inner.replay(kind, id);
            }
        });
    }
}

impl Drop for NativePlayer {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl fmt::Debug for NativePlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("NativePlayer")
            .field("id", &self.inner.id)
            .field("source", &self.inner.source)
            .field("attached", &state.binding.is_some())
            .field("loaded", &state.reporter.is_some())
            .field("pending_seek", &state.pending_seek)
            .field("destroyed", &state.destroyed)
            .finish()
    }
}

impl PlayerInner {
    fn ensure_alive(&self) -> Result<()> {
        if self.state.lock().destroyed {
            return Err(PlayerError::Destroyed);
        }
        Ok(())
    }

    fn element(&self) -> Option<Arc<dyn MediaElement>> {
        self.state
            .lock()
            .binding
            .as_ref()
            .map(|binding| Arc::clone(&binding.element))
    }

    fn bound_element(&self) -> Result<Arc<dyn MediaElement>> {
        let state = self.state.lock();
        if state.destroyed {
            return Err(PlayerError::Destroyed);
        }
        state
            .binding
            .as_ref()
            .map(|binding| Arc::clone(&binding.element))
            .ok_or_else(|| PlayerError::IllegalState("HTMLMediaElement must be attached".to_string()))
    }

    fn media_info(&self) -> MediaInfo {
        let element = self.element();
        snapshot::media_info(&self.source, element.as_deref())
    }

    fn statistics_info(&self) -> StatisticsInfo {
        let element = self.element();
        snapshot::statistics_info(PLAYER_TYPE, &self.source, element.as_deref())
    }

    /// Apply a pending seek at attach time, keeping it pending unless the
    /// element is ready and accepts it.
    fn try_apply_pending(&self, element: &Arc<dyn MediaElement>, seconds: f64) {
        if element.ready_state() == ReadyState::HaveNothing {
            debug!(player_id = %self.id, seconds, "Element not ready, seek stays pending");
            return;
        }

        match element.set_current_time(seconds) {
            Ok(()) => {
                let mut state = self.state.lock();
                if state.pending_seek.map(f64::to_bits) == Some(seconds.to_bits()) {
                    state.pending_seek = None;
                }
            }
            Err(err) => {
                debug!(player_id = %self.id, error = %err, seconds, "Seek stays pending");
            }
        }
    }

    fn on_loaded_metadata(&self) {
        let (element, pending) = {
            let mut state = self.state.lock();
            if state.destroyed {
                return;
            }
            let Some(binding) = &state.binding else {
                return;
            };
            let element = Arc::clone(&binding.element);
            (element, state.pending_seek.take())
        };

        if let Some(seconds) = pending {
            if let Err(err) = element.set_current_time(seconds) {
                warn!(player_id = %self.id, error = %err, seconds, "Pending seek rejected");
            }
        }

        let info = self.media_info();
        debug!(player_id = %self.id, mime_type = %info.mime_type, "Media info ready");
        self.emitter.emit(PlayerEvent::MediaInfo(info));
    }

    /// Cancel `reporter` and wait out a tick already emitting, so no
    /// statistics event is delivered after the caller returns.
    fn retire_reporter(&self, reporter: StatisticsReporter) {
        debug!(
            player_id = %self.id,
            generation = reporter.generation(),
            "Statistics reporter cancelled"
        );
        reporter.cancel();
        drop(self.report_gate.lock());
    }

    fn report_statistics(&self, generation: u64) -> ControlFlow<()> {
        let _gate = self.report_gate.lock();
        {
            let state = self.state.lock();
            let current = state.reporter.as_ref().map(StatisticsReporter::generation);
            if state.destroyed || current != Some(generation) {
                return ControlFlow::Break(());
            }
        }

        self.emitter
            .emit(PlayerEvent::StatisticsInfo(self.statistics_info()));
        ControlFlow::Continue(())
    }

    fn replay(&self, kind: PlayerEventKind, id: ListenerId) {
        if self.state.lock().destroyed {
            return;
        }
        let Some(listener) = self.emitter.listener(kind, id) else {
            return;
        };

        let event = match kind {
            PlayerEventKind::MediaInfo => PlayerEvent::MediaInfo(self.media_info()),
            PlayerEventKind::StatisticsInfo => {
                PlayerEvent::StatisticsInfo(self.statistics_info())
            }
            _ => return,
        };
        listener(&event);
    }
}

fn same_element(a: &Arc<dyn MediaElement>, b: &Arc<dyn MediaElement>) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}
