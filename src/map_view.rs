//! Binds the country collection to markers and the selection to the overlay.
//!
//! The map widget itself is external; [`MapWidget`] is the seam. The view
//! owns the repository and the selection, so both can be exercised without a
//! widget that draws anything.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::MapConfig;
use crate::formatter;
use crate::models::{Coordinates, CountryRecord};
use crate::repository::{CountryRepository, CountrySource};
use crate::selection::Selection;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TileSource {
    pub url_template: String,
    pub attribution: String,
    pub subdomains: String,
}

impl From<&MapConfig> for TileSource {
    fn from(config: &MapConfig) -> Self {
        Self {
            url_template: config.tile_url.clone(),
            attribution: config.attribution.clone(),
            subdomains: config.subdomains.clone(),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Marker {
    pub code: String,
    pub name: String,
    pub position: Coordinates,
}

/// Everything the popup shows, already formatted.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Overlay {
    pub code: String,
    pub position: Coordinates,
    pub name: String,
    pub flag_url: Option<String>,
    pub population: String,
    pub area: String,
    pub capital: String,
    pub timezone: String,
    pub region: String,
    pub currencies: String,
    pub languages: String,
}

impl Overlay {
    /// `None` for records that have no position to anchor to.
    pub fn for_record(record: &CountryRecord) -> Option<Self> {
        let position = record.coordinates?;
        Some(Self {
            code: record.code.clone(),
            position,
            name: record.common_name.clone(),
            flag_url: formatter::flag_url(record).map(str::to_string),
            population: formatter::population(record),
            area: formatter::area(record),
            capital: formatter::primary_capital(record).to_string(),
            timezone: formatter::primary_timezone(record).to_string(),
            region: formatter::region(record).to_string(),
            currencies: formatter::or_not_available(formatter::currency_list(record)),
            languages: formatter::or_not_available(formatter::language_list(record)),
        })
    }
}

pub trait MapWidget {
    type Output;

    fn render(
        &self,
        tiles: &TileSource,
        markers: &[Marker],
        overlay: Option<&Overlay>,
    ) -> anyhow::Result<Self::Output>;
}

pub struct MapView<W> {
    repository: Arc<CountryRepository>,
    selection: Mutex<Selection>,
    tiles: TileSource,
    widget: W,
    mounted: AtomicBool,
}

impl<W: MapWidget> MapView<W> {
    pub fn new(tiles: TileSource, widget: W) -> Self {
        Self {
            repository: Arc::new(CountryRepository::new()),
            selection: Mutex::new(Selection::default()),
            tiles,
            widget,
            mounted: AtomicBool::new(false),
        }
    }

    /// Starts the one country load in the background. The task holds the
    /// repository weakly, so a view dropped mid-load just discards the result.
    ///
    /// The task runs detached; awaiting the returned handle is optional and
    /// only needed to observe completion. Returns `None` if the view was
    /// already mounted.
    pub fn mount<S>(&self, source: S) -> Option<JoinHandle<()>>
    where
        S: CountrySource + Send + Sync + 'static,
    {
        if self.mounted.swap(true, Ordering::SeqCst) {
            debug!("map view already mounted, not loading again");
            return None;
        }
        let repository = Arc::downgrade(&self.repository);
        Some(tokio::spawn(async move {
            CountryRepository::load(repository, &source).await;
        }))
    }

    pub fn markers(&self) -> Vec<Marker> {
        self.repository.with_records(|records| {
            records
                .iter()
                .filter_map(|r| {
                    Some(Marker {
                        code: r.code.clone(),
                        name: r.common_name.clone(),
                        position: r.coordinates?,
                    })
                })
                .collect()
        })
    }

    /// Marker click. Codes without a plotted marker are ignored and leave the
    /// selection as it was.
    pub fn select_marker(&self, code: &str) -> Option<Overlay> {
        let overlay = self
            .repository
            .find_by_code(code)
            .as_ref()
            .and_then(Overlay::for_record);
        match overlay {
            Some(overlay) => {
                self.lock_selection().select_marker(code);
                Some(overlay)
            }
            None => {
                debug!("ignoring selection of unplotted country {}", code);
                None
            }
        }
    }

    pub fn dismiss(&self) {
        self.lock_selection().dismiss();
    }

    #[cfg(test)]
    pub fn selection(&self) -> Selection {
        self.lock_selection().clone()
    }

    /// The overlay for the current selection, looked up fresh. A selection
    /// whose record has gone missing falls back to `Empty`.
    pub fn overlay(&self) -> Option<Overlay> {
        let mut selection = self.lock_selection();
        let code = selection.active_code()?;
        let overlay = self
            .repository
            .find_by_code(code)
            .as_ref()
            .and_then(Overlay::for_record);
        if overlay.is_none() {
            debug!("selected country {} is no longer available, clearing", code);
            selection.dismiss();
        }
        overlay
    }

    pub fn render(&self) -> anyhow::Result<W::Output> {
        let markers = self.markers();
        let overlay = self.overlay();
        self.widget.render(&self.tiles, &markers, overlay.as_ref())
    }

    pub fn repository(&self) -> &CountryRepository {
        &self.repository
    }

    pub fn widget(&self) -> &W {
        &self.widget
    }

    fn lock_selection(&self) -> std::sync::MutexGuard<'_, Selection> {
        self.selection.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
