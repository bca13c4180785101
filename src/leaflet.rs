use serde::Serialize;

use crate::config::MapConfig;
use crate::map_view::{MapWidget, Marker, Overlay, TileSource};
use crate::models::Coordinates;
use crate::template_engine::TemplateEngine;

/// What the page script needs to open a popup.
#[derive(Serialize, Debug, Clone)]
pub struct OverlayPayload {
    pub code: String,
    pub position: Coordinates,
    pub html: String,
}

/// Renders the whole map as one HTML page driven by Leaflet in the browser.
pub struct LeafletPage {
    templates: TemplateEngine,
    center: (f64, f64),
    zoom: u8,
}

impl LeafletPage {
    pub fn new(templates: TemplateEngine, config: &MapConfig) -> Self {
        Self {
            templates,
            center: config.center,
            zoom: config.zoom,
        }
    }

    pub fn overlay_payload(&self, overlay: &Overlay) -> anyhow::Result<OverlayPayload> {
        let mut context = tera::Context::new();
        context.insert("overlay", overlay);
        Ok(OverlayPayload {
            code: overlay.code.clone(),
            position: overlay.position,
            html: self.templates.render("popup.html", &context)?,
        })
    }
}

impl MapWidget for LeafletPage {
    type Output = String;

    fn render(&self, tiles: &TileSource, markers: &[Marker], overlay: Option<&Overlay>) -> anyhow::Result<String> {
        let overlay = overlay.map(|o| self.overlay_payload(o)).transpose()?;

        let mut context = tera::Context::new();
        context.insert("tiles_json", &script_json(tiles)?);
        context.insert("center_json", &script_json(&[self.center.0, self.center.1])?);
        context.insert("zoom", &self.zoom);
        context.insert("markers_json", &script_json(markers)?);
        context.insert("overlay_json", &script_json(&overlay)?);
        self.templates.render("index.html", &context)
    }
}

/// JSON that is safe to drop into an inline `<script>`.
fn script_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string(value)?
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CountryRecord;
    use serde_json::json;

    fn page() -> LeafletPage {
        LeafletPage::new(TemplateEngine::new().unwrap(), &MapConfig::default())
    }

    fn france() -> Overlay {
        let raw = serde_json::from_value(json!({
            "cca3": "FRA",
            "name": { "common": "France" },
            "latlng": [46.0, 2.0],
            "flags": { "png": "https://flagcdn.com/w320/fr.png" },
            "population": 67000000,
            "capital": ["Paris"],
            "currencies": { "EUR": { "name": "Euro", "symbol": "€" } },
            "languages": { "fra": "French" }
        }))
        .unwrap();
        Overlay::for_record(&CountryRecord::from_raw(raw).unwrap()).unwrap()
    }

    #[test]
    fn popup_lists_every_field() {
        let payload = page().overlay_payload(&france()).unwrap();
        assert_eq!(payload.code, "FRA");
        assert!(payload.html.contains("<h2>France</h2>"));
        assert!(payload.html.contains("src=\"https://flagcdn.com/w320/fr.png\""));
        assert!(payload.html.contains("alt=\"France Flag\""));
        assert!(payload.html.contains("Population: 67,000,000"));
        assert!(payload.html.contains("Area: N/A sq. km"));
        assert!(payload.html.contains("Capital: Paris"));
        assert!(payload.html.contains("Timezone: N/A"));
        assert!(payload.html.contains("Region: N/A"));
        assert!(payload.html.contains("Currency: Euro"));
        assert!(payload.html.contains("Language: French"));
    }

    #[test]
    fn popup_without_flag_has_no_image() {
        let mut overlay = france();
        overlay.flag_url = None;
        let payload = page().overlay_payload(&overlay).unwrap();
        assert!(!payload.html.contains("<img"));
        assert!(payload.html.contains("France Flag"));
    }

    #[test]
    fn popup_escapes_remote_text() {
        let mut overlay = france();
        overlay.name = "<script>x</script>".to_string();
        let payload = page().overlay_payload(&overlay).unwrap();
        assert!(!payload.html.contains("<script>"));
    }

    #[test]
    fn page_carries_tiles_markers_and_overlay() {
        let tiles = TileSource::from(&MapConfig::default());
        let markers = vec![Marker {
            code: "FRA".into(),
            name: "France".into(),
            position: Coordinates { latitude: 46.0, longitude: 2.0 },
        }];
        let overlay = france();

        let html = page().render(&tiles, &markers, Some(&overlay)).unwrap();
        assert!(html.contains("tile.openstreetmap.org"));
        assert!(html.contains("OpenStreetMap"));
        assert!(html.contains(r#""code":"FRA""#));
        assert!(html.contains(".setView([0.0,0.0], 2)"));
        assert!(!html.contains("const active = null"));
    }

    #[test]
    fn page_without_selection() {
        let tiles = TileSource::from(&MapConfig::default());
        let html = page().render(&tiles, &[], None).unwrap();
        assert!(html.contains("const initialMarkers = [];"));
        assert!(html.contains("const active = null;"));
    }

    #[test]
    fn script_json_cannot_close_the_script_tag() {
        let json = script_json("</script>").unwrap();
        assert!(!json.contains("</"));
    }
}
