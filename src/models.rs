use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Currency {
    pub code: String,
    pub name: String,
    pub symbol: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Language {
    pub code: String,
    pub name: String,
}

/// One country as the rest of the crate sees it. Built only through
/// [`CountryRecord::from_raw`], so every optional field here is either
/// well-formed or absent.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CountryRecord {
    pub code: String,
    pub common_name: String,
    pub coordinates: Option<Coordinates>,
    pub flag_image_url: Option<String>,
    pub population: Option<u64>,
    pub area_sq_km: Option<f64>,
    pub capital: Vec<String>,
    pub timezones: Vec<String>,
    pub region: Option<String>,
    pub currencies: Vec<Currency>, // document order
    pub languages: Vec<Language>,  // document order
}

// --- Wire format ---

#[derive(Deserialize, Debug, Clone, Default)]
pub struct RawName {
    pub common: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct RawFlags {
    pub png: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
struct RawCurrency {
    name: Option<String>,
    symbol: Option<String>,
}

/// A country exactly as the remote service sends it. Nothing is trusted yet.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct RawCountry {
    pub cca3: Option<String>,
    pub name: Option<RawName>,
    pub latlng: Option<Vec<Value>>,
    pub flags: Option<RawFlags>,
    pub population: Option<Value>,
    pub area: Option<Value>,
    pub capital: Option<Vec<Value>>,
    pub timezones: Option<Vec<Value>>,
    pub region: Option<String>,
    pub currencies: Option<Map<String, Value>>,
    pub languages: Option<Map<String, Value>>,
}

/// Why a raw entry could not become a [`CountryRecord`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordRejection {
    #[error("missing cca3 code")]
    MissingCode,
    #[error("missing common name for {0}")]
    MissingName(String),
}

impl CountryRecord {
    pub fn from_raw(raw: RawCountry) -> Result<Self, RecordRejection> {
        let code = non_empty(raw.cca3).ok_or(RecordRejection::MissingCode)?;
        let common_name = non_empty(raw.name.and_then(|n| n.common))
            .ok_or_else(|| RecordRejection::MissingName(code.clone()))?;

        Ok(Self {
            coordinates: raw.latlng.as_deref().and_then(parse_coordinates),
            flag_image_url: non_empty(raw.flags.and_then(|f| f.png)),
            population: raw.population.as_ref().and_then(parse_count),
            area_sq_km: raw.area.as_ref().and_then(parse_measure),
            capital: string_list(raw.capital),
            timezones: string_list(raw.timezones),
            region: non_empty(raw.region),
            currencies: raw
                .currencies
                .map(parse_currencies)
                .unwrap_or_default(),
            languages: raw.languages.map(parse_languages).unwrap_or_default(),
            code,
            common_name,
        })
    }

    #[cfg(test)]
    pub fn is_plottable(&self) -> bool {
        self.coordinates.is_some()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn parse_coordinates(latlng: &[Value]) -> Option<Coordinates> {
    let [lat, lng] = latlng else { return None };
    let latitude = lat.as_f64().filter(|v| v.is_finite() && v.abs() <= 90.0)?;
    let longitude = lng.as_f64().filter(|v| v.is_finite() && v.abs() <= 180.0)?;
    Some(Coordinates { latitude, longitude })
}

fn parse_count(value: &Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_f64().filter(|v| v.is_finite() && *v >= 0.0).map(|v| v.round() as u64))
}

fn parse_measure(value: &Value) -> Option<f64> {
    value.as_f64().filter(|v| v.is_finite() && *v >= 0.0)
}

fn string_list(values: Option<Vec<Value>>) -> Vec<String> {
    values
        .unwrap_or_default()
        .into_iter()
        .filter_map(|v| match v {
            Value::String(s) if !s.trim().is_empty() => Some(s),
            _ => None,
        })
        .collect()
}

fn parse_currencies(map: Map<String, Value>) -> Vec<Currency> {
    map.into_iter()
        .filter_map(|(code, value)| {
            let raw: RawCurrency = serde_json::from_value(value).ok()?;
            let name = non_empty(raw.name)?;
            Some(Currency { code, name, symbol: raw.symbol })
        })
        .collect()
}

fn parse_languages(map: Map<String, Value>) -> Vec<Language> {
    map.into_iter()
        .filter_map(|(code, value)| match value {
            Value::String(name) if !name.trim().is_empty() => Some(Language { code, name }),
            _ => None,
        })
        .collect()
}
