use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Local;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::{
    aggregate::aggregate,
    config::DEFAULT_BASE_URL,
    error::WeatherError,
    mapper::{OwSys, extract, map_current},
    model::{CityMatch, CurrentWeather, ForecastResult, LocationQuery},
    transport::Transport,
};

use super::WeatherProvider;

/// How many candidates the search endpoint is asked for before de-duplication.
const SEARCH_FETCH_COUNT: usize = 10;
const SEARCH_RESULT_LIMIT: usize = 5;

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider<T> {
    api_key: String,
    base_url: String,
    transport: T,
}

impl<T: Transport> OpenWeatherProvider<T> {
    pub fn new(transport: T, api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            transport,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn get(
        &self,
        endpoint: &str,
        mut params: Vec<(&str, String)>,
    ) -> Result<Value, WeatherError> {
        let url = format!("{}/{endpoint}", self.base_url);
        params.push(("appid", self.api_key.clone()));
        params.push(("units", "metric".to_string()));

        Ok(self.transport.fetch(&url, &params).await?)
    }
}

#[derive(Debug, Deserialize)]
struct OwCity {
    name: String,
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: OwCity,
    list: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwFoundCity {
    name: String,
    sys: OwSys,
    #[serde(default)]
    state: Option<String>,
    coord: OwCoord,
}

#[derive(Debug, Deserialize)]
struct OwFindResponse {
    list: Vec<OwFoundCity>,
}

#[async_trait]
impl<T: Transport> WeatherProvider for OpenWeatherProvider<T> {
    async fn current_weather(&self, query: &LocationQuery) -> Result<CurrentWeather, WeatherError> {
        info!(location = %query, "fetching current weather");

        let raw = self.get("weather", query.query_params()).await?;
        map_current(&raw, Local::now().naive_local())
    }

    async fn forecast(
        &self,
        query: &LocationQuery,
        days: usize,
    ) -> Result<ForecastResult, WeatherError> {
        info!(location = %query, days, "fetching forecast");

        let raw = self.get("forecast", query.query_params()).await?;
        let parsed: OwForecastResponse = extract(&raw, "forecast")?;
        debug!(items = parsed.list.len(), "aggregating forecast items");

        let location = format!("{}, {}", parsed.city.name, parsed.city.country);
        aggregate(&parsed.list, &location, days, &Local, Local::now().naive_local())
    }

    async fn search_cities(&self, query: &str) -> Result<Vec<CityMatch>, WeatherError> {
        info!(query, "searching cities");

        let params = vec![
            ("q", query.to_string()),
            ("type", "like".to_string()),
            ("sort", "population".to_string()),
            ("cnt", SEARCH_FETCH_COUNT.to_string()),
        ];
        let raw = self.get("find", params).await?;
        let parsed: OwFindResponse = extract(&raw, "city search")?;

        Ok(dedup_cities(parsed.list))
    }
}

/// Keep the first city per (name, country), at most [`SEARCH_RESULT_LIMIT`].
fn dedup_cities(found: Vec<OwFoundCity>) -> Vec<CityMatch> {
    let mut seen = HashSet::new();

    found
        .into_iter()
        .filter(|c| seen.insert((c.name.clone(), c.sys.country.clone())))
        .take(SEARCH_RESULT_LIMIT)
        .map(|c| CityMatch {
            name: c.name,
            country: c.sys.country,
            state: c.state,
            lat: c.coord.lat,
            lon: c.coord.lon,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use serde_json::json;
    use std::sync::Mutex;

    /// Replays one canned response and records every request it sees.
    #[derive(Debug)]
    struct FakeTransport {
        response: Mutex<Option<Result<Value, TransportError>>>,
        requests: Mutex<Vec<(String, Vec<(String, String)>)>>,
    }

    impl FakeTransport {
        fn replying(response: Result<Value, TransportError>) -> Self {
            Self {
                response: Mutex::new(Some(response)),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<(String, Vec<(String, String)>)> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn fetch(
            &self,
            url: &str,
            params: &[(&str, String)],
        ) -> Result<Value, TransportError> {
            self.requests.lock().unwrap().push((
                url.to_string(),
                params.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
            ));
            self.response
                .lock()
                .unwrap()
                .take()
                .expect("fake transport called more than once")
        }
    }

    fn provider(response: Result<Value, TransportError>) -> OpenWeatherProvider<FakeTransport> {
        OpenWeatherProvider::new(FakeTransport::replying(response), "SECRET".into())
            .with_base_url("http://weather.test/data/2.5/")
    }

    fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
        params.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    #[tokio::test]
    async fn current_weather_sends_location_key_and_units() {
        let p = provider(Ok(json!({
            "name": "London",
            "sys": { "country": "GB" },
            "main": { "temp": 9.04, "feels_like": 7.95, "humidity": 87 },
            "weather": [{ "id": 803, "description": "broken clouds" }],
            "wind": { "speed": 5.1 }
        })));

        let cw = p
            .current_weather(&LocationQuery::city("London", Some("GB".into())))
            .await
            .unwrap();
        assert_eq!(cw.location, "London, GB");
        assert_eq!(cw.condition, "Broken Clouds");

        let requests = p.transport.requests();
        assert_eq!(requests.len(), 1);
        let (url, params) = &requests[0];
        assert_eq!(url, "http://weather.test/data/2.5/weather");
        assert_eq!(param(params, "q"), Some("London,GB"));
        assert_eq!(param(params, "appid"), Some("SECRET"));
        assert_eq!(param(params, "units"), Some("metric"));
    }

    #[tokio::test]
    async fn forecast_uses_city_envelope_and_truncates() {
        let items: Vec<Value> = (0..16)
            .map(|i| {
                json!({
                    "dt": 1_709_942_400 + i * 3 * 3600,
                    "main": { "temp": i as f64, "humidity": 50 },
                    "weather": [{ "description": "clear sky" }],
                    "wind": { "speed": 1.0 }
                })
            })
            .collect();
        let p = provider(Ok(json!({
            "cod": "200",
            "city": { "name": "Oslo", "country": "NO" },
            "list": items
        })));

        let result = p
            .forecast(&LocationQuery::coordinates(59.91, 10.75).unwrap(), 1)
            .await
            .unwrap();
        assert_eq!(result.location, "Oslo, NO");
        assert_eq!(result.days.len(), 1);

        let (url, params) = &p.transport.requests()[0];
        assert!(url.ends_with("/forecast"));
        assert_eq!(param(params, "lat"), Some("59.91"));
        assert_eq!(param(params, "lon"), Some("10.75"));
        assert_eq!(param(params, "q"), None);
    }

    #[tokio::test]
    async fn forecast_without_city_is_malformed() {
        let p = provider(Ok(json!({ "list": [] })));
        let err = p
            .forecast(&LocationQuery::city("Nowhere", None), 5)
            .await
            .unwrap_err();
        assert!(matches!(err, WeatherError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn transport_failures_pass_through() {
        let p = provider(Err(TransportError::Status {
            url: "http://weather.test/data/2.5/weather".into(),
            status: 404,
            body: "{\"cod\":\"404\",\"message\":\"city not found\"}".into(),
        }));
        let err = p
            .current_weather(&LocationQuery::city("Atlantis", None))
            .await
            .unwrap_err();
        assert!(matches!(err, WeatherError::Transport(TransportError::Status { status: 404, .. })));
    }

    #[tokio::test]
    async fn search_dedups_and_limits() {
        let city = |name: &str, country: &str, lat: f64| {
            json!({ "name": name, "sys": { "country": country }, "coord": { "lat": lat, "lon": 0.0 } })
        };
        let p = provider(Ok(json!({
            "list": [
                city("Springfield", "US", 1.0),
                city("Springfield", "US", 2.0),
                city("Springfield", "AU", 3.0),
                city("Springfield", "CA", 4.0),
                city("Springfield", "NZ", 5.0),
                city("Springfield", "ZA", 6.0),
                city("Springfield", "GB", 7.0),
            ]
        })));

        let found = p.search_cities("Springfield").await.unwrap();
        let countries: Vec<_> = found.iter().map(|c| c.country.as_str()).collect();
        assert_eq!(countries, ["US", "AU", "CA", "NZ", "ZA"]);
        assert_eq!(found[0].lat, 1.0);

        let (url, params) = &p.transport.requests()[0];
        assert!(url.ends_with("/find"));
        assert_eq!(param(params, "type"), Some("like"));
        assert_eq!(param(params, "sort"), Some("population"));
        assert_eq!(param(params, "cnt"), Some("10"));
    }
}
