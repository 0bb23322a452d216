//! Choosing the scene from the page URL
//!
//! `?scene=<url>` fetches a JSON scene file; `?preset=<name>` picks a built-in
//! preset. Without either the classroom preset runs.

use firedrill_core::{SceneConfig, ScenePreset};

/// Where the scene description comes from
#[derive(Debug, Clone, PartialEq)]
pub enum SceneSource {
    Preset(ScenePreset),
    Url(String),
}

impl SceneSource {
    /// Read the source from a location search string such as `?preset=open_room`
    pub fn from_search(search: &str) -> Self {
        if let Some(url) = parse_query_param(search, "scene") {
            return SceneSource::Url(url);
        }
        match parse_query_param(search, "preset") {
            Some(name) => match name.parse::<ScenePreset>() {
                Ok(preset) => SceneSource::Preset(preset),
                Err(e) => {
                    tracing::warn!("{}, using {}", e, ScenePreset::default());
                    SceneSource::Preset(ScenePreset::default())
                }
            },
            None => SceneSource::Preset(ScenePreset::default()),
        }
    }

    #[cfg(target_arch = "wasm32")]
    pub fn from_browser() -> Self {
        let search = web_sys::window()
            .and_then(|w| w.location().search().ok())
            .unwrap_or_default();
        Self::from_search(&search)
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_browser() -> Self {
        SceneSource::Preset(ScenePreset::default())
    }
}

/// Value of `param` in a search string, percent-decoded
fn parse_query_param(search: &str, param: &str) -> Option<String> {
    search
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, value)| decode_component(key) == param && !value.is_empty())
        .map(|(_, value)| decode_component(value))
}

/// Decode `%XX` escapes and `+` the way `URLSearchParams` does
///
/// Malformed escapes are kept as written; invalid UTF-8 becomes U+FFFD.
fn decode_component(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' => {
                let hex = bytes
                    .get(i + 1..i + 3)
                    .filter(|h| h.iter().all(u8::is_ascii_hexdigit))
                    .and_then(|h| std::str::from_utf8(h).ok());
                match hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                    Some(byte) => {
                        out.push(byte);
                        i += 2;
                    }
                    None => out.push(b'%'),
                }
            }
            b => out.push(b),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Resolve the scene, then hand it to `run`
///
/// A scene URL that cannot be fetched or parsed falls back to the default
/// preset so the page always shows something.
pub fn load_and_run(run: fn(SceneConfig)) {
    match SceneSource::from_browser() {
        SceneSource::Preset(preset) => run(preset.config()),
        SceneSource::Url(url) => fetch_and_run(url, run),
    }
}

#[cfg(target_arch = "wasm32")]
fn fetch_and_run(url: String, run: fn(SceneConfig)) {
    use wasm_bindgen_futures::spawn_local;

    spawn_local(async move {
        tracing::info!("Fetching scene from: {}", url);
        let config = match fetch_scene(&url).await {
            Ok(config) => config,
            Err(e) => {
                tracing::error!("Failed to load scene {}: {}", url, e);
                SceneConfig::default()
            }
        };
        run(config);
    });
}

#[cfg(target_arch = "wasm32")]
async fn fetch_scene(url: &str) -> Result<SceneConfig, String> {
    let response = gloo_net::http::Request::get(url)
        .send()
        .await
        .map_err(|e| e.to_string())?;
    if !response.ok() {
        return Err(format!("HTTP {}", response.status()));
    }
    let text = response.text().await.map_err(|e| e.to_string())?;
    SceneConfig::from_json(&text).map_err(|e| e.to_string())
}

#[cfg(not(target_arch = "wasm32"))]
fn fetch_and_run(url: String, run: fn(SceneConfig)) {
    tracing::warn!("Scene URLs need a browser, ignoring {}", url);
    run(SceneConfig::default());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_param() {
        assert_eq!(
            SceneSource::from_search("?preset=open_room"),
            SceneSource::Preset(ScenePreset::OpenRoom)
        );
        assert_eq!(
            SceneSource::from_search("?foo=1&preset=training-room"),
            SceneSource::Preset(ScenePreset::TrainingRoom)
        );
    }

    #[test]
    fn test_unknown_preset_falls_back() {
        assert_eq!(
            SceneSource::from_search("?preset=warehouse"),
            SceneSource::Preset(ScenePreset::Classroom)
        );
        assert_eq!(SceneSource::from_search(""), SceneSource::Preset(ScenePreset::Classroom));
    }

    #[test]
    fn test_scene_url_wins() {
        assert_eq!(
            SceneSource::from_search("?preset=open_room&scene=https%3A%2F%2Fexample.org%2Fdrill.json"),
            SceneSource::Url("https://example.org/drill.json".to_string())
        );
    }

    #[test]
    fn test_scene_url_keeps_its_own_query() {
        assert_eq!(
            SceneSource::from_search("?scene=drill.json%3Fv%3D2%26lang%3Dde"),
            SceneSource::Url("drill.json?v=2&lang=de".to_string())
        );
    }

    #[test]
    fn test_decode_component() {
        assert_eq!(decode_component("a%20b+c"), "a b c");
        assert_eq!(decode_component("%E2%9C%93"), "\u{2713}");
        assert_eq!(decode_component("100%"), "100%");
        assert_eq!(decode_component("%zz%4"), "%zz%4");
        assert_eq!(decode_component("%+1"), "% 1");
        assert_eq!(decode_component("%2f%2F"), "//");
    }

    #[test]
    fn test_empty_value_is_skipped() {
        assert_eq!(parse_query_param("?scene=&preset=open_room", "scene"), None);
        assert_eq!(
            parse_query_param("?scene=&scene=a.json", "scene").as_deref(),
            Some("a.json")
        );
    }
}
