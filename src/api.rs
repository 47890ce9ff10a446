//! Client for the Pokedex REST API

use std::sync::OnceLock;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::query::QueryState;
use crate::sprite::{self, SpriteArt};
use crate::state::{DetailRecord, Evolution, SummaryRecord, TypeTag};
use crate::stats::reshape_stats;

pub const DEFAULT_API_BASE: &str = "https://nestjs-pokedex-api.vercel.app";
const ARTWORK_BASE: &str =
    "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/other/official-artwork";

static API_BASE: OnceLock<String> = OnceLock::new();

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },
    #[error("response parse error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("image decode error: {0}")]
    Image(String),
}

#[derive(Clone, Debug, Deserialize)]
struct TypeResponse {
    id: u32,
    name: String,
    #[serde(default)]
    image: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
struct SummaryResponse {
    id: u32,
    name: String,
    #[serde(default)]
    image: String,
    #[serde(default)]
    types: Vec<TypeResponse>,
}

#[derive(Clone, Debug, Deserialize)]
struct DetailResponse {
    id: u32,
    name: String,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    stats: Option<Value>,
    #[serde(default)]
    evolutions: Option<Value>,
    #[serde(default)]
    types: Option<Value>,
}

#[derive(Clone, Debug, Deserialize)]
struct EvolutionResponse {
    #[serde(default)]
    id: Option<u32>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    image: Option<String>,
    #[serde(default, rename = "pokedexId")]
    pokedex_id: Option<u32>,
}

impl From<TypeResponse> for TypeTag {
    fn from(response: TypeResponse) -> Self {
        TypeTag {
            id: response.id,
            name: response.name,
            image: response.image.filter(|url| !url.is_empty()),
        }
    }
}

/// Point the client at another API root. Only the first call wins.
pub fn configure(base: &str) {
    let _ = API_BASE.set(base.trim_end_matches('/').to_string());
}

pub fn api_base() -> &'static str {
    API_BASE
        .get()
        .map(String::as_str)
        .unwrap_or(DEFAULT_API_BASE)
}

pub fn types_url(base: &str) -> String {
    format!("{base}/types")
}

pub fn page_url(base: &str, query: &QueryState) -> String {
    let params = query
        .params()
        .into_iter()
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(&value)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{base}/pokemons?{params}")
}

pub fn detail_url(base: &str, id: u32) -> String {
    format!("{base}/pokemons/{id}")
}

pub fn artwork_url(pokedex_id: u32) -> String {
    format!("{ARTWORK_BASE}/{pokedex_id}.png")
}

pub async fn fetch_types() -> Result<Vec<TypeTag>, ApiError> {
    let bytes = fetch_bytes(&types_url(api_base())).await?;
    parse_types(&bytes)
}

pub async fn fetch_page(query: &QueryState) -> Result<Vec<SummaryRecord>, ApiError> {
    let bytes = fetch_bytes(&page_url(api_base(), query)).await?;
    parse_page(&bytes)
}

pub async fn fetch_detail(id: u32) -> Result<DetailRecord, ApiError> {
    let bytes = fetch_bytes(&detail_url(api_base(), id)).await?;
    parse_detail(&bytes)
}

pub async fn fetch_sprite(url: &str) -> Result<SpriteArt, ApiError> {
    let bytes = fetch_bytes(url).await?;
    sprite::decode_sprite(&bytes, sprite::SPRITE_MAX_COLS, sprite::SPRITE_MAX_ROWS)
        .map_err(ApiError::Image)
}

pub fn parse_types(bytes: &[u8]) -> Result<Vec<TypeTag>, ApiError> {
    let response: Vec<TypeResponse> = decode(bytes)?;
    Ok(response.into_iter().map(TypeTag::from).collect())
}

pub fn parse_page(bytes: &[u8]) -> Result<Vec<SummaryRecord>, ApiError> {
    let response: Vec<SummaryResponse> = decode(bytes)?;
    Ok(response
        .into_iter()
        .map(|entry| SummaryRecord {
            id: entry.id,
            name: entry.name,
            image: entry.image,
            types: entry.types.into_iter().map(TypeTag::from).collect(),
        })
        .collect())
}

/// Decode a detail payload. Sub-resources that are missing or not shaped as
/// expected come back as `None`; individual malformed entries are skipped.
pub fn parse_detail(bytes: &[u8]) -> Result<DetailRecord, ApiError> {
    let response: DetailResponse = decode(bytes)?;
    let stats = match response.stats {
        Some(Value::Object(raw)) => Some(reshape_stats(&raw)),
        _ => None,
    };
    let types = lenient_list::<TypeResponse>(response.types)
        .map(|types| types.into_iter().map(TypeTag::from).collect());
    let evolutions = lenient_list::<EvolutionResponse>(response.evolutions).map(|evolutions| {
        evolutions
            .into_iter()
            .filter_map(evolution_from_response)
            .collect()
    });

    Ok(DetailRecord {
        id: response.id,
        name: response.name,
        image: response.image.filter(|url| !url.is_empty()),
        stats,
        evolutions,
        types,
    })
}

fn evolution_from_response(response: EvolutionResponse) -> Option<Evolution> {
    let id = response.id.or(response.pokedex_id)?;
    let image = response
        .image
        .filter(|url| !url.is_empty())
        .or_else(|| response.pokedex_id.map(artwork_url));
    Some(Evolution {
        id,
        name: response.name,
        image,
    })
}

fn lenient_list<T: DeserializeOwned>(value: Option<Value>) -> Option<Vec<T>> {
    match value? {
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
        ),
        _ => None,
    }
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
    Ok(serde_json::from_slice(bytes)?)
}

async fn fetch_bytes(url: &str) -> Result<Vec<u8>, ApiError> {
    log::debug!("GET {url}");
    let response = http_client().get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    Ok(response.bytes().await?.to_vec())
}

fn http_client() -> &'static reqwest::Client {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(reqwest::Client::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn page_url_encodes_filters() {
        let mut query = QueryState::default();
        query.set_name("mr mime");
        query.set_type(Some(3));
        assert_eq!(
            page_url("http://api", &query),
            "http://api/pokemons?page=1&limit=50&name=mr%20mime&typeId=3"
        );
    }

    #[test]
    fn page_url_without_filters() {
        assert_eq!(
            page_url(DEFAULT_API_BASE, &QueryState::with_limit(10)),
            "https://nestjs-pokedex-api.vercel.app/pokemons?page=1&limit=10"
        );
    }

    #[test]
    fn parses_summary_page() {
        let body = br#"[
            {"id": 25, "name": "Pikachu", "image": "p.png",
             "types": [{"id": 13, "name": "Electrik", "image": "e.png"}],
             "pokedexId": 25, "generation": 1}
        ]"#;
        let records = parse_page(body).expect("page");
        assert_eq!(
            records,
            vec![SummaryRecord {
                id: 25,
                name: "Pikachu".into(),
                image: "p.png".into(),
                types: vec![TypeTag {
                    id: 13,
                    name: "Electrik".into(),
                    image: Some("e.png".into()),
                }],
            }]
        );
    }

    #[test]
    fn parses_detail_and_reshapes_stats() {
        let body = br#"{
            "id": 1, "name": "Bulbizarre", "image": "b.png",
            "stats": {"HP": 45, "attack": 49, "special_attack": 65, "speed": 45},
            "evolutions": [
                {"name": "Herbizarre", "pokedexId": 2},
                {"id": 3, "name": "Florizarre", "image": "f.png"},
                {"name": "nobody"}
            ],
            "types": [{"id": 5, "name": "Plante"}]
        }"#;
        let record = parse_detail(body).expect("detail");
        let stat_names: Vec<_> = record
            .stats
            .as_ref()
            .expect("stats")
            .iter()
            .map(|stat| stat.name.as_str())
            .collect();
        assert_eq!(stat_names, vec!["HP", "attack", "speed"]);
        assert_eq!(
            record.evolutions,
            Some(vec![
                Evolution {
                    id: 2,
                    name: "Herbizarre".into(),
                    image: Some(artwork_url(2)),
                },
                Evolution {
                    id: 3,
                    name: "Florizarre".into(),
                    image: Some("f.png".into()),
                },
            ])
        );
        assert_eq!(record.types.map(|types| types.len()), Some(1));
    }

    #[test]
    fn missing_sub_resources_are_none() {
        let body = br#"{"id": 7, "name": "Carapuce", "stats": null, "types": "oops"}"#;
        let record = parse_detail(body).expect("detail");
        assert_eq!(record.stats, None);
        assert_eq!(record.evolutions, None);
        assert_eq!(record.types, None);
        assert_eq!(record.image, None);
    }

    #[test]
    fn malformed_page_is_a_decode_error() {
        let err = parse_page(b"{\"message\": \"nope\"}").expect_err("should fail");
        assert!(matches!(err, ApiError::Decode(_)));
    }
}
