use axum::Router;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tower_http::services::{ServeDir, ServeFile};

use crate::catalog::{collect_genres, CatalogAccessor, CatalogError, CatalogSource, EntryKind};
use crate::logging::{log_event, set_min_level, LogLevel};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DIST_DIR: &str = "dist";
const DEFAULT_LOG_LEVEL: LogLevel = LogLevel::Info;

const PORT_BOUNDS: (u64, u64) = (1, 65_535);

#[derive(Clone, Debug, PartialEq)]
pub struct HostConfig {
    pub port: u16,
    pub dist_dir: PathBuf,
    pub log_level: LogLevel,
}

impl HostConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = parse_u64_with_bounds(&lookup, "PORT", u64::from(DEFAULT_PORT), PORT_BOUNDS);
        let dist_dir = parse_non_empty_string(&lookup, "DIST_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DIST_DIR));
        let log_level = parse_non_empty_string(&lookup, "LOG_LEVEL")
            .and_then(|value| LogLevel::parse(&value))
            .unwrap_or(DEFAULT_LOG_LEVEL);

        Self {
            port: u16::try_from(port).unwrap_or(DEFAULT_PORT),
            dist_dir,
            log_level,
        }
    }
}

fn parse_u64_with_bounds(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: u64,
    bounds: (u64, u64),
) -> u64 {
    lookup(name)
        .and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| (bounds.0..=bounds.1).contains(value))
        .unwrap_or(default)
}

fn parse_non_empty_string(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Reads catalog documents from the bundle directory, resolving the page's
/// relative paths (`./movie.json`) against it.
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, location: &str) -> PathBuf {
        let relative = location.trim_start_matches("./").trim_start_matches('/');
        self.root.join(relative)
    }
}

impl CatalogSource for FsSource {
    async fn fetch_json(&self, location: &str) -> Result<Value, CatalogError> {
        let path = self.resolve(location);
        let raw = tokio::fs::read_to_string(&path)
            .await
            .map_err(|error| CatalogError::Fetch {
                location: path.display().to_string(),
                reason: error.to_string(),
            })?;

        serde_json::from_str(&raw).map_err(|error| CatalogError::Parse {
            location: path.display().to_string(),
            reason: error.to_string(),
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CatalogAudit {
    pub movies: usize,
    pub series: usize,
    pub genres: usize,
}

pub async fn audit_catalog(dist_dir: &Path) -> CatalogAudit {
    let entries = CatalogAccessor::new(FsSource::new(dist_dir)).load_all().await;
    let movies = entries
        .iter()
        .filter(|entry| entry.kind() == EntryKind::Movie)
        .count();
    let audit = CatalogAudit {
        movies,
        series: entries.len() - movies,
        genres: collect_genres(&entries).len(),
    };

    let level = if entries.is_empty() {
        LogLevel::Warn
    } else {
        LogLevel::Info
    };
    log_event(
        level,
        "catalog_audit",
        json!({
            "dist_dir": dist_dir.display().to_string(),
            "movies": audit.movies,
            "series": audit.series,
            "genres": audit.genres,
        }),
    );
    audit
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = HostConfig::from_env();
    set_min_level(config.log_level);

    audit_catalog(&config.dist_dir).await;

    let index = config.dist_dir.join("index.html");
    let static_service = ServeDir::new(&config.dist_dir).not_found_service(ServeFile::new(index));
    let app = Router::new().fallback_service(static_service);

    let bind_address = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    log_event(
        LogLevel::Info,
        "host_listening",
        json!({
            "url": format!("http://127.0.0.1:{}", config.port),
            "dist_dir": config.dist_dir.display().to_string(),
        }),
    );
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static SCRATCH_COUNTER: AtomicUsize = AtomicUsize::new(0);

    fn config_from(pairs: &[(&str, &str)]) -> HostConfig {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        HostConfig::from_lookup(|name| values.get(name).cloned())
    }

    fn scratch_dir() -> PathBuf {
        let index = SCRATCH_COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir = std::env::temp_dir().join(format!("marquee-host-{}-{index}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("scratch dir");
        dir
    }

    #[test]
    fn config_defaults_when_unset_or_invalid() {
        let config = config_from(&[("PORT", "0"), ("LOG_LEVEL", "verbose"), ("DIST_DIR", "  ")]);

        assert_eq!(
            config,
            HostConfig {
                port: DEFAULT_PORT,
                dist_dir: PathBuf::from(DEFAULT_DIST_DIR),
                log_level: DEFAULT_LOG_LEVEL,
            }
        );
    }

    #[test]
    fn config_reads_values_within_bounds() {
        let config = config_from(&[("PORT", " 3000 "), ("LOG_LEVEL", "debug"), ("DIST_DIR", "public")]);

        assert_eq!(config.port, 3000);
        assert_eq!(config.dist_dir, PathBuf::from("public"));
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config_from(&[("PORT", "70000")]).port, DEFAULT_PORT);
    }

    #[test]
    fn relative_locations_resolve_under_root() {
        let source = FsSource::new("/srv/dist");
        assert_eq!(source.resolve("./movie.json"), PathBuf::from("/srv/dist/movie.json"));
        assert_eq!(source.resolve("/series.json"), PathBuf::from("/srv/dist/series.json"));
    }

    #[tokio::test]
    async fn audit_counts_playable_entries() {
        let dir = scratch_dir();
        std::fs::write(
            dir.join("movie.json"),
            r#"[{"id":1,"title":"Nova","genre":"Action, Drama","video":"https://youtu.be/abc"},
                {"id":2,"title":"Broken","video":"not a video"}]"#,
        )
        .expect("write movies");
        std::fs::write(
            dir.join("series.json"),
            r#"{"series_list":[{"id":3,"title":"Tides","genre":["Drama"],"video":"https://vimeo.com/1"}]}"#,
        )
        .expect("write series");

        let audit = audit_catalog(&dir).await;
        assert_eq!(
            audit,
            CatalogAudit {
                movies: 1,
                series: 1,
                genres: 2,
            }
        );

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn audit_of_missing_bundle_is_empty() {
        let dir = scratch_dir().join("absent");
        assert_eq!(audit_catalog(&dir).await, CatalogAudit::default());
    }

    #[tokio::test]
    async fn unreadable_json_is_a_parse_error() {
        let dir = scratch_dir();
        std::fs::write(dir.join("movie.json"), "{oops").expect("write movies");

        let error = FsSource::new(&dir)
            .fetch_json("./movie.json")
            .await
            .expect_err("invalid JSON");
        assert_eq!(error.class(), "parse");

        let _ = std::fs::remove_dir_all(&dir);
    }
}
