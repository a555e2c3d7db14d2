//! Page-wide constants. The native host reads its own settings from the
//! environment in `backend`.

pub const MOVIE_CATALOG_PATH: &str = "./movie.json";
pub const SERIES_CATALOG_PATH: &str = "./series.json";
pub const RANDOM_PICK_URL: &str = "https://yts.mx/api/v2/list_movies.json?limit=50";

pub const HISTORY_KEY: &str = "movieSearchHistory";
pub const HISTORY_MAX_ENTRIES: usize = 10;

pub const SUGGESTION_DEBOUNCE_MS: u32 = 300;
pub const GRID_SEARCH_DEBOUNCE_MS: u32 = 500;

pub const TITLE_MAX_CHARS: usize = 20;
pub const TITLE_KEEP_CHARS: usize = 17;

pub const PARTICLE_COUNT: usize = 100;

pub const LOADER_DURATION_MS: u32 = 4_000;
pub const LOADER_FADE_MS: u32 = 650;

pub const CONTROLS_HIDE_AFTER_MS: f64 = 3_000.0;
pub const BRIGHTNESS_STEP: f64 = 0.2;
pub const BRIGHTNESS_MAX: f64 = 2.0;

pub const POSTER_PLACEHOLDER: &str = "https://via.placeholder.com/240x360?text=No+Poster";
pub const HERO_PLACEHOLDER: &str = "https://via.placeholder.com/1280x720?text=No+Image";
