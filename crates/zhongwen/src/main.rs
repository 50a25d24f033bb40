use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use zhongwen::{AppState, Dictionary, LoadMode, router};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_DICT_PATH: &str = "cedict_ts.u8";
const DEFAULT_DICT_IMAGE_PATH: &str = "/app/cedict_ts.u8";
const DEFAULT_MAX_PAGE_SIZE: usize = 500;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = load_config()?;
    info!("binding to {}:{}", config.host, config.port);
    info!(
        "using dictionary at {} (mode: {:?})",
        config.dict_path.display(),
        config.load_mode
    );
    info!("max page size {}", config.max_page_size);
    if config.disable_cache {
        info!("cache headers disabled");
    }

    let start = Instant::now();
    let dictionary = Arc::new(Dictionary::from_path(&config.dict_path, config.load_mode));
    dictionary.initialize()?;
    let lexicon = dictionary.lexicon()?;
    info!(
        "dictionary loaded in {} ms: {} entries, {} pinyin keys, {} english tokens",
        start.elapsed().as_millis(),
        lexicon.entry_count(),
        lexicon.pinyin_key_count(),
        lexicon.english_token_count()
    );

    let state = AppState {
        dictionary: Arc::clone(&dictionary),
        max_page_size: config.max_page_size,
        disable_cache: config.disable_cache,
    };

    let app = router(state).layer(TraceLayer::new_for_http());
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("invalid listen address")?;
    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;
    Ok(())
}

#[derive(Debug, Clone)]
struct Config {
    host: String,
    port: u16,
    dict_path: PathBuf,
    load_mode: LoadMode,
    max_page_size: usize,
    disable_cache: bool,
}

/// Command-line flags. Each one overrides its environment variable.
#[derive(Debug, Default, PartialEq)]
struct CliArgs {
    dict: Option<PathBuf>,
    load_mode: Option<LoadMode>,
    no_cache: bool,
}

impl CliArgs {
    /// Accepts `--no-cache`, `--dict PATH`, `--load-mode MODE`, and the
    /// `--flag=value` forms.
    fn parse(args: impl IntoIterator<Item = String>) -> anyhow::Result<Self> {
        let mut parsed = Self::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            let (flag, inline) = match arg.split_once('=') {
                Some((flag, value)) => (flag.to_string(), Some(value.to_string())),
                None => (arg, None),
            };
            match flag.as_str() {
                "--no-cache" => parsed.no_cache = true,
                "--dict" | "--load-mode" => {
                    let value = inline
                        .or_else(|| args.next())
                        .with_context(|| format!("{flag} needs a value"))?;
                    if flag == "--dict" {
                        parsed.dict = Some(PathBuf::from(value));
                    } else {
                        parsed.load_mode = Some(parse_load_mode(&value)?);
                    }
                }
                other => anyhow::bail!("unknown argument {other:?}"),
            }
        }
        Ok(parsed)
    }
}

fn load_config() -> anyhow::Result<Config> {
    let cli = CliArgs::parse(env::args().skip(1))?;

    let host = env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
    let port = env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT);
    let dict_path = cli
        .dict
        .or_else(|| env::var_os("CEDICT_PATH").map(PathBuf::from))
        .unwrap_or_else(default_dict_path);
    let load_mode = match cli.load_mode {
        Some(mode) => mode,
        None => match env::var("CEDICT_LOAD_MODE") {
            Ok(raw) => parse_load_mode(&raw).unwrap_or_else(|err| {
                warn!("ignoring CEDICT_LOAD_MODE: {err}");
                LoadMode::Mmap
            }),
            Err(_) => LoadMode::Mmap,
        },
    };
    let max_page_size = env::var("MAX_PAGE_SIZE")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_MAX_PAGE_SIZE);

    Ok(Config {
        host,
        port,
        dict_path,
        load_mode,
        max_page_size,
        disable_cache: cli.no_cache,
    })
}

/// The first dictionary found next to the binary or in the container image.
fn default_dict_path() -> PathBuf {
    [DEFAULT_DICT_PATH, DEFAULT_DICT_IMAGE_PATH]
        .into_iter()
        .map(PathBuf::from)
        .find(|candidate| candidate.exists())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DICT_PATH))
}

fn parse_load_mode(raw: &str) -> anyhow::Result<LoadMode> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "mmap" => Ok(LoadMode::Mmap),
        "owned" => Ok(LoadMode::Owned),
        _ => anyhow::bail!("unknown load mode {raw:?} (expected mmap or owned)"),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
