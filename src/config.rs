use std::io::ErrorKind;
use std::path::PathBuf;
use std::{env, fs, io};

use serde::Deserialize;

pub const CFG_FILE_NAME: &str = "roamlog.toml";

pub const ADMIN_PASSWORD_VAR: &str = "ROAMLOG_ADMIN_PASSWORD";
pub const READ_DB_URL_VAR: &str = "ROAMLOG_READ_DB_URL";
pub const WRITE_DB_URL_VAR: &str = "ROAMLOG_WRITE_DB_URL";

#[derive(Deserialize)]
pub struct Journal {
    pub title: String,
    pub tagline: String,
}

#[derive(Deserialize)]
pub struct Paths {
    pub template_dir: PathBuf,
    pub public_dir: PathBuf,
    pub posts_dir: Option<PathBuf>,
}

#[derive(Deserialize, Copy, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    Files,
    Database,
}

#[derive(Deserialize)]
pub struct Store {
    pub kind: StoreKind,
}

#[derive(Deserialize)]
pub struct Server {
    pub address: String,
    pub port: u16,
}

#[derive(Deserialize)]
pub struct Log {
    pub level: LogLevel,
    pub log_to_console: bool,
    pub location: Option<PathBuf>,
}

#[derive(Deserialize, Copy, Clone)]
pub enum LogLevel {
    Critical = 0,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Deserialize)]
pub struct RssFeed {
    pub title: String,
    pub site_url: String,
    pub description: String,
    pub max_items: u32,
}

#[derive(Deserialize)]
pub struct Config {
    pub journal: Journal,
    pub paths: Paths,
    pub store: Store,
    pub server: Server,
    pub log: Option<Log>,
    pub rss_feed: Option<RssFeed>,
}

/// Secrets come from the hosting environment, never from the config file.
pub struct Secrets {
    pub admin_password: String,
    pub read_db_url: Option<String>,
    pub write_db_url: Option<String>,
}

pub fn read_secrets() -> io::Result<Secrets> {
    let admin_password = match env::var(ADMIN_PASSWORD_VAR) {
        Ok(value) if !value.is_empty() => value,
        _ => return Err(io::Error::new(
            ErrorKind::NotFound, format!("{} is not set", ADMIN_PASSWORD_VAR))),
    };

    Ok(Secrets {
        admin_password,
        read_db_url: env::var(READ_DB_URL_VAR).ok(),
        write_db_url: env::var(WRITE_DB_URL_VAR).ok(),
    })
}

fn parse_path(path: PathBuf) -> PathBuf {
    if path.starts_with("${exe_dir}") {
        let cur_exe = env::current_exe().unwrap();
        let exe_dir = cur_exe.parent().unwrap().to_str().unwrap();
        let str_path = path.to_str().unwrap();
        PathBuf::from(str_path.replace("${exe_dir}", exe_dir))
    } else {
        path
    }
}

pub fn read_config(cfg_path: &PathBuf) -> io::Result<Config> {
    let cfg_content = match fs::read_to_string(cfg_path) {
        Ok(content) => content,
        Err(e) => return Err(io::Error::new(e.kind(), format!("Error opening configuration file {}: {}", cfg_path.to_str().unwrap(), e))),
    };

    let mut cfg: Config = match toml::from_str::<Config>(cfg_content.as_str()) {
        Ok(cfg) => cfg,
        Err(e) => return Err(io::Error::new(
            ErrorKind::InvalidData, format!("Error parsing configuration file: {}", e))),
    };

    cfg.paths = Paths {
        template_dir: parse_path(cfg.paths.template_dir),
        public_dir: parse_path(cfg.paths.public_dir),
        posts_dir: cfg.paths.posts_dir.map(parse_path),
    };

    if cfg.store.kind == StoreKind::Files && cfg.paths.posts_dir.is_none() {
        return Err(io::Error::new(
            ErrorKind::InvalidData, "store.kind = \"files\" requires paths.posts_dir"));
    }

    Ok(cfg)
}

fn find_config_path() -> Option<PathBuf> {
    let exe_path = env::current_exe().unwrap();
    let exe_dir = exe_path.parent().unwrap();
    let cur_dir = env::current_dir().unwrap();

    if exe_dir.join(CFG_FILE_NAME).exists() {
        return Some(exe_dir.join(CFG_FILE_NAME));
    }

    if cur_dir.join(CFG_FILE_NAME).exists() {
        return Some(cur_dir.join(CFG_FILE_NAME));
    }

    let cfg_dir = dirs::config_dir()?;
    if cfg_dir.join(CFG_FILE_NAME).exists() {
        return Some(cfg_dir.join(CFG_FILE_NAME));
    }

    None
}

pub fn open_config(cfg_path: Option<PathBuf>) -> Result<Config, String> {
    let config_path = cfg_path.unwrap_or(match find_config_path() {
        None => return Err("Could not find Roamlog configuration".to_string()),
        Some(x) => x,
    });

    let mut config = match read_config(&config_path) {
        Ok(config) => config,
        Err(e) => return Err(e.to_string()),
    };

    if let Some(mut log) = config.log {
        let location = log.location.unwrap_or_else(|| {
            dirs::cache_dir().unwrap().join("Roamlog").join("log").join("server.log")
        });
        log.location = Some(location);
        println!("Log enabled. Files will be written in {}", log.location.as_ref().unwrap().to_str().unwrap());
        config.log = Some(log);
    } else {
        println!("Log disabled. Using stdout");
    }

    Ok(config)
}
