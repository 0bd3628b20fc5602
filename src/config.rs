use std::io::ErrorKind;
use std::path::PathBuf;
use std::{env, fs, io};

use serde::Deserialize;

#[derive(Deserialize)]
pub struct Site {
    pub name: String,
    pub url: String,
}

#[derive(Deserialize)]
pub struct Paths {
    /// Holds `meta/`, `indexes/`, `processed/` and `raw/`
    pub content_dir: PathBuf,
    pub template_dir: PathBuf,
    pub public_dir: PathBuf,
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

#[derive(Deserialize, Copy, Clone, Debug, PartialEq)]
pub enum LogLevel {
    Critical = 0,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Deserialize)]
pub struct Config {
    pub site: Site,
    pub paths: Paths,
    pub server: Server,
    pub log: Option<Log>,
}

fn parse_path(path: PathBuf) -> PathBuf {
    let Some(str_path) = path.to_str() else {
        return path;
    };
    if !str_path.starts_with("${exe_dir}") {
        return path;
    }

    let exe_dir = env::current_exe().ok()
        .and_then(|exe| exe.parent().map(|p| p.to_path_buf()));
    match exe_dir {
        Some(exe_dir) => PathBuf::from(str_path.replace("${exe_dir}", &exe_dir.to_string_lossy())),
        None => path,
    }
}

pub fn parse_config(cfg_content: &str) -> io::Result<Config> {
    let mut cfg: Config = match toml::from_str::<Config>(cfg_content) {
        Ok(cfg) => cfg,
        Err(e) => return Err(io::Error::new(
            ErrorKind::InvalidData, format!("Error parsing configuration file: {}", e))),
    };

    cfg.paths = Paths {
        content_dir: parse_path(cfg.paths.content_dir),
        template_dir: parse_path(cfg.paths.template_dir),
        public_dir: parse_path(cfg.paths.public_dir),
    };

    Ok(cfg)
}

pub fn read_config(cfg_path: &PathBuf) -> io::Result<Config> {
    let cfg_content = match fs::read_to_string(cfg_path) {
        Ok(content) => content,
        Err(e) => return Err(io::Error::new(e.kind(), format!("Error opening configuration file {}: {}", cfg_path.display(), e))),
    };

    parse_config(&cfg_content)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r##"
[site]
name = "VibeBlog"
url = "https://vibeblog.app"

[paths]
content_dir = "content"
template_dir = "${exe_dir}/template"
public_dir = "public"

[server]
address = "0.0.0.0"
port = 8001

[log]
level = "Info"
log_to_console = true
"##;

    #[test]
    fn test_parse_config() {
        let cfg = parse_config(CONFIG).unwrap();
        assert_eq!(cfg.site.url, "https://vibeblog.app");
        assert_eq!(cfg.paths.content_dir, PathBuf::from("content"));
        assert!(!cfg.paths.template_dir.to_string_lossy().contains("${exe_dir}"));
        assert!(cfg.paths.template_dir.ends_with("template"));
        assert_eq!(cfg.server.port, 8001);

        let log = cfg.log.unwrap();
        assert_eq!(log.level, LogLevel::Info);
        assert!(log.location.is_none());
    }

    #[test]
    fn test_log_is_optional() {
        let cfg = CONFIG.split("[log]").next().unwrap();
        let cfg = parse_config(cfg).unwrap();
        assert!(cfg.log.is_none());
    }

    #[test]
    fn test_invalid_config() {
        let err = parse_config("[site]\nname = 1").err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }
}
