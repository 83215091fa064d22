use clap::Parser;
use std::path::PathBuf;

/// Order list web server
#[derive(Clone, Debug, Parser)]
#[command(name = "website", version, about)]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "ORDERLIST_BIND", default_value = "127.0.0.1:3000")]
    pub bind: String,

    /// Directory holding projects, keywords and uploaded images
    #[arg(long, env = "ORDERLIST_DATA_DIR", default_value = "database")]
    pub data_dir: PathBuf,

    /// Largest accepted request body in MiB
    #[arg(long, env = "ORDERLIST_MAX_UPLOAD_MB", default_value_t = 25)]
    pub max_upload_mb: usize,

    /// URL prefix uploaded images are served under
    #[arg(long, env = "ORDERLIST_PUBLIC_PREFIX", default_value = "/uploads")]
    pub public_prefix: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: "127.0.0.1:3000".to_string(),
            data_dir: PathBuf::from("database"),
            max_upload_mb: 25,
            public_prefix: "/uploads".to_string(),
        }
    }
}

impl ServerConfig {
    /// Defaults rooted at another data directory.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        ServerConfig {
            data_dir: data_dir.into(),
            ..ServerConfig::default()
        }
    }

    pub fn projects_dir(&self) -> PathBuf {
        self.data_dir.join("projects")
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.data_dir.join("uploads")
    }

    pub fn keywords_path(&self) -> PathBuf {
        self.data_dir.join("keywords.json")
    }

    pub fn keywords_cache_path(&self) -> PathBuf {
        self.data_dir.join("keywords.cache.json")
    }

    /// The public prefix with exactly one leading slash and no trailing one.
    pub fn image_url_prefix(&self) -> String {
        match self.public_prefix.trim_matches('/') {
            "" => "/uploads".to_string(),
            trimmed => format!("/{}", trimmed),
        }
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }
}
