use crate::{Error, Result};
use config::{Config, Environment, File, FileFormat};
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// number of threads config
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Thread {
    /// number of http server threads
    pub http: usize,
}

/// network config
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Network {
    /// server bind host
    pub host: String,
    /// server bind port
    pub port: u16,
    /// allowed cors origins, any origin if empty
    pub cors_origins: Vec<String>,
}

impl Default for Network {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            cors_origins: vec![],
        }
    }
}

/// auth config
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Auth {
    /// jwt signing secret, a random one is generated on startup if empty
    pub secret: String,

    /// jwt access token expiry in seconds
    pub access_token_expiry: usize,

    pub admin_username: String,

    /// admin login is disabled if not set
    pub admin_password: Option<String>,
}

impl Auth {
    /// Fill an empty secret with random bytes, tokens then last until restart.
    pub fn ensure_secret(&mut self) {
        if self.secret.is_empty() {
            self.secret = rand::thread_rng()
                .sample_iter(&Alphanumeric)
                .take(48)
                .map(char::from)
                .collect();
        }
    }
}

impl Default for Auth {
    fn default() -> Self {
        Self {
            secret: String::new(),
            access_token_expiry: 2 * 24 * 60 * 60,
            admin_username: "admin".to_owned(),
            admin_password: None,
        }
    }
}

/// uploaded files config
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Upload {
    /// root directory of uploaded files
    pub dir: PathBuf,
    /// public url prefix the directory is served at
    pub url_prefix: String,
    /// max bytes of one file
    pub max_size: usize,
    /// max files of one bulk upload
    pub max_files: usize,
    /// remove gallery files without a record on startup
    pub sweep_on_start: bool,
}

impl Default for Upload {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("uploads"),
            url_prefix: "/uploads".to_owned(),
            max_size: 5 * 1024 * 1024,
            max_files: 10,
            sweep_on_start: false,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Setting {
    /// database url
    /// https://www.sea-ql.org/SeaORM/docs/install-and-config/connection/
    pub db_url: String,

    pub db_max_connections: Option<u32>,

    /// built frontend, served at `/` if set
    pub site_dir: Option<PathBuf>,

    pub thread: Thread,
    pub network: Network,
    pub auth: Auth,
    pub upload: Upload,
}

impl Default for Setting {
    fn default() -> Self {
        Self {
            db_url: "sqlite://mandir.sqlite?mode=rwc".to_string(),
            db_max_connections: None,
            site_dir: None,
            thread: Default::default(),
            network: Default::default(),
            auth: Default::default(),
            upload: Default::default(),
        }
    }
}

impl Setting {
    /// read config from file and env
    pub fn read<P: AsRef<Path>>(file: P, env_prefix: Option<String>) -> Result<Self> {
        let path = file
            .as_ref()
            .to_str()
            .ok_or_else(|| Error::Message(format!("invalid config path {:?}", file.as_ref())))?;
        let mut config = Config::builder().add_source(File::with_name(path));
        if let Some(prefix) = env_prefix {
            config = config.add_source(Self::env_source(&prefix));
        }

        let config = config.build()?;
        let mut setting: Setting = config.try_deserialize()?;
        setting.validate()?;
        Ok(setting)
    }

    fn env_source(prefix: &str) -> Environment {
        Environment::with_prefix(prefix)
            .try_parsing(true)
            .prefix_separator("_")
            .separator("__")
            .list_separator(" ")
            .with_list_parse_key("network.cors_origins")
    }

    /// read config from env
    pub fn from_env(env_prefix: String) -> Result<Self> {
        let mut config = Config::builder();
        config = config.add_source(Self::env_source(&env_prefix));

        let config = config.build()?;
        let mut setting: Setting = config.try_deserialize()?;
        setting.validate()?;
        Ok(setting)
    }

    /// config from str
    pub fn from_str(s: &str, format: FileFormat) -> Result<Self> {
        let builder = Config::builder();
        let config = builder.add_source(File::from_str(s, format)).build()?;
        let mut setting: Setting = config.try_deserialize()?;
        setting.validate()?;
        Ok(setting)
    }

    fn validate(&mut self) -> Result<()> {
        self.auth.ensure_secret();
        if self.upload.max_size == 0 || self.upload.max_files == 0 {
            return Err(Error::Str("upload limits must be greater than 0"));
        }
        Ok(())
    }
}
