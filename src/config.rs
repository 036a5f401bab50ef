use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub contest: ContestConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 为空时允许任意来源
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// 活动规则配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContestConfig {
    /// 活动所在时区相对 UTC 的偏移 (分钟)
    #[serde(default = "default_utc_offset_minutes")]
    pub utc_offset_minutes: i32,
    /// 次日重新开放的整点 (本地时间)
    #[serde(default = "default_reopen_hour")]
    pub reopen_hour: u32,
    /// 启动时若奖品表为空则写入默认奖品
    #[serde(default = "default_seed_default_prizes")]
    pub seed_default_prizes: bool,
}

fn default_utc_offset_minutes() -> i32 {
    60
}

fn default_reopen_hour() -> u32 {
    8
}

fn default_seed_default_prizes() -> bool {
    true
}

impl Default for ContestConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: default_utc_offset_minutes(),
            reopen_hour: default_reopen_hour(),
            seed_default_prizes: default_seed_default_prizes(),
        }
    }
}

impl ContestConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.utc_offset_minutes.unsigned_abs() >= 24 * 60 {
            return Err(format!(
                "contest.utc_offset_minutes out of range: {}",
                self.utc_offset_minutes
            ));
        }
        if self.reopen_hour > 23 {
            return Err(format!(
                "contest.reopen_hour out of range: {}",
                self.reopen_hour
            ));
        }
        Ok(())
    }
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // 尝试读取配置文件，如果不存在则完全依赖环境变量
        let config_result = std::fs::read_to_string(&config_path);

        let mut config: Config = match config_result {
            Ok(config_str) => {
                // 有配置文件：先解析再用环境变量覆盖
                toml::from_str(&config_str).map_err(|e| format!("解析配置文件失败: {e}"))?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                fn get_env(name: &str) -> Option<String> {
                    env::var(name).ok()
                }
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                // 数据库 URL 在无配置文件时必须提供
                let database_url = get_env("DATABASE_URL")
                    .ok_or("缺少 DATABASE_URL 环境变量，且未找到配置文件 config.toml")?;

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 8080u16),
                        cors_allowed_origins: Vec::new(),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                    },
                    contest: ContestConfig::default(),
                }
            }
            Err(e) => {
                return Err(format!("无法读取配置文件 {config_path}: {e}").into());
            }
        };

        // 环境变量覆盖（即便文件存在时也覆盖）
        if let Ok(v) = env::var("SERVER_HOST") {
            config.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            config.server.port = p;
        }
        if let Ok(v) = env::var("CORS_ALLOWED_ORIGINS") {
            config.server.cors_allowed_origins = v
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            config.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            config.database.max_connections = mc;
        }
        if let Ok(v) = env::var("CONTEST_UTC_OFFSET_MINUTES")
            && let Ok(n) = v.parse()
        {
            config.contest.utc_offset_minutes = n;
        }
        if let Ok(v) = env::var("CONTEST_REOPEN_HOUR")
            && let Ok(n) = v.parse()
        {
            config.contest.reopen_hour = n;
        }
        if let Ok(v) = env::var("CONTEST_SEED_DEFAULT_PRIZES")
            && let Ok(b) = v.parse()
        {
            config.contest.seed_default_prizes = b;
        }

        config.contest.validate()?;

        Ok(config)
    }
}
