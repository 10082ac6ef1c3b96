use secstr::SecStr;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use warp::Filter;

const DEFAULT_BIND: &str = "0.0.0.0:8888";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("env {0} is not set")]
    Missing(&'static str),
    #[error("env {0} is empty")]
    Empty(&'static str),
    #[error("env BIND is not a socket address: {0}")]
    InvalidBind(String, #[source] std::net::AddrParseError),
}

#[derive(Debug)]
pub struct Config {
    pub bind: SocketAddr,
    // Tableau instance
    pub region: String,
    pub site_id: String,
    pub user: String,
    // Connected app
    pub client_id: String,
    pub key_id: String,
    pub secret_key: SecStr,
    // Dashboard
    pub workbook: String,
    pub worksheet: String,
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(name).ok_or(ConfigError::Missing(name))?;
    let value = value.trim();
    if value.is_empty() {
        return Err(ConfigError::Empty(name));
    }
    Ok(value.to_owned())
}

/// Builds the config from an arbitrary variable source.
pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let bind = lookup("BIND")
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_BIND.to_owned());
    let bind: SocketAddr = bind
        .parse()
        .map_err(|err| ConfigError::InvalidBind(bind.clone(), err))?;

    Ok(Config {
        bind,
        region: required(&lookup, "TABLEAU_REGION")?,
        site_id: required(&lookup, "TABLEAU_SITE_ID")?,
        user: required(&lookup, "TABLEAU_USER")?,
        client_id: required(&lookup, "CONNECTED_APP_CLIENT_ID")?,
        key_id: required(&lookup, "CONNECTED_APP_SECRET_ID")?,
        secret_key: SecStr::from(required(&lookup, "CONNECTED_APP_SECRET_VALUE")?),
        workbook: required(&lookup, "TABLEAU_WORKBOOK")?,
        worksheet: required(&lookup, "TABLEAU_WORKSHEET")?,
    })
}

pub fn load() -> Result<Config, ConfigError> {
    from_lookup(|name| std::env::var(name).ok())
}

pub fn with_config(
    config: Arc<Config>,
) -> impl Filter<Extract = (Arc<Config>,), Error = Infallible> + Clone {
    warp::any().map(move || config.clone())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;

    pub(crate) fn sample_env() -> HashMap<&'static str, &'static str> {
        let mut env = HashMap::new();
        env.insert("TABLEAU_REGION", "10ay");
        env.insert("TABLEAU_SITE_ID", "sitename");
        env.insert("TABLEAU_USER", "username");
        env.insert("CONNECTED_APP_CLIENT_ID", "client-id");
        env.insert("CONNECTED_APP_SECRET_ID", "secret-id");
        env.insert("CONNECTED_APP_SECRET_VALUE", "secret-value");
        env.insert("TABLEAU_WORKBOOK", "Superstore");
        env.insert("TABLEAU_WORKSHEET", "Overview");
        env
    }

    pub(crate) fn load_from(env: &HashMap<&'static str, &'static str>) -> Result<Config, ConfigError> {
        from_lookup(|name| env.get(name).map(|value| value.to_string()))
    }

    pub(crate) fn sample_config() -> Config {
        load_from(&sample_env()).unwrap()
    }

    #[test]
    fn load_complete_env() {
        let config = sample_config();
        assert_eq!("10ay", config.region);
        assert_eq!("sitename", config.site_id);
        assert_eq!("username", config.user);
        assert_eq!("client-id", config.client_id);
        assert_eq!("secret-id", config.key_id);
        assert_eq!(b"secret-value", config.secret_key.unsecure());
        assert_eq!("Superstore", config.workbook);
        assert_eq!("Overview", config.worksheet);
        assert_eq!("0.0.0.0:8888".parse::<SocketAddr>().unwrap(), config.bind);
    }

    #[test]
    fn missing_secret_fails() {
        let mut env = sample_env();
        env.remove("CONNECTED_APP_SECRET_VALUE");
        match load_from(&env) {
            Err(ConfigError::Missing(name)) => assert_eq!("CONNECTED_APP_SECRET_VALUE", name),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn blank_secret_fails() {
        let mut env = sample_env();
        env.insert("CONNECTED_APP_SECRET_VALUE", "   ");
        match load_from(&env) {
            Err(ConfigError::Empty(name)) => assert_eq!("CONNECTED_APP_SECRET_VALUE", name),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn custom_and_invalid_bind() {
        let mut env = sample_env();
        env.insert("BIND", "127.0.0.1:3000");
        let config = load_from(&env).unwrap();
        assert_eq!("127.0.0.1:3000".parse::<SocketAddr>().unwrap(), config.bind);

        env.insert("BIND", "localhost");
        assert!(matches!(load_from(&env), Err(ConfigError::InvalidBind(_, _))));
    }

    #[test]
    fn debug_hides_secret() {
        let output = format!("{:?}", sample_config());
        assert!(!output.contains("secret-value"));
    }
}
