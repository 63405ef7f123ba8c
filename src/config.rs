use anyhow::{Context, Result, bail};
use std::time::Duration;

use crate::catalog::DEFAULT_BASE_URL;
use crate::client::ClientConfig;

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) fn load_config(url: Option<String>, verify: Option<bool>) -> Result<ClientConfig> {
    load_config_from(url, verify, |name| std::env::var(name).ok())
}

fn load_config_from<F>(url: Option<String>, verify: Option<bool>, env: F) -> Result<ClientConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let url = url
        .or_else(|| env("BIOPORTAL_URL"))
        .map(|u| u.trim().to_string())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    if !url.starts_with("http://") && !url.starts_with("https://") {
        bail!("invalid BIOPORTAL_URL {:?}: expected an http(s) URL", url);
    }

    let connect_timeout = match env("BIOPORTAL_CONNECT_TIMEOUT") {
        Some(v) => parse_secs(&v).context("invalid BIOPORTAL_CONNECT_TIMEOUT")?,
        None => DEFAULT_CONNECT_TIMEOUT,
    };

    let timeout = env("BIOPORTAL_TIMEOUT")
        .map(|v| parse_secs(&v).context("invalid BIOPORTAL_TIMEOUT"))
        .transpose()?;

    let verify = verify
        .or_else(|| env("BIOPORTAL_VERIFY").map(|v| v.trim() != "0"))
        .unwrap_or(true);

    Ok(ClientConfig {
        url,
        connect_timeout,
        timeout,
        verify,
    })
}

fn parse_secs(v: &str) -> Result<Duration> {
    let secs: f64 = v
        .trim()
        .parse()
        .with_context(|| format!("{:?} is not a number of seconds", v))?;
    if !secs.is_finite() || secs <= 0.0 {
        bail!("timeout must be a positive number of seconds, got {}", v);
    }
    Ok(Duration::from_secs_f64(secs))
}
