// src/config.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::fetch::ResponseShape;
use crate::record::Origin;

const ENV_PATH: &str = "CONTENT_SOURCES_PATH";

fn default_timeout_secs() -> u64 {
    10
}

fn default_limit() -> usize {
    12
}

/// One upstream origin in the fetch chain. Order in the file is priority
/// order: earlier sources win de-duplication collisions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub name: String,
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub shape: ResponseShape,
    pub origin: Origin,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

/// Load the source chain from an explicit path. Supports TOML or JSON.
pub fn load_sources_from(path: &Path) -> Result<Vec<SourceConfig>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading sources from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_sources(&content, ext.as_str())
}

/// Load the source chain using env var + fallbacks:
/// 1) $CONTENT_SOURCES_PATH
/// 2) config/sources.toml
/// 3) config/sources.json
/// 4) built-in default chain
pub fn load_sources_default() -> Result<Vec<SourceConfig>> {
    if let Ok(p) = std::env::var(ENV_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_sources_from(&pb);
        }
        return Err(anyhow!("CONTENT_SOURCES_PATH points to non-existent path"));
    }
    let toml_p = PathBuf::from("config/sources.toml");
    if toml_p.exists() {
        return load_sources_from(&toml_p);
    }
    let json_p = PathBuf::from("config/sources.json");
    if json_p.exists() {
        return load_sources_from(&json_p);
    }
    Ok(default_chain())
}

/// Built-in chain used when no config file is present: primary CMS proxy,
/// then the secondary content API, then the raw tunnel to the same API.
pub fn default_chain() -> Vec<SourceConfig> {
    vec![
        SourceConfig {
            name: "cms".to_string(),
            base_url: "https://cms.example.com/wp-json/wp/v2".to_string(),
            timeout_secs: 10,
            shape: ResponseShape::Array,
            origin: Origin::Primary,
            limit: 12,
        },
        SourceConfig {
            name: "content-api".to_string(),
            base_url: "https://api.example.com/content".to_string(),
            timeout_secs: 10,
            shape: ResponseShape::Items,
            origin: Origin::Secondary,
            limit: 12,
        },
        SourceConfig {
            name: "raw-tunnel".to_string(),
            base_url: "https://tunnel.example.com/content".to_string(),
            timeout_secs: 8,
            shape: ResponseShape::Items,
            origin: Origin::Secondary,
            limit: 12,
        },
    ]
}

fn parse_sources(s: &str, hint_ext: &str) -> Result<Vec<SourceConfig>> {
    let toml_first = hint_ext == "toml" || s.contains("[[sources]]");

    let attempts: [fn(&str) -> Result<Vec<SourceConfig>>; 2] = if toml_first {
        [parse_toml, parse_json]
    } else {
        [parse_json, parse_toml]
    };

    // Keep both causes: a typo in a sources file must stay diagnosable.
    let first_err = match attempts[0](s) {
        Ok(v) => return Ok(v),
        Err(e) => e,
    };
    attempts[1](s).with_context(|| {
        format!("sources file parsed as neither TOML nor JSON (first attempt: {first_err:#})")
    })
}

fn parse_toml(s: &str) -> Result<Vec<SourceConfig>> {
    #[derive(Deserialize)]
    struct TomlSources {
        sources: Vec<SourceConfig>,
    }
    let v: TomlSources = toml::from_str(s)?;
    validate(v.sources)
}

fn parse_json(s: &str) -> Result<Vec<SourceConfig>> {
    let v: Vec<SourceConfig> = serde_json::from_str(s)?;
    validate(v)
}

fn validate(sources: Vec<SourceConfig>) -> Result<Vec<SourceConfig>> {
    if sources.is_empty() {
        return Err(anyhow!("source chain is empty"));
    }
    for src in &sources {
        if src.name.trim().is_empty() {
            return Err(anyhow!("source with empty name"));
        }
        if !src.base_url.starts_with("http://") && !src.base_url.starts_with("https://") {
            return Err(anyhow!("source '{}' base_url is not absolute", src.name));
        }
    }
    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_and_json_formats_parse() {
        let toml = r#"
            [[sources]]
            name = "cms"
            base_url = "https://cms.example.com/wp-json/wp/v2"
            origin = "primary"

            [[sources]]
            name = "content-api"
            base_url = "https://api.example.com/content"
            shape = "items"
            origin = "secondary"
            timeout_secs = 15
        "#;
        let out = parse_toml(toml).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].timeout_secs, 10); // default
        assert_eq!(out[1].shape, ResponseShape::Items);
        assert_eq!(out[1].origin, Origin::Secondary);

        let json = r#"[
            {"name": "cms", "base_url": "https://cms.example.com", "origin": "primary"}
        ]"#;
        let out = parse_json(json).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].limit, 12); // default
    }

    #[test]
    fn invalid_chains_are_rejected() {
        assert!(parse_json("[]").is_err());
        let relative = r#"[{"name": "x", "base_url": "/content", "origin": "primary"}]"#;
        assert!(parse_json(relative).is_err());
    }

    #[test]
    fn parse_failures_keep_the_underlying_cause() {
        let bad = "[[sources]]\nname = 42\n";
        let err = parse_sources(bad, "toml").unwrap_err();
        let chain = format!("{err:#}");
        assert!(
            chain.contains("neither TOML nor JSON"),
            "error should say both formats were tried: {chain}"
        );
        assert!(
            chain.contains("invalid type"),
            "underlying parse error must survive: {chain}"
        );
    }

    #[test]
    fn explicit_path_load_works() {
        let tmp = tempfile::tempdir().unwrap();
        let p = tmp.path().join("sources.json");
        std::fs::write(
            &p,
            r#"[{"name": "cms", "base_url": "https://cms.example.com", "origin": "primary"}]"#,
        )
        .unwrap();
        let out = load_sources_from(&p).unwrap();
        assert_eq!(out[0].name, "cms");
    }
}
