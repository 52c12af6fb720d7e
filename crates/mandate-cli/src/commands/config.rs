//! Effective configuration display

use anyhow::Result;
use mandate_delegation::EngineConfig;

/// Render `config` as TOML
pub fn render(config: &EngineConfig) -> Result<String> {
    Ok(toml::to_string_pretty(config)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_defaults() {
        let rendered = render(&EngineConfig::default()).unwrap();
        assert!(rendered.contains("max_chain_length = 16"));
        assert!(rendered.contains("reuse_policy = \"reusable\""));
        assert!(rendered.contains("[domain]"));
    }
}
