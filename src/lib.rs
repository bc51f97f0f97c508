//! Payrule - payment method rule editor
//!
//! A terminal form for authoring e-commerce rules that hide, sort or rename
//! payment methods when cart conditions are met.

pub mod app;
pub mod config;
pub mod error;
pub mod rules;
pub mod theme;

pub use config::Config;
pub use error::ParseError;
pub use rules::{
    ConditionKind, MatchLogic, PaymentMethodDraft, RuleDraft, RuleForm, SubmissionPayload,
    SubmissionSink,
};
pub use theme::Theme;

/// Current version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Expand ~ and environment variables ($VAR, ${VAR}) in a path
pub fn expand_path(path: &std::path::Path) -> std::path::PathBuf {
    let path_str = path.to_string_lossy();

    // First expand ~ prefix
    let expanded = match path_str.strip_prefix("~/") {
        Some(stripped) => dirs::home_dir()
            .map(|home| home.join(stripped).to_string_lossy().to_string())
            .unwrap_or_else(|| path_str.to_string()),
        None if path_str == "~" => dirs::home_dir()
            .map(|home| home.to_string_lossy().to_string())
            .unwrap_or_else(|| path_str.to_string()),
        None => path_str.to_string(),
    };

    // Then expand $VAR and ${VAR} patterns
    use std::sync::LazyLock;
    static ENV_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
        regex::Regex::new(r"\$\{([^}]+)\}|\$([A-Za-z_][A-Za-z0-9_]*)").expect("invalid env regex")
    });

    let result = ENV_RE.replace_all(&expanded, |caps: &regex::Captures| {
        let var_name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str())
            .unwrap_or("");
        std::env::var(var_name).unwrap_or_else(|_| caps[0].to_string())
    });

    std::path::PathBuf::from(result.as_ref())
}
