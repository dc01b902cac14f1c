use crate::domain::model::{
    EndpointCatalog, EndpointDescriptor, FetchStrategy, DEFAULT_DETAIL_LIMIT, HACKERNEWS_ENDPOINT,
    HACKERNEWS_ITEM_TEMPLATE, ID_PLACEHOLDER,
};
use crate::utils::error::{FanoutError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_required_field, validate_url, validate_url_template,
    Validate,
};
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Standard,
    IndexThenDetail,
}

/// One endpoint as written in a catalog file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogEntry {
    pub base_url: String,
    #[serde(default)]
    pub params: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub strategy: Option<StrategyKind>,
    #[serde(default)]
    pub detail_template: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogFormat {
    Json,
    Toml,
}

impl CatalogFormat {
    /// `.toml` files are TOML, everything else is read as JSON.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => CatalogFormat::Toml,
            _ => CatalogFormat::Json,
        }
    }
}

/// Raw catalog file contents, keyed by endpoint name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct CatalogFile {
    pub endpoints: BTreeMap<String, CatalogEntry>,
}

impl CatalogFile {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(FanoutError::IoError)?;
        Self::from_str_with_format(&content, CatalogFormat::from_path(&path))
    }

    pub fn from_str_with_format(content: &str, format: CatalogFormat) -> Result<Self> {
        let processed_content = substitute_env_vars(content)?;

        let file = match format {
            CatalogFormat::Json => serde_json::from_str(&processed_content)?,
            CatalogFormat::Toml => toml::from_str(&processed_content)?,
        };
        Ok(file)
    }

    /// Resolves every entry's strategy and produces the immutable catalog.
    pub fn into_catalog(self) -> Result<EndpointCatalog> {
        self.validate()?;

        let endpoints = self
            .endpoints
            .into_iter()
            .map(|(name, entry)| {
                let strategy = resolve_strategy(&name, &entry)?;
                Ok(EndpointDescriptor {
                    name,
                    target_url: entry.base_url,
                    query_params: entry.params,
                    strategy,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        EndpointCatalog::new(endpoints)
    }
}

impl Validate for CatalogFile {
    fn validate(&self) -> Result<()> {
        if self.endpoints.is_empty() {
            return Err(FanoutError::ConfigError {
                message: "Catalog does not define any endpoints".to_string(),
            });
        }

        for (name, entry) in &self.endpoints {
            validate_non_empty_string("endpoint name", name)?;
            validate_url(&format!("{}.base_url", name), &entry.base_url)?;
            if let Some(template) = &entry.detail_template {
                validate_url_template(
                    &format!("{}.detail_template", name),
                    template,
                    ID_PLACEHOLDER,
                )?;
            }
        }

        Ok(())
    }
}

/// Reads, validates and resolves a catalog file.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<EndpointCatalog> {
    CatalogFile::from_file(path)?.into_catalog()
}

fn resolve_strategy(name: &str, entry: &CatalogEntry) -> Result<FetchStrategy> {
    let kind = entry.strategy.unwrap_or(
        if name == HACKERNEWS_ENDPOINT || entry.detail_template.is_some() {
            StrategyKind::IndexThenDetail
        } else {
            StrategyKind::Standard
        },
    );

    match kind {
        StrategyKind::Standard => Ok(FetchStrategy::Standard),
        StrategyKind::IndexThenDetail => {
            let detail_template = if name == HACKERNEWS_ENDPOINT && entry.detail_template.is_none() {
                HACKERNEWS_ITEM_TEMPLATE.to_string()
            } else {
                validate_required_field(
                    &format!("{}.detail_template", name),
                    &entry.detail_template,
                )?
                .clone()
            };

            Ok(FetchStrategy::IndexThenDetail {
                detail_template,
                limit: DEFAULT_DETAIL_LIMIT,
            })
        }
    }
}

/// Replaces `${VAR}` references with environment values; unknown variables are left as written.
fn substitute_env_vars(content: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| FanoutError::ConfigError {
        message: format!("Invalid substitution pattern: {}", e),
    })?;

    let result = re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    });

    Ok(result.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    const JSON_CATALOG: &str = r#"
{
    "github": {
        "base_url": "https://api.github.com/search/repositories",
        "params": {"q": "language:python", "sort": "stars", "order": "desc"}
    },
    "stackoverflow": {
        "base_url": "https://api.stackexchange.com/2.3/questions",
        "params": {"order": "desc", "sort": "activity", "site": "stackoverflow"}
    },
    "hackernews": {
        "base_url": "https://hacker-news.firebaseio.com/v0/topstories.json"
    }
}
"#;

    #[test]
    fn test_parse_json_catalog() {
        let catalog = CatalogFile::from_str_with_format(JSON_CATALOG, CatalogFormat::Json)
            .unwrap()
            .into_catalog()
            .unwrap();

        assert_eq!(
            catalog.names().collect::<Vec<_>>(),
            vec!["github", "hackernews", "stackoverflow"]
        );

        let github = catalog.get("github").unwrap();
        assert_eq!(github.strategy, FetchStrategy::Standard);
        assert_eq!(
            github.query_params.as_ref().unwrap().get("sort").map(String::as_str),
            Some("stars")
        );

        let hackernews = catalog.get("hackernews").unwrap();
        assert_eq!(hackernews.query_params, None);
        assert_eq!(
            hackernews.strategy,
            FetchStrategy::IndexThenDetail {
                detail_template: HACKERNEWS_ITEM_TEMPLATE.to_string(),
                limit: 5,
            }
        );
    }

    #[test]
    fn test_parse_toml_catalog_with_explicit_strategy() {
        let toml_content = r#"
[fact]
base_url = "https://uselessfacts.jsph.pl/api/v2/facts/random"

[lobsters]
base_url = "https://lobste.rs/hottest.json"
strategy = "standard"

[stories]
base_url = "https://example.com/index.json"
strategy = "index_then_detail"
detail_template = "https://example.com/item/{id}.json"
"#;

        let catalog = CatalogFile::from_str_with_format(toml_content, CatalogFormat::Toml)
            .unwrap()
            .into_catalog()
            .unwrap();

        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.get("fact").unwrap().strategy, FetchStrategy::Standard);
        assert_eq!(catalog.get("lobsters").unwrap().strategy, FetchStrategy::Standard);
        assert_eq!(
            catalog.get("stories").unwrap().strategy,
            FetchStrategy::index_then_detail("https://example.com/item/{id}.json")
        );
    }

    #[test]
    fn test_hackernews_can_opt_out_of_index_then_detail() {
        let content = r#"{"hackernews": {"base_url": "https://example.com/top.json", "strategy": "standard"}}"#;
        let catalog = CatalogFile::from_str_with_format(content, CatalogFormat::Json)
            .unwrap()
            .into_catalog()
            .unwrap();

        assert_eq!(
            catalog.get("hackernews").unwrap().strategy,
            FetchStrategy::Standard
        );
    }

    #[test]
    fn test_detail_template_implies_index_then_detail() {
        let content = r#"{"stories": {"base_url": "https://example.com/top.json", "detail_template": "https://example.com/{id}"}}"#;
        let catalog = CatalogFile::from_str_with_format(content, CatalogFormat::Json)
            .unwrap()
            .into_catalog()
            .unwrap();

        assert_eq!(
            catalog.get("stories").unwrap().strategy,
            FetchStrategy::index_then_detail("https://example.com/{id}")
        );
    }

    #[test]
    fn test_index_then_detail_requires_template() {
        let content = r#"{"stories": {"base_url": "https://example.com/top.json", "strategy": "index_then_detail"}}"#;
        let result = CatalogFile::from_str_with_format(content, CatalogFormat::Json)
            .unwrap()
            .into_catalog();

        assert!(matches!(
            result,
            Err(FanoutError::MissingConfigError { field }) if field == "stories.detail_template"
        ));
    }

    #[test]
    fn test_catalog_validation() {
        let bad_url = r#"{"github": {"base_url": "not-a-url"}}"#;
        assert!(CatalogFile::from_str_with_format(bad_url, CatalogFormat::Json)
            .unwrap()
            .into_catalog()
            .is_err());

        let bad_template = r#"{"s": {"base_url": "https://e.com", "detail_template": "https://e.com/item"}}"#;
        assert!(CatalogFile::from_str_with_format(bad_template, CatalogFormat::Json)
            .unwrap()
            .into_catalog()
            .is_err());

        let empty = CatalogFile::from_str_with_format("{}", CatalogFormat::Json).unwrap();
        assert!(matches!(
            empty.into_catalog(),
            Err(FanoutError::ConfigError { .. })
        ));
    }

    #[test]
    fn test_malformed_catalog_is_a_parse_error() {
        assert!(matches!(
            CatalogFile::from_str_with_format(r#"{"github": {}}"#, CatalogFormat::Json),
            Err(FanoutError::SerializationError(_))
        ));
        assert!(matches!(
            CatalogFile::from_str_with_format("[github", CatalogFormat::Toml),
            Err(FanoutError::TomlError(_))
        ));
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("FANOUT_TEST_GITHUB_QUERY", "language:rust");

        let content = r#"{"github": {"base_url": "https://api.github.com/search/repositories", "params": {"q": "${FANOUT_TEST_GITHUB_QUERY}", "token": "${FANOUT_TEST_UNSET_VAR}"}}}"#;
        let file = CatalogFile::from_str_with_format(content, CatalogFormat::Json).unwrap();
        let params = file.endpoints["github"].params.as_ref().unwrap();

        assert_eq!(params["q"], "language:rust");
        assert_eq!(params["token"], "${FANOUT_TEST_UNSET_VAR}");

        std::env::remove_var("FANOUT_TEST_GITHUB_QUERY");
    }

    #[test]
    fn test_base_url_expands_env_vars_and_keeps_other_braces() {
        std::env::set_var("FANOUT_TEST_WEATHER_HOST", "goweather.herokuapp.com");

        let content = r#"{"weather": {"base_url": "https://${FANOUT_TEST_WEATHER_HOST}/weather/{city}"}}"#;
        let catalog = CatalogFile::from_str_with_format(content, CatalogFormat::Json)
            .unwrap()
            .into_catalog()
            .unwrap();

        let weather = catalog.get("weather").unwrap();
        assert_eq!(weather.target_url, "https://goweather.herokuapp.com/weather/{city}");
        assert_eq!(weather.strategy, FetchStrategy::Standard);

        std::env::remove_var("FANOUT_TEST_WEATHER_HOST");
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(CatalogFormat::from_path("api_catalog/api.json"), CatalogFormat::Json);
        assert_eq!(CatalogFormat::from_path("catalog.TOML"), CatalogFormat::Toml);
        assert_eq!(CatalogFormat::from_path("catalog"), CatalogFormat::Json);
    }

    #[test]
    fn test_load_catalog_from_file() {
        let mut temp_file = Builder::new().suffix(".json").tempfile().unwrap();
        temp_file.write_all(JSON_CATALOG.as_bytes()).unwrap();

        let catalog = load_catalog(temp_file.path()).unwrap();
        assert_eq!(catalog.len(), 3);
    }
}
