//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::PagerConfig;
use crate::error::{Error, Result, ResultExt};
use crate::pagination::{Navigation, PageController, PagerState, Phase, Settled};
use crate::source::HttpPageSource;
use crate::template::TemplateContext;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Validate => self.validate(),
            Commands::Page { page } => self.page(*page).await,
            Commands::Walk { max_pages } => self.walk(*max_pages).await,
            Commands::Browse => self.browse().await,
        }
    }

    /// Load configuration and apply command-line overrides
    fn load_config(&self) -> Result<PagerConfig> {
        let path = self
            .cli
            .config
            .as_ref()
            .ok_or_else(|| Error::config("Config file not specified (use -c flag)"))?;

        let mut config = PagerConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?;
        if let Some(page_size) = self.cli.page_size {
            config.page_size = page_size;
        }
        config.validate()?;
        Ok(config)
    }

    /// Build the template context from `--var` flags
    fn template_context(&self) -> Result<TemplateContext> {
        self.cli
            .vars
            .iter()
            .try_fold(TemplateContext::new(), |ctx, pair| {
                let (key, value) = pair.split_once('=').ok_or_else(|| {
                    Error::invalid_value("var", format!("expected KEY=VALUE, got '{pair}'"))
                })?;
                Ok(ctx.var(key.trim(), value))
            })
    }

    /// Start a controller over the configured HTTP source
    fn build_pager(&self, config: &PagerConfig) -> Result<PageController<Value>> {
        let ctx = self.template_context()?;
        let source = HttpPageSource::<Value>::with_context(config.source.clone(), &ctx)?;
        PageController::from_config(source, config)
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        let config = self.load_config()?;
        // Renders templated headers so missing variables surface here
        config.source.http_config(&self.template_context()?)?;

        self.output_message(&json!({
            "type": "LOG",
            "log": {
                "level": "INFO",
                "message": format!(
                    "Config is valid: {:?} {}{} (page size {})",
                    config.source.method,
                    config.source.base_url,
                    config.source.path,
                    config.page_size
                )
            }
        }));

        Ok(())
    }

    /// Fetch one page
    async fn page(&self, page: u32) -> Result<()> {
        let config = self.load_config()?;
        let pager = self.build_pager(&config)?;

        let mut state = pager.idle().await;
        if page != state.current_page() && state.phase() != Phase::Error {
            state = match pager.go_to_page(page).await {
                Settled::Loaded(state) | Settled::Failed(state) => state,
                Settled::Skipped => {
                    return Err(Error::invalid_value(
                        "page",
                        format!("must be between 1 and {}", state.total_pages()),
                    ))
                }
                Settled::Cancelled => return Err(Error::Other("Pager stopped".into())),
            };
        }

        self.output_page(&state);
        pager.dispose();
        ensure_loaded(&state)
    }

    /// Fetch every page in order
    async fn walk(&self, max_pages: Option<u32>) -> Result<()> {
        let config = self.load_config()?;
        let pager = self.build_pager(&config)?;

        let mut state = pager.idle().await;
        let mut walked = 0u32;

        loop {
            self.output_page(&state);
            ensure_loaded(&state)?;
            walked += 1;

            if state.is_last_page() || max_pages.is_some_and(|max| walked >= max) {
                break;
            }

            state = match pager.next_page().await {
                Settled::Loaded(state) | Settled::Failed(state) => state,
                Settled::Skipped | Settled::Cancelled => break,
            };
        }

        self.output_message(&json!({
            "type": "STATS",
            "stats": pager.stats(),
        }));
        pager.dispose();
        Ok(())
    }

    /// Interactive navigation driven by stdin
    async fn browse(&self) -> Result<()> {
        let config = self.load_config()?;
        let pager = self.build_pager(&config)?;

        let first = pager.idle().await;
        self.output_page(&first);

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines
            .next_line()
            .await
            .context("Failed to read browse command")?
        {
            let navigation = match parse_browse_command(&line) {
                Some(BrowseCommand::Navigate(navigation)) => navigation,
                Some(BrowseCommand::Quit) => break,
                Some(BrowseCommand::Unknown(input)) => {
                    self.output_log("WARN", &format!("Unknown command '{input}'"));
                    continue;
                }
                None => continue,
            };

            match pager.navigate(navigation).await {
                Settled::Loaded(state) | Settled::Failed(state) => self.output_page(&state),
                Settled::Skipped => {
                    debug!("{navigation:?} is out of range");
                    self.output_log("INFO", "No such page");
                }
                Settled::Cancelled => break,
            }
        }

        self.output_message(&json!({
            "type": "STATS",
            "stats": pager.stats(),
        }));
        pager.dispose();
        Ok(())
    }

    fn output_page(&self, state: &PagerState<Value>) {
        self.output_message(&page_message(state));
    }

    fn output_log(&self, level: &str, message: &str) {
        self.output_message(&json!({
            "type": "LOG",
            "log": {
                "level": level,
                "message": message,
            }
        }));
    }

    /// Output a message based on format
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

/// `PAGE` message for a snapshot
fn page_message(state: &PagerState<Value>) -> Value {
    json!({
        "type": "PAGE",
        "page": state,
    })
}

/// Turn an error snapshot into a command failure
fn ensure_loaded(state: &PagerState<Value>) -> Result<()> {
    match state.phase() {
        Phase::Error => Err(Error::source_failure(
            state.last_error().map(str::to_string),
        )),
        Phase::Idle | Phase::Fetching => Ok(()),
    }
}

/// A line typed into `browse`
#[derive(Debug, Clone, PartialEq, Eq)]
enum BrowseCommand {
    Navigate(Navigation),
    Quit,
    Unknown(String),
}

/// Parse one `browse` line; blank lines yield `None`
fn parse_browse_command(line: &str) -> Option<BrowseCommand> {
    let mut words = line.split_whitespace();
    let command = words.next()?;
    let argument = words.next().and_then(|word| word.parse::<u32>().ok());

    let parsed = match (command.to_lowercase().as_str(), argument) {
        ("n" | "next", _) => BrowseCommand::Navigate(Navigation::Next),
        ("p" | "prev" | "previous", _) => BrowseCommand::Navigate(Navigation::Previous),
        ("f" | "first", _) => BrowseCommand::Navigate(Navigation::First),
        ("r" | "reload", _) => BrowseCommand::Navigate(Navigation::Reload),
        ("g" | "goto", Some(page)) => BrowseCommand::Navigate(Navigation::GoTo(page)),
        ("s" | "size", Some(size)) => BrowseCommand::Navigate(Navigation::Resize(size)),
        ("q" | "quit" | "exit", _) => BrowseCommand::Quit,
        _ => BrowseCommand::Unknown(line.trim().to_string()),
    };
    Some(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::{Cursor, PageRequest, PageResponse};
    use crate::source::PageSource;
    use async_trait::async_trait;
    use clap::Parser;
    use test_case::test_case;

    #[test_case("n" => Some(BrowseCommand::Navigate(Navigation::Next)) ; "next short")]
    #[test_case("  previous " => Some(BrowseCommand::Navigate(Navigation::Previous)) ; "previous padded")]
    #[test_case("F" => Some(BrowseCommand::Navigate(Navigation::First)) ; "first uppercase")]
    #[test_case("r" => Some(BrowseCommand::Navigate(Navigation::Reload)) ; "reload")]
    #[test_case("g 7" => Some(BrowseCommand::Navigate(Navigation::GoTo(7))) ; "goto page")]
    #[test_case("size 50" => Some(BrowseCommand::Navigate(Navigation::Resize(50))) ; "resize")]
    #[test_case("q" => Some(BrowseCommand::Quit) ; "quit")]
    #[test_case("g" => Some(BrowseCommand::Unknown("g".into())) ; "goto without page")]
    #[test_case("g x" => Some(BrowseCommand::Unknown("g x".into())) ; "goto non numeric")]
    #[test_case("jump" => Some(BrowseCommand::Unknown("jump".into())) ; "unknown word")]
    #[test_case("   " => None ; "blank")]
    fn test_parse_browse_command(line: &str) -> Option<BrowseCommand> {
        parse_browse_command(line)
    }

    #[test]
    fn test_template_context_from_vars() {
        let cli = Cli::parse_from([
            "solidafy-pager",
            "--var",
            "token=abc=123",
            "--var",
            "org = acme",
            "validate",
        ]);
        let ctx = Runner::new(cli).template_context().unwrap();
        assert_eq!(ctx.vars.get("token").map(String::as_str), Some("abc=123"));
        assert_eq!(ctx.vars.get("org").map(String::as_str), Some(" acme"));
    }

    #[test]
    fn test_template_context_rejects_bad_var() {
        let cli = Cli::parse_from(["solidafy-pager", "--var", "token", "validate"]);
        assert!(Runner::new(cli).template_context().is_err());
    }

    #[test]
    fn test_load_config_applies_page_size_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pager.yaml");
        std::fs::write(&path, "page_size: 20\nsource:\n  base_url: https://example.com\n")
            .unwrap();

        let cli = Cli::parse_from([
            "solidafy-pager",
            "-c",
            path.to_str().unwrap(),
            "-s",
            "50",
            "walk",
        ]);
        let config = Runner::new(cli).load_config().unwrap();
        assert_eq!(config.page_size, 50);
    }

    #[test]
    fn test_load_config_requires_path() {
        let cli = Cli::parse_from(["solidafy-pager", "validate"]);
        assert!(Runner::new(cli).load_config().is_err());
    }

    #[test]
    fn test_load_config_names_failing_file() {
        let cli = Cli::parse_from(["solidafy-pager", "-c", "/nonexistent/pager.yaml", "page"]);
        let err = Runner::new(cli).load_config().unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Failed to load config /nonexistent/pager.yaml"));
        assert!(message.contains("File not found"));
    }

    struct SinglePage;

    #[async_trait]
    impl PageSource for SinglePage {
        type Record = Value;

        async fn fetch_page(&self, request: &PageRequest) -> Result<PageResponse<Value>> {
            Ok(PageResponse {
                cursor: Some(Cursor::new("opaque-token")),
                records: vec![json!({"id": 1}), json!({"id": 2})],
                current_page: request.page,
                total_pages: 1,
                total_records: 2,
                page_size: request.size,
            })
        }
    }

    #[tokio::test]
    async fn test_page_message_from_controller_snapshot() {
        let pager = PageController::initialize(SinglePage, 20).unwrap();
        let first = pager.idle().await;

        let message = page_message(&first);

        assert_eq!(message["type"], "PAGE");
        let page = &message["page"];
        assert_eq!(page["currentPage"], 1);
        assert_eq!(page["totalRecords"], 2);
        assert_eq!(page["records"], json!([{"id": 1}, {"id": 2}]));
        assert_eq!(page["isFirstPage"], true);
        assert_eq!(page["isLastPage"], true);
        assert_eq!(page["phase"], "idle");
        assert!(page.get("cursor").is_none());
        assert!(!message.to_string().contains("opaque-token"));
    }
}
