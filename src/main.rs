use clap::Parser;
use defensive_kit::config::{Command, SanitizeTarget};
use defensive_kit::core::{contracts, failsafe, limits, privilege, profile, recovery, sanitize};
use defensive_kit::domain::model::{Coordinates, Inventory, Product, StoredUser};
use defensive_kit::domain::ports::UserRepository;
use defensive_kit::utils::error::error_chain;
use defensive_kit::utils::logger;
use defensive_kit::utils::monitor::ResourceMonitor;
use defensive_kit::utils::validation::Validate;
use defensive_kit::{
    CliConfig, GuardError, LocalStorage, RuntimeSettings, SafeApiClient, ScraperConfig,
    SqliteUserStore, TitleScraper, WebServerConfig,
};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    match &config.log_file {
        Some(path) => logger::init_file_logger(path, tracing::Level::INFO)?,
        None if config.json_logs => logger::init_json_logger(),
        None => logger::init_cli_logger(config.verbose),
    }

    tracing::info!("Starting defensive-kit CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = run(&config).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        for cause in error_chain(&e).iter().skip(1) {
            tracing::error!("   caused by: {}", cause);
        }
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        std::process::exit(e.exit_code());
    }

    Ok(())
}

async fn run(config: &CliConfig) -> Result<(), GuardError> {
    match &config.command {
        Command::Validate { profile: path } => {
            let content = std::fs::read_to_string(path)?;
            let user_profile = profile::parse_profile(&content)?;
            user_profile.validate()?;
            println!("✅ User profile is valid. Proceeding with account creation.");
        }
        Command::Settings { path } => {
            let settings = RuntimeSettings::load_or_default(path);
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        Command::Fetch { url, timeout } => {
            defensive_kit::utils::validation::validate_url("url", url)?;
            let client = SafeApiClient::new(Duration::from_secs(*timeout))?;
            let value = client.safe_api_call(url).await;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        Command::Scrape {
            urls,
            workers,
            timeout,
            output,
        } => scrape(config, urls, *workers, *timeout, output).await?,
        Command::Run {
            command_line,
            timeout,
        } => match limits::run_with_timeout(command_line, Duration::from_secs(*timeout)).await? {
            limits::CommandOutcome::Completed { status, stdout } => {
                print!("{}", stdout);
                if !status.success() {
                    return Err(GuardError::CommandFailed {
                        command: command_line.clone(),
                        stderr: format!("exited with {}", status),
                    });
                }
            }
            limits::CommandOutcome::TimedOut => println!("Command timed out"),
        },
        Command::Sanitize { target } => match target {
            SanitizeTarget::Html { text } => println!("{}", sanitize::escape_html(text)),
            SanitizeTarget::Path { base, user_path } => {
                let safe_path = sanitize::resolve_within(base, user_path)?;
                println!("{}", safe_path.display());
            }
        },
        Command::Keygen { bytes } => {
            defensive_kit::utils::validation::validate_range("bytes", *bytes, 8, 128)?;
            println!("{}", sanitize::generate_api_key(*bytes));
        }
        Command::Tour => tour().await?,
    }
    Ok(())
}

async fn scrape(
    config: &CliConfig,
    urls: &[String],
    workers: usize,
    timeout: u64,
    output: &std::path::Path,
) -> Result<(), GuardError> {
    let mut parsed = Vec::with_capacity(urls.len());
    for url in urls {
        defensive_kit::utils::validation::validate_url("urls", url)?;
        parsed.push(Url::parse(url).map_err(|e| GuardError::invalid("urls", url, e.to_string()))?);
    }
    let urls: Arc<[Url]> = parsed.into();

    let monitor = ResourceMonitor::new(config.monitor);
    if monitor.is_enabled() {
        tracing::info!("🔍 System monitoring enabled");
    }
    monitor.log_phase("Before scrape");

    let scraper = TitleScraper::new(ScraperConfig {
        max_workers: workers,
        request_timeout: Duration::from_secs(timeout),
    })?;
    let report = scraper.scrape(urls).await;
    monitor.log_phase("After scrape");

    for page in &report.pages {
        println!("{}: {}", page.url, page.outcome);
    }

    let storage = LocalStorage::new(output);
    let saved = defensive_kit::core::titles::save_titles(
        &storage,
        &report,
        defensive_kit::core::titles::DEFAULT_TITLES_FILE,
    )
    .await?;

    println!(
        "📁 Saved {} title(s) to {} ({} failed) in {:.2} seconds.",
        saved,
        output.join(defensive_kit::core::titles::DEFAULT_TITLES_FILE).display(),
        report.failures(),
        report.elapsed.as_secs_f64()
    );
    Ok(())
}

/// 以內建的範例資料逐一示範各項技巧
async fn tour() -> Result<(), GuardError> {
    println!("== Input validation ==");
    for raw in ["42", "-7", "abc"] {
        match profile::process_positive_integer(raw) {
            Ok(n) => println!("  {:>4} -> accepted {}", raw, n),
            Err(e) => println!("  {:>4} -> {}", raw, e),
        }
    }
    let basic = serde_json::json!({"username": "john_doe", "age": 25, "email": "john.doe@example.com"});
    println!("  basic profile: {:?}", profile::validate_basic_profile(&basic).is_ok());

    println!("== Fail-safe defaults ==");
    println!("  10 / 2 = {}", failsafe::safe_division(10.0, Some(2.0)));
    println!("  10 / 0 = {}", failsafe::safe_division(10.0, Some(0.0)));
    let settings = RuntimeSettings::load_or_default("path/to/nonexistent/config.json");
    println!("  settings: {:?}", settings);
    let store = SqliteUserStore::open_in_memory()?;
    store.create_schema()?;
    let fallback = StoredUser {
        id: "0".to_string(),
        name: "Unknown".to_string(),
        email: "no-reply@example.com".to_string(),
    };
    let user = defensive_kit::core::user_store::get_user_or_default(&store, "123", fallback);
    println!("  user lookup: {:?}", user);
    println!("  hostile id lookup: {:?}", store.find_user("123' OR '1'='1")?);

    println!("== Error handling ==");
    println!("  1 / 0 -> {:?}", recovery::divide(1.0, 0.0).map_err(|e| e.to_string()));
    for server in ["server_unreachable", "connection_timeout", "primary"] {
        println!("  {}", recovery::describe_connection_attempt(server));
    }
    if let Err(e) = recovery::configure_system("/forbidden") {
        println!("  {}", error_chain(&e).join(" <- caused by: "));
    }

    println!("== Assertions ==");
    println!("  sqrt(4) = {:?}", contracts::square_root(4.0).ok());
    println!("  median([5,3,1]) -> {:?}", contracts::median(&[5.0, 3.0, 1.0]).map_err(|e| e.to_string()));
    let mut account = contracts::BankAccount::new(100.0)?;
    account.deposit(50.0)?;
    account.withdraw(20.0)?;
    let overdraw = account.withdraw(200.0);
    println!("  balance {} (overdraw rejected: {})", account.balance(), overdraw.is_err());

    println!("== Least privilege ==");
    println!("  upload processed: {}", privilege::process_upload("Sensitive information here.")?);
    println!("  dropped privileges: {}", privilege::drop_privileges(privilege::UNPRIVILEGED_UID)?);

    println!("== Immutability ==");
    let origin = Coordinates(10, 20);
    println!("  {:?} -> {:?} (original kept)", origin, origin.translated(5, 0));
    let inventory: Inventory = ["apple", "banana", "orange"].into_iter().collect();
    let extended = inventory.with_item("pear");
    println!("  inventory {} items, extended {} items", inventory.len(), extended.len());
    let laptop = Product::new(1, "Laptop", 999.99);
    println!("  {:?} / repriced {:?}", laptop, laptop.with_price(1099.99));
    let server = WebServerConfig::new(443, true, "/var/www/html")?;
    let moved = server.with_port(8080)?;
    println!("  server port {} (new value on {})", server.port(), moved.port());

    println!("== Sanitization ==");
    println!("  {}", sanitize::escape_html("<script>alert('XSS Attack!');</script>"));
    let safe_dir = tempfile::TempDir::new()?;
    for requested in ["reports/q1.txt", "../../etc/passwd"] {
        match sanitize::resolve_within(safe_dir.path(), requested) {
            Ok(path) => println!("  {} -> resolved {}", requested, path.display()),
            Err(e) => println!("  {} -> {}", requested, e),
        }
    }
    let key = sanitize::generate_api_key(sanitize::DEFAULT_API_KEY_BYTES);
    println!("  api key matches itself: {}", sanitize::constant_time_eq(&key, &key));

    println!("== Timeouts and limits ==");
    match limits::run_with_timeout("sleep 10", Duration::from_millis(500)).await {
        Ok(outcome) => println!("  sleep 10 -> {:?}", outcome),
        Err(e) => println!("  sleep 10 -> {}", e),
    }

    Ok(())
}
