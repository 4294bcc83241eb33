use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use smart_finder::{
    ChromeDriver, Config, ElementResolver, FinderError, RetrySettings, WebDriverTrait,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn locator_arg() -> Arg {
    Arg::new("locator")
        .required(true)
        .help("XPath, CSS selector or visible text of the element")
}

fn cli() -> Command {
    Command::new("smart-finder")
        .about("Resolve a locator on a live page with retries and fallback strategies")
        .arg(
            Arg::new("url")
                .long("url")
                .required(true)
                .help("Page to open before resolving"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .help("JSON config file"),
        )
        .arg(
            Arg::new("attempts")
                .long("attempts")
                .value_parser(value_parser!(u32))
                .help("Maximum attempts per operation"),
        )
        .arg(
            Arg::new("delay")
                .long("delay")
                .value_parser(value_parser!(u64))
                .help("Seconds to wait between attempts"),
        )
        .arg(
            Arg::new("timeout-ms")
                .long("timeout-ms")
                .value_parser(value_parser!(u64))
                .help("Polling timeout per strategy"),
        )
        .arg(
            Arg::new("headed")
                .long("headed")
                .action(ArgAction::SetTrue)
                .help("Show the browser window"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .help("Print metrics as JSON"),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("find")
                .about("Resolve the element")
                .arg(locator_arg()),
        )
        .subcommand(
            Command::new("click")
                .about("Resolve and click")
                .arg(locator_arg()),
        )
        .subcommand(
            Command::new("type")
                .about("Resolve, clear and type text")
                .arg(locator_arg())
                .arg(Arg::new("text").required(true)),
        )
        .subcommand(
            Command::new("text")
                .about("Resolve and print the element text")
                .arg(locator_arg()),
        )
        .subcommand(
            Command::new("exists")
                .about("Report whether the element can be resolved")
                .arg(locator_arg()),
        )
        .subcommand(
            Command::new("wait")
                .about("Wait for the element without counting a find")
                .arg(locator_arg()),
        )
}

fn load_config(matches: &ArgMatches) -> smart_finder::Result<Config> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    if let Some(attempts) = matches.get_one::<u32>("attempts") {
        config.retry.max_attempts = *attempts;
    }
    if let Some(delay) = matches.get_one::<u64>("delay") {
        config.retry.delay_secs = *delay;
    }
    if let Some(timeout) = matches.get_one::<u64>("timeout-ms") {
        config.finder.strategy_timeout_ms = *timeout;
    }
    if matches.get_flag("headed") {
        config.browser.headless = false;
    }

    config.validate()?;
    Ok(config)
}

async fn run_command(
    resolver: &ElementResolver<'_, ChromeDriver>,
    matches: &ArgMatches,
    settings: RetrySettings,
) -> smart_finder::Result<()> {
    let (name, sub) = matches
        .subcommand()
        .ok_or_else(|| FinderError::Configuration("missing command".to_string()))?;
    let locator = sub
        .get_one::<String>("locator")
        .ok_or_else(|| FinderError::Configuration("missing locator".to_string()))?;

    match name {
        "find" => {
            let resolution = resolver.resolve(locator, settings).await?;
            info!(
                "Resolved '{}' with {} after {} attempt(s)",
                locator, resolution.strategy, resolution.outcome.attempts_made
            );
        }
        "click" => resolver.find_and_click_with(locator, settings).await?,
        "type" => {
            let text = sub
                .get_one::<String>("text")
                .ok_or_else(|| FinderError::Configuration("missing text".to_string()))?;
            resolver
                .find_and_send_keys_with(locator, text, settings)
                .await?
        }
        "text" => {
            let text = resolver.find_and_get_text_with(locator, settings).await?;
            println!("{}", text);
        }
        "exists" => {
            let exists = resolver.element_exists_with(locator, settings).await?;
            println!("{}", exists);
        }
        "wait" => {
            resolver.wait_for_element_with(locator, settings).await?;
            info!("'{}' is present", locator);
        }
        other => {
            return Err(FinderError::Configuration(format!(
                "unknown command: {}",
                other
            )))
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let matches = cli().get_matches();
    let config = load_config(&matches)?;
    let url = matches
        .get_one::<String>("url")
        .ok_or_else(|| anyhow::anyhow!("--url is required"))?;

    let driver = ChromeDriver::launch(&config.browser)?;
    driver.open(url).await?;
    info!(
        "Opened {} ({})",
        driver.current_url(),
        driver.title().unwrap_or_default()
    );

    let resolver = ElementResolver::builder(&driver).config(&config).build();
    let result = run_command(&resolver, &matches, config.retry.settings()).await;

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&resolver.all_metrics())?);
    } else {
        resolver.print_all_metrics();
    }

    if let Err(ref err) = result {
        warn!("Operation failed: {}", err);
    }
    Ok(result?)
}
