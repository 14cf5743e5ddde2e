use auto_translations::mt::{DriverRegistry, MtResult, TranslationEngine};
use auto_translations::{CatalogStore, Config, TranslationWorkflow};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("auto-translations")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Machine translation for JSON language files")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(clap::value_parser!(PathBuf))
                .help("Configuration file (default: ./auto-translations.toml)"),
        )
        .subcommand(
            Command::new("scan")
                .about("Collect the source language strings into texts_to_translate.json")
                .arg(
                    Arg::new("lang")
                        .long("lang")
                        .short('l')
                        .help("Language to scan (default: source_language from config)"),
                ),
        )
        .subcommand(
            Command::new("translate")
                .about("Translate the scanned strings into a target language")
                .arg(
                    Arg::new("target")
                        .help("Target language code (e.g., fr, es, pt-BR)")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("source-lang")
                        .long("source-lang")
                        .short('s')
                        .help("Source language code (default: source_language from config)"),
                )
                .arg(
                    Arg::new("driver")
                        .long("driver")
                        .short('d')
                        .help("Translation driver (default: default_driver from config)"),
                )
                .arg(
                    Arg::new("overwrite")
                        .long("overwrite")
                        .help("Re-translate keys that already have a translation")
                        .action(ArgAction::SetTrue),
                ),
        )
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("auto_translations=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = cli().get_matches();

    // Failures are reported, not turned into a non-zero exit
    if let Err(e) = run(&matches).await {
        error!(error = %e, "Command failed");
        eprintln!("❌ {}", e);
    }

    Ok(())
}

async fn run(matches: &ArgMatches) -> MtResult<()> {
    let config = Config::discover(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))?;

    let engine = TranslationEngine::new(DriverRegistry::builtin(), config.drivers.clone())
        .with_options(config.engine_options());
    let workflow = TranslationWorkflow::new(engine, CatalogStore::new(&config.lang_path));

    match matches.subcommand() {
        Some(("scan", sub)) => {
            let lang = sub
                .get_one::<String>("lang")
                .unwrap_or(&config.source_language);
            let count = workflow.scan_language_files(lang)?;
            println!(
                "✅ Scanned {} strings into {}",
                count,
                workflow.store().pending_path().display()
            );
        }
        Some(("translate", sub)) => {
            let target = sub
                .get_one::<String>("target")
                .map(String::as_str)
                .unwrap_or_default();
            let source = sub
                .get_one::<String>("source-lang")
                .unwrap_or(&config.source_language);
            let driver = sub
                .get_one::<String>("driver")
                .unwrap_or(&config.default_driver);
            let overwrite = sub.get_flag("overwrite");

            let report = workflow.translate(source, target, driver, overwrite).await?;
            for warning in &report.warnings {
                println!("⚠️  {}", warning);
            }
            println!(
                "✅ Translated {} strings from {} to {} with {}",
                report.translated, source, target, driver
            );
        }
        _ => unreachable!("clap requires a subcommand"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        cli().debug_assert();
    }

    #[test]
    fn test_translate_arguments() {
        let matches = cli()
            .try_get_matches_from([
                "auto-translations",
                "--config",
                "custom.toml",
                "translate",
                "fr",
                "--driver",
                "mock",
                "--overwrite",
            ])
            .unwrap();

        assert_eq!(
            matches.get_one::<PathBuf>("config"),
            Some(&PathBuf::from("custom.toml"))
        );
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "translate");
        assert_eq!(sub.get_one::<String>("target").unwrap(), "fr");
        assert_eq!(sub.get_one::<String>("driver").unwrap(), "mock");
        assert!(sub.get_flag("overwrite"));
        assert!(sub.get_one::<String>("source-lang").is_none());
    }

    #[test]
    fn test_translate_requires_target() {
        assert!(
            cli()
                .try_get_matches_from(["auto-translations", "translate"])
                .is_err()
        );
    }
}
