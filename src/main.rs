use clap::Parser;
use zonescout::core::ScoutReport;
use zonescout::utils::error::ErrorSeverity;
use zonescout::utils::{logger, validation::Validate};
use zonescout::{
    ApiKeys, CliConfig, LocalStorage, ScoutConfig, ScoutEngine, ScoutError, ScoutPipeline,
    ScoutServices,
};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting zonescout CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    match run(&cli).await {
        Ok(()) => {}
        Err(e) => {
            tracing::error!(
                "❌ Scouting failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            // 依錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }
}

async fn run(cli: &CliConfig) -> Result<(), ScoutError> {
    let mut config = ScoutConfig::load(cli.config.as_deref())?;
    cli.apply_to(&mut config);

    // 驗證配置
    config.validate()?;

    let keys = ApiKeys::from_env();
    tracing::debug!("API keys: {:?}", keys);

    if cli.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let services = ScoutServices::from_config(&config, &keys)?;
    let request = cli.scout_request(&config).await?;
    tracing::info!(
        "🔎 Searching for '{}' in zone from {}",
        request.query,
        request.zone.describe()
    );

    let storage = LocalStorage::new(config.output.output_path.clone());
    let pipeline = ScoutPipeline::new(storage, config, services, request);
    let engine = ScoutEngine::new_with_monitoring(pipeline, cli.monitor);

    let outcome = engine.run().await?;
    print_summary(&outcome.report);

    tracing::info!("✅ Scouting completed successfully!");
    println!("📁 Report saved to: {}", outcome.output_path);
    Ok(())
}

fn print_summary(report: &ScoutReport) {
    println!();
    println!("🎉 Found {} qualified leads!", report.approved.len());
    println!(
        "   {} rejected, {} could not be audited",
        report.rejected.len(),
        report.errored.len()
    );

    for lead in &report.approved {
        let place = &lead.place;
        println!();
        println!("✅ {} (⭐ {})", place.name(), place.rating_label());
        println!("   📍 {}", place.address());
        println!("   📞 {}", place.phone());
        if let Some(website) = &place.website_uri {
            println!("   🌐 {}", website);
        }
        println!(
            "   {} {}: {}",
            lead.social.platform.icon(),
            lead.social.platform.as_str(),
            lead.social.url
        );
        println!("   💡 {}", lead.verdict.reason);
    }

    if !report.rejected.is_empty() {
        println!();
        println!("❌ Rejected:");
        for lead in &report.rejected {
            println!("   {}: {}", lead.name(), lead.verdict.reason);
        }
    }
    println!();
}
