use anyhow::Context;
use clap::Parser;
use tlg_convert::utils::{logger, validation::Validate};
use tlg_convert::{start_server, CliArgs, ConversionService};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // 初始化日誌
    if args.json_logs {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_server_logger(args.verbose);
    }

    tracing::info!("🚀 Starting tlg-convert");

    let config = match args.load_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Failed to load configuration: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };
    if args.verbose {
        tracing::debug!("Effective config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let service = ConversionService::from_config(&config)
        .await
        .with_context(|| format!("preparing temp dir {}", config.temp_dir.display()))?;

    tracing::info!(
        converter = %config.converter_program,
        args = ?config.converter_args,
        timeout_secs = config.converter_timeout_secs,
        temp_dir = %config.temp_dir.display(),
        "🔧 Converter configured"
    );

    let (server, addr) = start_server(&config, service)
        .with_context(|| format!("binding {}:{}", config.host, config.port))?;
    tracing::info!("📡 Listening on http://{}", addr);

    server.await.context("HTTP server stopped with an error")?;
    tracing::info!("👋 Shut down");
    Ok(())
}
