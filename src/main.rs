use clap::Parser;
use tabular_import::adapters::input::read_records;
use tabular_import::config::Command;
use tabular_import::core::ConfigProvider;
use tabular_import::utils::error::ErrorSeverity;
use tabular_import::utils::{logger, validation::Validate};
use tabular_import::{CliConfig, ImportError, Importer, SqliteStore, TableRegistry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    // 初始化日誌
    if cli.json_logging(&config) {
        logger::init_json_logger(cli.verbose_logging(&config));
    } else {
        logger::init_cli_logger(cli.verbose_logging(&config));
    }

    tracing::info!("Starting tabular-import CLI");
    tracing::debug!("Resolved config: {:?}", config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let store = match SqliteStore::connect(&config.database).await {
        Ok(store) => store,
        Err(e) => exit_with(e),
    };

    let code = match run(cli.command, store.clone(), config).await {
        Ok(code) => code,
        Err(e) => {
            store.close().await;
            exit_with(e)
        }
    };

    store.close().await;
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

async fn run(
    command: Command,
    store: SqliteStore,
    config: tabular_import::ImportConfig,
) -> tabular_import::Result<i32> {
    let registry = TableRegistry::with_read_limit(store.clone(), config.default_read_limit());

    match command {
        Command::Import { table, file, .. } => {
            let records = read_records(&file)?;
            let importer = Importer::new(store, config);
            let outcome = importer.import(&table, &records).await;

            println!("{}", serde_json::to_string_pretty(&outcome)?);
            if outcome.success {
                tracing::info!("✅ Import finished");
                Ok(0)
            } else {
                Ok(1)
            }
        }
        Command::List => {
            let tables = registry.list_tables().await?;
            println!("{}", serde_json::to_string_pretty(&tables)?);
            Ok(0)
        }
        Command::Read { name, limit } => {
            let data = registry.read_table(&name, limit).await?;
            println!("{}", serde_json::to_string_pretty(&data)?);
            Ok(0)
        }
        Command::Delete { name } => {
            registry.delete_table(&name).await?;
            println!("{}", serde_json::json!({ "success": true, "table": name }));
            Ok(0)
        }
    }
}

fn exit_with(e: ImportError) -> ! {
    tracing::error!(
        "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 4,      // 找不到資料表
        ErrorSeverity::Medium => 2,   // 可重試
        ErrorSeverity::High => 1,     // 輸入或配置錯誤
        ErrorSeverity::Critical => 3, // 系統錯誤
    };
    std::process::exit(exit_code);
}
