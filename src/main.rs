// ==========================================
// 人事取込バックエンド - 命令行入口
// ==========================================
// 用法:
//   hr-import migrate
//   hr-import import employees <file>
//   hr-import import timer-cards <file> <factory_id> <year> <month>
//   hr-import import factories <dir>
//   hr-import template <employees|timer-cards> [output.csv]
//   hr-import health
// 结果以 JSON 输出到 stdout，日志输出到 stderr
// ==========================================

use anyhow::{bail, Context, Result};
use hr_import::api::{HealthApi, ImportApi};
use hr_import::config::AppConfig;
use hr_import::domain::types::EntityKind;
use hr_import::{db, logging};
use serde::Serialize;
use std::path::{Path, PathBuf};

const USAGE: &str = "usage:
  hr-import migrate
  hr-import import employees <file>
  hr-import import timer-cards <file> <factory_id> <year> <month>
  hr-import import factories <dir>
  hr-import template <employees|timer-cards> [output.csv]
  hr-import health";

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn arg<'a>(args: &'a [String], idx: usize, name: &str) -> Result<&'a str> {
    args.get(idx)
        .map(String::as_str)
        .with_context(|| format!("missing argument <{}>\n{}", name, USAGE))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = args.first().map(String::as_str).unwrap_or("help");
    if matches!(command, "help" | "-h" | "--help") {
        println!("{}", USAGE);
        return Ok(());
    }

    let config = AppConfig::from_env().context("failed to load configuration")?;
    logging::init(config.log_format);

    tracing::info!("==================================================");
    tracing::info!("{} v{}", hr_import::APP_NAME, hr_import::VERSION);
    tracing::info!("==================================================");

    match command {
        "migrate" => {
            let conn = db::open_sqlite_connection_with_timeout(
                &config.database.path,
                config.database.busy_timeout_ms,
            )?;
            let applied = db::migrate(&conn)?;
            print_json(&serde_json::json!({
                "applied": applied,
                "schema_version": db::read_schema_version(&conn)?,
            }))
        }
        "import" => {
            let api = ImportApi::new(&config)?;
            match arg(&args, 1, "employees|timer-cards|factories")? {
                "employees" => {
                    let file = PathBuf::from(arg(&args, 2, "file")?);
                    print_json(&api.import_employees(&file).await?)
                }
                "timer-cards" => {
                    let file = PathBuf::from(arg(&args, 2, "file")?);
                    let factory_id = arg(&args, 3, "factory_id")?;
                    let year: i32 = arg(&args, 4, "year")?
                        .parse()
                        .context("year must be a number")?;
                    let month: u32 = arg(&args, 5, "month")?
                        .parse()
                        .context("month must be a number")?;
                    print_json(&api.import_timer_cards(&file, factory_id, year, month).await?)
                }
                "factories" => {
                    let dir = arg(&args, 2, "dir")?;
                    print_json(&api.import_factory_configs(Path::new(dir)).await?)
                }
                other => bail!("unknown import target: {}\n{}", other, USAGE),
            }
        }
        "template" => {
            let kind: EntityKind = arg(&args, 1, "employees|timer-cards")?
                .parse()
                .map_err(anyhow::Error::msg)?;
            let api = ImportApi::new(&config)?;
            match args.get(2) {
                Some(output) => {
                    api.write_template(kind, Path::new(output))?;
                    print_json(&serde_json::json!({ "written": output }))
                }
                None => print_json(&api.template(kind)),
            }
        }
        "health" => {
            let api = ImportApi::new(&config)?;
            let status = HealthApi::new(api.connection()).check();
            print_json(&status)?;
            if !status.is_healthy() {
                std::process::exit(1);
            }
            Ok(())
        }
        other => bail!("unknown command: {}\n{}", other, USAGE),
    }
}
