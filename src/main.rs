// ==========================================
// 航空器残值台账 - 命令行入口
// ==========================================
// 用法:
//   aircraft-rv-ledger process <file>
//   aircraft-rv-ledger anchor <file> <caller>
//   aircraft-rv-ledger fetch <record_id>
//   aircraft-rv-ledger verify
//   aircraft-rv-ledger fleet <file>...
//   aircraft-rv-ledger grant-admin <address>
//   aircraft-rv-ledger set-params <MODEL_KEY> <json>
//   aircraft-rv-ledger set-markers <marker>...
// 数据目录: $AIRCRAFT_RV_LEDGER_HOME 或 {data_dir}/aircraft-rv-ledger
// ==========================================

use anyhow::{anyhow, bail, Context};
use aircraft_rv_ledger::app::{get_default_home_dir, AppState};
use aircraft_rv_ledger::domain::{AssetTypeKey, AssetTypeParameters};
use aircraft_rv_ledger::exporter::{fleet_summary_text, to_delimited_text};
use aircraft_rv_ledger::importer::UniversalLogReader;
use aircraft_rv_ledger::{logging, APP_NAME, VERSION};
use std::path::Path;

const USAGE: &str = "用法: aircraft-rv-ledger <process|anchor|fetch|verify|fleet|grant-admin|set-params|set-markers> [参数...]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (command, rest) = match args.split_first() {
        Some((command, rest)) => (command.as_str(), rest),
        None => bail!("{}", USAGE),
    };

    let home_dir = get_default_home_dir();
    tracing::info!("{} v{}，数据目录: {}", APP_NAME, VERSION, home_dir.display());
    let state = AppState::new(&home_dir).map_err(|e| anyhow!(e))?;
    let api = &state.valuation_api;

    match (command, rest) {
        ("process", [file]) => {
            let processed = api.process_file(file).await?;
            for warning in &processed.warnings {
                tracing::warn!("{}", warning);
            }
            print!("{}", processed.artifact);
        }
        ("anchor", [file, caller]) => {
            let receipt = api.anchor_file(caller, file).await?;
            println!("{}", serde_json::to_string_pretty(&receipt)?);
        }
        ("fetch", [record_id]) => {
            let record_id: i64 = record_id
                .parse()
                .with_context(|| format!("记录 ID 必须为整数: {}", record_id))?;
            let fetched = api.fetch_valuation(record_id).await?;
            print!("{}", to_delimited_text(&fetched.records)?);
        }
        ("verify", []) => {
            let rows = api.verify_index()?;
            println!("索引校验通过，共 {} 条记录", rows);
        }
        ("fleet", files) if !files.is_empty() => {
            let mut logs = Vec::with_capacity(files.len());
            for file in files {
                let raw_text = UniversalLogReader.read(file)?;
                let label = Path::new(file)
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| file.clone());
                logs.push((label, raw_text));
            }

            let valuations = api.value_fleet_logs(logs).await?;
            print!("{}", fleet_summary_text(&valuations)?);
        }
        ("grant-admin", [address]) => {
            api.grant_admin(address)?;
            println!("已授予管理员权限: {}", address);
        }
        ("set-params", [key, json]) => {
            let model_key = AssetTypeKey::from_key(key)
                .ok_or_else(|| anyhow!("未知机型键: {}", key))?;
            let params: AssetTypeParameters =
                serde_json::from_str(json).context("机型参数 JSON 解析失败")?;
            state.config_manager.set_asset_parameters(model_key, &params)?;
            println!("已覆写机型参数: {}", model_key);
        }
        ("set-markers", markers) if !markers.is_empty() => {
            state.config_manager.set_major_check_markers(markers)?;
            println!("已更新大修检标记: {}", markers.join(", "));
        }
        _ => bail!("{}", USAGE),
    }

    Ok(())
}
