use anyhow::Context;
use colored::Colorize;
use serde_json::{json, Value};
use tracing::debug;
use vaxl_ledger::{
    Contract, DoseContract, Gateway, Receipt, SubjectContract, DOSE_CONTRACT, SUBJECT_CONTRACT,
};
use vaxl_store::FileWorldState;

use crate::cli::*;
use crate::config::CliConfig;

/// Transaction flow an invocation goes through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Submit,
    Evaluate,
}

impl Mode {
    fn verb(self) -> &'static str {
        match self {
            Mode::Submit => "Submit",
            Mode::Evaluate => "Evaluate",
        }
    }
}

pub fn run_command(cli: Cli, config: CliConfig) -> anyhow::Result<()> {
    let gateway = open_gateway(&config)?;
    let format = cli.format;
    match cli.command {
        Command::Init => cmd_init(&gateway, format),
        Command::Submit(args) => cmd_invoke(&gateway, format, Mode::Submit, args),
        Command::Evaluate(args) => cmd_invoke(&gateway, format, Mode::Evaluate, args),
        Command::Functions(args) => cmd_functions(&gateway, format, args),
        Command::Demo => cmd_demo(&gateway, format),
    }
}

/// Register both contracts, each over its own file in `state_dir`.
pub fn open_gateway(config: &CliConfig) -> anyhow::Result<Gateway<FileWorldState>> {
    std::fs::create_dir_all(&config.state_dir)
        .with_context(|| format!("creating state dir {}", config.state_dir.display()))?;
    let open = |contract: &str| -> anyhow::Result<FileWorldState> {
        let path = config.state_file(contract);
        debug!(contract, path = %path.display(), "opening world state");
        let store = FileWorldState::open(&path)
            .with_context(|| format!("opening world state {}", path.display()))?;
        Ok(store.with_rich_query(config.rich_query))
    };
    Ok(Gateway::new()
        .with_contract(SubjectContract::new(), open(SUBJECT_CONTRACT)?)
        .with_contract(DoseContract::new(), open(DOSE_CONTRACT)?))
}

/// Map client-facing aliases onto registered contract names.
pub fn contract_name(name: &str) -> &str {
    match name {
        "user" => SUBJECT_CONTRACT,
        "vaccine" => DOSE_CONTRACT,
        other => other,
    }
}

pub fn invoke(
    gateway: &Gateway<FileWorldState>,
    mode: Mode,
    contract: &str,
    function: &str,
    args: &[String],
) -> anyhow::Result<Receipt> {
    let contract = contract_name(contract);
    let receipt = match mode {
        Mode::Submit => gateway.submit(contract, function, args),
        Mode::Evaluate => gateway.evaluate(contract, function, args),
    };
    receipt.with_context(|| format!("{} {contract}.{function}", mode.verb().to_lowercase()))
}

fn cmd_init(gateway: &Gateway<FileWorldState>, format: OutputFormat) -> anyhow::Result<()> {
    for contract in [DOSE_CONTRACT, SUBJECT_CONTRACT] {
        let receipt = invoke(gateway, Mode::Submit, contract, "InitLedger", &[])?;
        report(format, Mode::Submit, contract, "InitLedger", &receipt);
    }
    Ok(())
}

fn cmd_invoke(
    gateway: &Gateway<FileWorldState>,
    format: OutputFormat,
    mode: Mode,
    args: InvokeArgs,
) -> anyhow::Result<()> {
    let receipt = invoke(gateway, mode, &args.contract, &args.function, &args.args)?;
    report(format, mode, contract_name(&args.contract), &args.function, &receipt);
    Ok(())
}

fn cmd_functions(
    gateway: &Gateway<FileWorldState>,
    format: OutputFormat,
    args: FunctionsArgs,
) -> anyhow::Result<()> {
    let names: Vec<&str> = match &args.contract {
        Some(name) => vec![gateway.contract(contract_name(name))?.name()],
        None => gateway.contracts().collect(),
    };
    let mut listing = serde_json::Map::new();
    for name in names {
        let contract: &dyn Contract = gateway.contract(name)?;
        match format {
            OutputFormat::Json => {
                let functions: Vec<Value> = contract
                    .functions()
                    .iter()
                    .map(|f| json!({ "name": f.name, "params": f.params }))
                    .collect();
                listing.insert(name.to_string(), Value::Array(functions));
            }
            OutputFormat::Text => {
                println!("{}", name.bold());
                for f in contract.functions() {
                    println!("  {}({})", f.name.cyan(), f.params.join(", "));
                }
            }
        }
    }
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&Value::Object(listing))?);
    }
    Ok(())
}

/// Seed, list, create, read, rename and list again.
pub const DEMO_STEPS: &[(Mode, &str, &str, &[&str])] = &[
    (Mode::Submit, DOSE_CONTRACT, "InitLedger", &[]),
    (Mode::Submit, SUBJECT_CONTRACT, "InitLedger", &[]),
    (Mode::Evaluate, DOSE_CONTRACT, "FindAll", &[]),
    (Mode::Submit, DOSE_CONTRACT, "Create", &["20-1-sch1", "20", "soberana-2", "1", "sch1"]),
    (Mode::Evaluate, DOSE_CONTRACT, "FindOne", &["20-1-sch1"]),
    (Mode::Submit, DOSE_CONTRACT, "Update", &["20-1-sch1", "phizer", "1", "sch1"]),
    (Mode::Evaluate, DOSE_CONTRACT, "FindOne", &["20-1-sch1"]),
    (Mode::Evaluate, DOSE_CONTRACT, "FindAll", &[]),
];

fn cmd_demo(gateway: &Gateway<FileWorldState>, format: OutputFormat) -> anyhow::Result<()> {
    for (mode, contract, function, args) in DEMO_STEPS {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        if format == OutputFormat::Text {
            println!(
                "\n{} {} {}.{}({})",
                "-->".dimmed(),
                mode.verb().bold(),
                contract,
                function.cyan(),
                args.join(", ")
            );
        }
        let receipt = invoke(gateway, *mode, contract, function, &args)?;
        report(format, *mode, contract, function, &receipt);
    }
    Ok(())
}

fn report(format: OutputFormat, mode: Mode, contract: &str, function: &str, receipt: &Receipt) {
    match format {
        OutputFormat::Json => {
            let out = json!({
                "tx_id": receipt.tx_id.to_string(),
                "timestamp": receipt.timestamp.to_rfc3339(),
                "contract": contract,
                "function": function,
                "committed": mode == Mode::Submit,
                "writes": receipt.writes,
                "result": receipt.payload,
            });
            println!("{}", pretty(&out));
        }
        OutputFormat::Text => {
            let status = match mode {
                Mode::Submit => format!("committed ({} writes)", receipt.writes).green(),
                Mode::Evaluate => "evaluated".to_string().blue(),
            };
            println!(
                "{} {}.{} {} [tx {}]",
                "✓".green().bold(),
                contract,
                function,
                status,
                receipt.tx_id.short_id().yellow()
            );
            if let Some(payload) = &receipt.payload {
                println!("{}", pretty(payload));
            }
        }
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
