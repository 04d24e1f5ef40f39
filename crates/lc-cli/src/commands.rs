use colored::Colorize;
use lc_chaincode::{Credit, CreditContract, HistoryEntry};
use lc_server::LcServer;
use lc_store::{CommitReceipt, FileLedger};
use tracing::debug;

use crate::cli::*;
use crate::config::LcConfig;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let mut config = LcConfig::load(cli.config.as_deref())?;
    if let Some(ledger) = cli.ledger {
        config.ledger_path = ledger;
    }
    let format = cli.format;

    match cli.command {
        Command::Register(args) => cmd_register(&open_contract(&config)?, args, format),
        Command::Read(args) => cmd_read(&open_contract(&config)?, args, format),
        Command::Transfer(args) => cmd_transfer(&open_contract(&config)?, args, format),
        Command::Verify(args) => {
            let receipt = open_contract(&config)?.verify_credit(&args.credit_id)?;
            print_receipt("Verified", &args.credit_id, &receipt, format)
        }
        Command::Execute(args) => {
            let receipt = open_contract(&config)?.execute_credit(&args.credit_id)?;
            print_receipt("Executed", &args.credit_id, &receipt, format)
        }
        Command::History(args) => cmd_history(&open_contract(&config)?, args, format),
        Command::Invoke(args) => cmd_invoke(&open_contract(&config)?, args),
        Command::Serve(args) => cmd_serve(config, args),
        Command::Config(_) => cmd_config(&config),
    }
}

fn open_contract(config: &LcConfig) -> anyhow::Result<CreditContract<FileLedger>> {
    debug!(path = %config.ledger_path.display(), "opening ledger");
    let ledger = FileLedger::open(&config.ledger_path, config.wal_config())?;
    Ok(CreditContract::new(ledger, config.lifecycle))
}

fn cmd_register(
    contract: &CreditContract<FileLedger>,
    args: RegisterArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let receipt = contract.register_credit(
        &args.credit_id,
        &args.owner,
        &args.flight_id,
        args.weight,
        args.price,
    )?;
    print_receipt("Registered", &args.credit_id, &receipt, format)
}

fn cmd_transfer(
    contract: &CreditContract<FileLedger>,
    args: TransferArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let receipt = contract.transfer_credit(&args.credit_id, &args.new_owner)?;
    print_receipt("Transferred", &args.credit_id, &receipt, format)?;
    if matches!(format, OutputFormat::Text) {
        println!("  Owner: {}", args.new_owner.bold());
    }
    Ok(())
}

fn cmd_read(
    contract: &CreditContract<FileLedger>,
    args: CreditArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let credit = contract.read_credit(&args.credit_id)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&credit)?),
        OutputFormat::Text => print_credit(&credit),
    }
    Ok(())
}

fn cmd_history(
    contract: &CreditContract<FileLedger>,
    args: CreditArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let history = contract.get_credit_history(&args.credit_id)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&history)?),
        OutputFormat::Text if history.is_empty() => {
            println!("No history for credit {}.", args.credit_id.yellow());
        }
        OutputFormat::Text => {
            for entry in &history {
                print_history_entry(entry);
            }
        }
    }
    Ok(())
}

fn cmd_invoke(contract: &CreditContract<FileLedger>, args: InvokeArgs) -> anyhow::Result<()> {
    let payload = contract.invoke(&args.function, &args.args)?;
    if payload.is_empty() {
        println!("{} {} submitted", "✓".green().bold(), args.function.bold());
    } else {
        println!("{}", String::from_utf8_lossy(&payload));
    }
    Ok(())
}

fn cmd_serve(mut config: LcConfig, args: ServeArgs) -> anyhow::Result<()> {
    if let Some(bind) = args.bind {
        config.server.bind_addr = bind;
    }
    let contract = open_contract(&config)?;
    println!(
        "LC gateway on {} (ledger: {})",
        config.server.bind_addr.to_string().bold(),
        config.ledger_path.display()
    );
    let server = LcServer::new(config.server, contract);
    tokio::runtime::Runtime::new()?.block_on(server.serve())?;
    Ok(())
}

fn cmd_config(config: &LcConfig) -> anyhow::Result<()> {
    print!("{}", config.to_toml()?);
    Ok(())
}

fn print_receipt(
    verb: &str,
    credit_id: &str,
    receipt: &CommitReceipt,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(receipt)?),
        OutputFormat::Text => {
            println!("{} {} credit {}", "✓".green().bold(), verb, credit_id.yellow());
            println!("  Tx: {}", receipt.tx_id.short_id().cyan());
            println!("  Committed: {}", receipt.timestamp);
        }
    }
    Ok(())
}

fn status_label(credit: &Credit) -> &'static str {
    credit.status.map(|s| s.as_str()).unwrap_or("-")
}

fn print_credit(credit: &Credit) {
    println!("Credit {}", credit.credit_id.yellow().bold());
    println!("  Owner:  {}", credit.owner);
    println!("  Flight: {}", credit.flight_id);
    println!("  Weight: {}", credit.weight);
    println!("  Price:  {}", credit.price);
    println!("  Status: {}", status_label(credit).green());
}

fn print_history_entry(entry: &HistoryEntry) {
    let status = if entry.is_delete {
        "deleted".red()
    } else {
        status_label(&entry.record).green()
    };
    println!(
        "{}  {}  {}  owner={}",
        entry.timestamp.to_rfc3339().dimmed(),
        entry.tx_id.short_id().cyan(),
        status,
        entry.record.owner
    );
}
