use basalt::chain::{Chain, LoadMode};
use basalt::error::LedgerError;
use basalt::store::ChainStore;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "basalt",
    version,
    about = "Append-only tamper-evident ledger of hash-chained blocks"
)]
struct Cli {
    /// Ledger file (default: ./ledger.json)
    #[arg(long, default_value = "ledger.json")]
    ledger: PathBuf,

    /// Reject ledger files whose block ids are not sequential from zero
    #[arg(long)]
    strict: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new ledger containing only the genesis block
    Init,
    /// Append a block carrying the given payload
    Append { payload: String },
    /// Print every block in the ledger
    Show,
    /// Re-derive every hash and report integrity violations
    Verify,
    /// Look up a block by id
    Find { id: u64 },
    /// Overwrite a block's payload without recomputing its hash
    Corrupt { id: u64, payload: String },
    /// Show ledger statistics
    Stats,
    /// Run a scripted end-to-end demonstration
    Demo,
}

fn main() {
    let cli = Cli::parse();
    let mode = if cli.strict {
        LoadMode::Strict
    } else {
        LoadMode::Permissive
    };

    let result = match cli.command {
        Commands::Init => cmd_init(&cli.ledger),
        Commands::Append { payload } => cmd_append(&cli.ledger, mode, &payload),
        Commands::Show => cmd_show(&cli.ledger, mode),
        Commands::Verify => cmd_verify(&cli.ledger, mode),
        Commands::Find { id } => cmd_find(&cli.ledger, mode, id),
        Commands::Corrupt { id, payload } => cmd_corrupt(&cli.ledger, mode, id, &payload),
        Commands::Stats => cmd_stats(&cli.ledger, mode),
        Commands::Demo => cmd_demo(&cli.ledger),
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn open_ledger(path: &Path, mode: LoadMode) -> Result<Chain, Box<dyn std::error::Error>> {
    match ChainStore::new(path).load(mode) {
        Ok(chain) => Ok(chain),
        Err(LedgerError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Err(format!(
            "no ledger at {} (run `basalt init` first)",
            path.display()
        )
        .into()),
        Err(e) => Err(e.into()),
    }
}

fn cmd_init(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let chain = Chain::new();
    ChainStore::new(path).save(&chain)?;
    println!(
        "Initialized ledger at {} with its genesis block",
        path.display()
    );
    Ok(())
}

fn cmd_append(path: &Path, mode: LoadMode, payload: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut chain = open_ledger(path, mode)?;
    let block = chain.append(payload);
    println!("[{}] block #{} appended", &block.hash[..8], block.id);
    ChainStore::new(path).save(&chain)?;
    Ok(())
}

fn cmd_show(path: &Path, mode: LoadMode) -> Result<(), Box<dyn std::error::Error>> {
    let chain = open_ledger(path, mode)?;
    println!("Ledger at {}: {} block(s)", path.display(), chain.len());
    for block in chain.blocks() {
        println!();
        println!("{}", block);
    }
    Ok(())
}

fn cmd_verify(path: &Path, mode: LoadMode) -> Result<(), Box<dyn std::error::Error>> {
    let chain = open_ledger(path, mode)?;
    let report = chain.verify();
    if report.is_valid() {
        println!(
            "Chain is VALID: all {} blocks correctly linked, no alterations detected.",
            chain.len()
        );
    } else {
        println!("CHAIN CORRUPTED: {} violation(s):", report.violations.len());
        for violation in &report.violations {
            println!("  {}", violation);
        }
    }
    Ok(())
}

fn cmd_find(path: &Path, mode: LoadMode, id: u64) -> Result<(), Box<dyn std::error::Error>> {
    let chain = open_ledger(path, mode)?;
    match chain.find(id) {
        Some(block) => {
            println!("{}", block);
            Ok(())
        }
        None => Err(format!("no block with id {}", id).into()),
    }
}

fn cmd_corrupt(
    path: &Path,
    mode: LoadMode,
    id: u64,
    payload: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut chain = open_ledger(path, mode)?;
    let original = match chain.find(id) {
        Some(block) => block.payload.clone(),
        None => return Err(format!("no block with id {}", id).into()),
    };
    chain.corrupt(id, payload);
    println!("Tampered with block #{}:", id);
    println!("  old payload: {}", original);
    println!("  new payload: {}", payload);
    println!("  (stored hash left unchanged; `verify` will now flag this block)");
    ChainStore::new(path).save(&chain)?;
    Ok(())
}

fn cmd_stats(path: &Path, mode: LoadMode) -> Result<(), Box<dyn std::error::Error>> {
    let chain = open_ledger(path, mode)?;
    let tail = chain.latest();
    let payload_bytes: usize = chain.blocks().iter().map(|b| b.payload.len()).sum();
    println!("blocks:        {}", chain.len());
    println!("latest id:     {}", tail.id);
    println!("latest hash:   {}", tail.hash);
    println!("payload bytes: {}", payload_bytes);
    if let Ok(meta) = std::fs::metadata(path) {
        println!("file size:     {} bytes", meta.len());
    }
    Ok(())
}

fn cmd_demo(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    println!("[1] Creating a new chain with its genesis block");
    let mut chain = Chain::new();

    println!("\n[2] Appending sample blocks");
    let entries = [
        "Transfer #1: Alice -> Bob $100",
        "Transfer #2: Carol -> Dave $50",
        "Transfer #3: Bob -> Erin $75",
        "Event: new user registered, id 12345",
        "Log: system upgraded to version 2.0",
    ];
    for payload in entries {
        let block = chain.append(payload);
        println!("  [{}] block #{}", &block.hash[..8], block.id);
    }

    println!("\n[3] Full chain");
    for block in chain.blocks() {
        println!();
        println!("{}", block);
    }

    println!("\n[4] Verifying the untouched chain");
    let report = chain.verify();
    println!(
        "  valid: {} ({} violations)",
        report.is_valid(),
        report.violations.len()
    );

    println!("\n[5] Saving ledger to {}", path.display());
    ChainStore::new(path).save(&chain)?;

    println!("\n[6] Tampering with block #2");
    chain.corrupt(2, "FRAUDULENT: Mallory -> Mallory $999999");

    println!("\n[7] Verifying after the tamper");
    let report = chain.verify();
    println!("  valid: {}", report.is_valid());
    for violation in &report.violations {
        println!("  {}", violation);
    }

    println!("\n[8] The tampered block");
    if let Some(block) = chain.find(2) {
        println!("{}", block);
    }
    Ok(())
}
