use crate::display;
use anyhow::{Context, Result, bail};
use std::time::Duration;
use weave_config::Config;
use weave_core::utils::{bytes_to_hex, hex_to_bytes, hex_to_hash};
use weave_core::{
    BankTransaction, Block, Blockchain, ChainConfig, MiningLimits, Transaction,
    compute_merkle_root,
};

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Build a sample chain, print it and check its integrity
    Demo {
        #[arg(long, default_value_t = 3)]
        blocks: usize,
        /// Overrides the configured difficulty
        #[arg(long)]
        difficulty: Option<u32>,
        #[arg(long)]
        json: bool,
    },

    /// Build a sample chain, corrupt it, and report what validation finds
    Tamper {
        #[arg(long, default_value_t = 3)]
        blocks: usize,
        #[arg(long)]
        difficulty: Option<u32>,
    },

    /// Merkle root of 32-byte hex transaction ids, in the given order
    Merkle { ids: Vec<String> },

    /// Hex conversion helpers
    Hex {
        #[command(subcommand)]
        subcommand: HexCommands,
    },

    /// Manage CLI configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
pub enum HexCommands {
    Encode { text: String },
    Decode { hex: String },
}

#[derive(clap::Subcommand)]
pub enum ConfigCommands {
    View,
    Set { key: String, value: String },
    Init,
}

/// Map the file config onto core chain parameters.
pub fn chain_config(cfg: &Config, difficulty: Option<u32>) -> ChainConfig {
    let mining = cfg.mine_on_append.then(|| MiningLimits {
        max_attempts: cfg.max_mining_attempts,
        deadline: (cfg.mining_timeout_secs > 0)
            .then(|| Duration::from_secs(cfg.mining_timeout_secs)),
    });
    ChainConfig {
        difficulty: difficulty.unwrap_or(cfg.difficulty),
        max_block_size: cfg.max_block_size,
        mining,
    }
}

fn sample_transactions(round: usize) -> Vec<Box<dyn Transaction>> {
    let parties = ["alice", "bob", "carol", "dave"];
    (0..=round % 3)
        .map(|i| {
            let sender = parties[(round + i) % parties.len()];
            let recipient = parties[(round + i + 1) % parties.len()];
            let tx = BankTransaction::new(
                format!("tx-{}-{}", round, i),
                sender,
                recipient,
                10.0 * (round + 1) as f64 + i as f64,
            );
            Box::new(tx) as Box<dyn Transaction>
        })
        .collect()
}

pub fn build_sample_chain(config: ChainConfig, blocks: usize) -> Result<Blockchain> {
    let mut chain = Blockchain::with_config(config);
    for round in 0..blocks {
        chain
            .add_block(sample_transactions(round))
            .with_context(|| format!("failed to append block {}", round + 1))?;
    }
    Ok(chain)
}

pub fn demo(blocks: usize, difficulty: Option<u32>, json: bool) -> Result<()> {
    let cfg = Config::load()?;
    let chain = build_sample_chain(chain_config(&cfg, difficulty), blocks)?;

    if json {
        println!("{}", display::render_chain_json(&chain)?);
    } else {
        println!("{}", display::render_chain(&chain)?);
    }

    match chain.is_valid() {
        Ok(()) => println!("✅ Chain is valid ({} blocks)", chain.len()),
        Err(e) => println!("❌ Chain is invalid: {}", e),
    }
    Ok(())
}

pub fn tamper(blocks: usize, difficulty: Option<u32>) -> Result<()> {
    if blocks < 2 {
        bail!("tamper needs at least 2 blocks after genesis");
    }
    let cfg = Config::load()?;
    let mut chain = build_sample_chain(chain_config(&cfg, difficulty), blocks)?;

    // Inflate the first amount of block 1 without re-deriving anything.
    let forged = BankTransaction::new("tx-0-0", "alice", "bob", 1_000_000.0);
    if let Some(block) = chain.block_mut(1) {
        block.transactions_mut()[0] = Box::new(forged);
    }

    // Replace block 2 with one that points somewhere else.
    if let Some(block) = chain.block_mut(2) {
        *block = Block::new(sample_transactions(1), [0xEE; 32], 2, 0);
    }

    println!("{}", display::render_chain(&chain)?);

    match chain.is_valid() {
        Ok(()) => println!("✅ Chain is valid"),
        Err(e) => println!("❌ First violation: {}", e),
    }

    println!("Full report:");
    for v in chain.violations() {
        match v.index() {
            Some(i) => println!("  block {:>3}: {}", i, v),
            None => println!("  chain    : {}", v),
        }
    }
    Ok(())
}

pub fn merkle(ids: &[String]) -> Result<()> {
    let leaves = ids
        .iter()
        .map(|id| hex_to_hash(id).with_context(|| format!("bad transaction id {:?}", id)))
        .collect::<Result<Vec<_>>>()?;
    println!("{}", bytes_to_hex(&compute_merkle_root(&leaves)));
    Ok(())
}

pub fn hex_command(subcommand: HexCommands) -> Result<()> {
    match subcommand {
        HexCommands::Encode { text } => println!("{}", bytes_to_hex(text.as_bytes())),
        HexCommands::Decode { hex } => {
            let bytes = hex_to_bytes(&hex)?;
            println!("{}", String::from_utf8_lossy(&bytes));
        }
    }
    Ok(())
}
