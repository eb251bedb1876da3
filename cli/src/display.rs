// Read-only rendering of a chain. Nothing here validates.
use chrono::{TimeZone, Utc};
use serde::Serialize;
use std::fmt::{self, Write};
use weave_core::{Block, BlockHeader, Blockchain};

#[derive(Serialize)]
pub struct BlockView<'a> {
    pub header: &'a BlockHeader,
    pub hash: String,
    pub size: usize,
    pub transactions: Vec<TransactionView>,
}

#[derive(Serialize)]
pub struct TransactionView {
    pub id: String,
    pub summary: String,
    pub signed: bool,
}

impl<'a> From<&'a Block> for BlockView<'a> {
    fn from(block: &'a Block) -> Self {
        BlockView {
            header: block.header(),
            hash: hex::encode(block.hash()),
            size: block.calculate_size(),
            transactions: block
                .transactions()
                .iter()
                .map(|tx| TransactionView {
                    id: hex::encode(tx.id()),
                    summary: tx.summary(),
                    signed: tx.signature().is_signed(),
                })
                .collect(),
        }
    }
}

fn format_timestamp(ts: i64) -> String {
    match Utc.timestamp_opt(ts, 0).single() {
        Some(dt) => dt.to_rfc3339(),
        None => "out of range".to_string(),
    }
}

pub fn render_block(block: &Block) -> Result<String, fmt::Error> {
    let header = block.header();
    let mut out = String::new();
    writeln!(out, "--- Block #{} ---", header.index)?;
    writeln!(
        out,
        "Timestamp:   {} ({})",
        header.timestamp,
        format_timestamp(header.timestamp)
    )?;
    writeln!(out, "Transactions: {}", block.transactions().len())?;
    for tx in block.transactions() {
        writeln!(out, "  - {} [{}]", tx.summary(), hex::encode(&tx.id()[..8]))?;
    }
    writeln!(out, "Prev Hash:   {}", hex::encode(header.previous_hash))?;
    writeln!(out, "Merkle Root: {}", hex::encode(header.merkle_root))?;
    writeln!(out, "Nonce:       {}", header.nonce)?;
    writeln!(out, "Difficulty:  {}", header.difficulty)?;
    writeln!(out, "Hash:        {}", hex::encode(block.hash()))?;
    Ok(out)
}

pub fn render_chain(chain: &Blockchain) -> Result<String, fmt::Error> {
    let blocks = chain
        .blocks()
        .iter()
        .map(render_block)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(blocks.join("\n"))
}

pub fn render_chain_json(chain: &Blockchain) -> serde_json::Result<String> {
    let views: Vec<BlockView> = chain.blocks().iter().map(BlockView::from).collect();
    serde_json::to_string_pretty(&views)
}
