//! SuperAxeCoin chain parameter tool
//!
//! Prints the parameters of a network and checks proof-of-work values
//! against them. Refuses to run when the embedded genesis commitments do
//! not reproduce.

use axe_consensus::consensus::{decode_compact, u256_to_hash, validate_pow_hash};
use axe_consensus::crypto::Hash;
use axe_consensus::node::{
    parse_signet_challenge, select, AssumeutxoData, Base58Type, ChainParams, ChainType, GenesisInfo,
    Network, RegTestOptions, SigNetOptions,
};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Parser)]
#[command(name = "axe-params")]
#[command(version)]
#[command(about = "Inspect SuperAxeCoin consensus parameters", long_about = None)]
struct Cli {
    /// Network to use: main, test, signet or regtest
    #[arg(long, default_value = "main")]
    chain: ChainType,

    /// Signet block challenge script (hex)
    #[arg(long)]
    signetchallenge: Option<String>,

    /// Signet DNS seed, may be repeated
    #[arg(long)]
    signetseednode: Vec<String>,

    /// Regtest buried deployment height as name@height, may be repeated
    #[arg(long)]
    testactivationheight: Vec<String>,

    /// Regtest version bits schedule as deployment:start:end[:min_activation_height]
    #[arg(long)]
    vbparams: Vec<String>,

    /// Regtest: prune after 100 blocks instead of 1000
    #[arg(long)]
    fastprune: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display the selected network's parameters
    Info {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Expand a compact target
    DecodeBits {
        /// Compact target, hex
        #[arg(value_parser = parse_bits)]
        bits: u32,
    },

    /// Check a block hash against a compact target
    CheckPow {
        /// Block hash, display order
        #[arg(long)]
        hash: String,

        /// Compact target, hex
        #[arg(long, value_parser = parse_bits)]
        bits: u32,
    },
}

fn parse_bits(s: &str) -> Result<u32, String> {
    u32::from_str_radix(s.trim_start_matches("0x"), 16)
        .map_err(|e| format!("invalid compact target '{}': {}", s, e))
}

/// Parameter summary as printed by `info`
#[derive(Serialize)]
struct ChainSummary<'a> {
    chain: ChainType,
    message_start: String,
    default_port: u16,
    bech32_hrp: &'a str,
    pubkey_prefix: u8,
    script_prefix: u8,
    pow_limit_bits: String,
    pow_target_spacing: i64,
    lwma_averaging_window: u32,
    subsidy_halving_interval: u32,
    genesis: GenesisInfo,
    checkpoints: &'a BTreeMap<u32, Hash>,
    assumeutxo_heights: Vec<u32>,
    assumeutxo: Vec<&'a AssumeutxoData>,
    dns_seeds: &'a [String],
}

impl<'a> ChainSummary<'a> {
    fn new(params: &'a ChainParams) -> Self {
        let consensus = params.consensus();
        let heights = params.available_snapshot_heights();
        Self {
            chain: params.chain_type(),
            message_start: hex::encode(params.message_start()),
            default_port: params.default_port(),
            bech32_hrp: params.bech32_hrp(),
            pubkey_prefix: first_byte(params.base58_prefix(Base58Type::PubkeyAddress)),
            script_prefix: first_byte(params.base58_prefix(Base58Type::ScriptAddress)),
            pow_limit_bits: format!("{:08x}", consensus.pow_limit_bits()),
            pow_target_spacing: consensus.pow_target_spacing,
            lwma_averaging_window: consensus.lwma_averaging_window,
            subsidy_halving_interval: consensus.subsidy_halving_interval,
            genesis: params.genesis_info(),
            checkpoints: params.checkpoints(),
            assumeutxo: heights
                .iter()
                .filter_map(|height| params.assumeutxo_for_height(*height))
                .collect(),
            assumeutxo_heights: heights,
            dns_seeds: params.dns_seeds(),
        }
    }
}

fn first_byte(prefix: &[u8]) -> u8 {
    prefix.first().copied().unwrap_or_default()
}

fn network_from_cli(cli: &Cli) -> Result<Network, Box<dyn std::error::Error>> {
    let network = match cli.chain {
        ChainType::Main => Network::Main,
        ChainType::TestNet => Network::TestNet,
        ChainType::SigNet => {
            let challenge = cli
                .signetchallenge
                .as_deref()
                .map(parse_signet_challenge)
                .transpose()?;
            let seeds = (!cli.signetseednode.is_empty()).then(|| cli.signetseednode.clone());
            Network::SigNet(SigNetOptions { challenge, seeds })
        }
        ChainType::RegTest => Network::RegTest(RegTestOptions::from_args(
            &cli.testactivationheight,
            &cli.vbparams,
            cli.fastprune,
        )?),
    };
    Ok(network)
}

fn print_info(params: &ChainParams, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let summary = ChainSummary::new(params);
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("SuperAxeCoin {} network", summary.chain);
    println!("  Magic:        {}", summary.message_start);
    println!("  Port:         {}", summary.default_port);
    println!("  Bech32 HRP:   {}", summary.bech32_hrp);
    println!("  PoW limit:    0x{}", summary.pow_limit_bits);
    println!(
        "  Spacing:      {}s (LWMA window {})",
        summary.pow_target_spacing, summary.lwma_averaging_window
    );
    println!("  Halving:      every {} blocks", summary.subsidy_halving_interval);
    println!();
    println!("Genesis Block:");
    println!("  Hash:         {}", summary.genesis.hash);
    println!("  Merkle Root:  {}", summary.genesis.merkle_root);
    println!("  Time:         {}", summary.genesis.time);
    println!("  Nonce:        {}", summary.genesis.nonce);
    println!("  Bits:         0x{:08x}", summary.genesis.bits);
    println!("  Reward:       {} sat", summary.genesis.reward);
    if !summary.checkpoints.is_empty() {
        println!();
        println!("Checkpoints:");
        for (height, hash) in summary.checkpoints {
            println!("  {:>8}  {}", height, hash);
        }
    }
    for data in &summary.assumeutxo {
        println!();
        println!("Assumeutxo snapshot at {}:", data.height);
        println!("  Block:        {}", data.blockhash);
        println!("  UTXO hash:    {}", data.hash_serialized);
        println!("  Tx count:     {}", data.chain_tx_count);
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let network = network_from_cli(&cli)?;
    let params = select(&network)?;

    match cli.command {
        Commands::Info { json } => print_info(&params, json)?,
        Commands::DecodeBits { bits } => {
            let decoded = decode_compact(bits);
            println!("Bits:      0x{:08x}", bits);
            println!("Target:    {}", u256_to_hash(&decoded.target));
            println!("Negative:  {}", decoded.negative);
            println!("Overflow:  {}", decoded.overflow);
        }
        Commands::CheckPow { hash, bits } => {
            let hash = Hash::from_hex(&hash)?;
            validate_pow_hash(&hash, bits, params.consensus())?;
            println!("OK: {} meets 0x{:08x}", hash, bits);
        }
    }

    Ok(())
}
