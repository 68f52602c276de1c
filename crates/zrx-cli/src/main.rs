//! zrx
//!
//! Sign 0x orders, inspect relayer order books and hash EIP-712 documents.

use alloy_primitives::{Address, U256};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use zrx_core::assets::AssetItem;
use zrx_core::config::Config;
use zrx_core::contracts::{protocol_fee, wei_to_eth};
use zrx_core::eip712::TypedDataEncoder;
use zrx_core::relayer::{RelayerManager, DEFAULT_PER_PAGE};
use zrx_core::signing::SignedOrder;
use zrx_core::ZrxKit;

#[derive(Debug, Parser)]
#[command(name = "zrx", version, about)]
struct Args {
    /// TOML configuration file; `ZRX__*` environment variables override it.
    #[arg(long, env = "ZRX_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build and sign a limit order, optionally posting it to a relayer.
    SignOrder {
        #[arg(long)]
        maker_token: Address,
        #[arg(long)]
        taker_token: Address,
        #[arg(long)]
        maker_amount: U256,
        #[arg(long)]
        taker_amount: U256,
        /// Seconds until the order expires.
        #[arg(long, default_value_t = 3600)]
        expires_in: u64,
        /// Relayer index to post the signed order to.
        #[arg(long)]
        post: Option<usize>,
    },
    /// Check the maker signature of a signed order JSON file.
    Verify { file: PathBuf },
    /// Fetch bids and asks for a token pair.
    Orderbook {
        #[arg(long, default_value_t = 0)]
        relayer: usize,
        #[arg(long)]
        base: Address,
        #[arg(long)]
        quote: Address,
        #[arg(long, default_value_t = DEFAULT_PER_PAGE)]
        per_page: u32,
    },
    /// List the asset pairs a relayer trades.
    AssetPairs {
        #[arg(long, default_value_t = 0)]
        relayer: usize,
    },
    /// List orders, optionally for a single maker.
    Orders {
        #[arg(long, default_value_t = 0)]
        relayer: usize,
        #[arg(long)]
        maker: Option<String>,
        #[arg(long, default_value_t = DEFAULT_PER_PAGE)]
        per_page: u32,
    },
    /// Protocol fee for filling a number of orders.
    ProtocolFee {
        #[arg(long, default_value_t = 1)]
        orders: usize,
    },
    /// EIP-712 digest of a typed-data JSON document.
    HashTypedData { file: PathBuf },
}

fn relayer_manager(config: &Config) -> Result<RelayerManager> {
    let network = config.network_type()?;
    let relayers = config.relayers().context("Invalid relayer configuration")?;
    Ok(RelayerManager::new(relayers, network)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "zrx=info,zrx_core=info,hyper=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;

    match args.command {
        Command::SignOrder {
            maker_token,
            taker_token,
            maker_amount,
            taker_amount,
            expires_in,
            post,
        } => {
            let kit = ZrxKit::from_config(&config)?;
            let order = kit
                .order_builder()
                .maker_asset(AssetItem::for_address(maker_token).asset_data, maker_amount)
                .taker_asset(AssetItem::for_address(taker_token).asset_data, taker_amount)
                .expires_in(expires_in)
                .build()
                .context("Incomplete order")?;
            let signed = kit.sign_order(&order)?;

            if let Some(index) = post {
                kit.relayer_manager().post_order(index, &signed).await?;
                info!(relayer = index, maker = %signed.maker_address, "Order posted");
            }
            println!("{}", serde_json::to_string_pretty(&signed)?);
        }
        Command::Verify { file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let signed: SignedOrder = serde_json::from_str(&text).context("Invalid signed order")?;
            let valid = zrx_core::signing::is_valid_signature(&signed, config.protocol()?)?;
            println!("{}", valid);
        }
        Command::Orderbook {
            relayer,
            base,
            quote,
            per_page,
        } => {
            let manager = relayer_manager(&config)?;
            let base = AssetItem::for_address(base).asset_data;
            let quote = AssetItem::for_address(quote).asset_data;
            let book = manager
                .get_orderbook(
                    relayer,
                    &zrx_core::hex_codec::to_hex_prefixed(&base),
                    &zrx_core::hex_codec::to_hex_prefixed(&quote),
                    per_page,
                )
                .await?;
            println!("{}", serde_json::to_string_pretty(&book)?);
        }
        Command::AssetPairs { relayer } => {
            let pairs = relayer_manager(&config)?.get_asset_pairs(relayer).await?;
            println!("{}", serde_json::to_string_pretty(&pairs)?);
        }
        Command::Orders {
            relayer,
            maker,
            per_page,
        } => {
            let orders = relayer_manager(&config)?
                .get_orders(relayer, maker.as_deref(), per_page)
                .await?;
            println!("{}", serde_json::to_string_pretty(&orders)?);
        }
        Command::ProtocolFee { orders } => {
            let fee = protocol_fee(&config.gas_provider(), orders);
            println!("{} wei ({} ETH)", fee, wei_to_eth(fee)?);
        }
        Command::HashTypedData { file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let digest = TypedDataEncoder::from_json(&text)?.hash_structured_data()?;
            println!("{}", digest);
        }
    }

    Ok(())
}
