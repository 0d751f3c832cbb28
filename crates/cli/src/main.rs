//! Command Line Interface for the CLMM liquidity provider.
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use clmm_provider_api::{ApiServer, AppState, AuthConfig, ServerConfig};
use clmm_provider_data::{Database, InMemoryPositionRepository, PositionRepository};
use clmm_provider_domain::{
    AddLiquidityParams, Address, FeePercent, FeeTier, TickRange, TokenAmount,
};
use clmm_provider_execution::provider::LiquidityProvider;
use clmm_provider_protocols::TokenLedger;
use clmm_provider_protocols::memory::{InMemoryLedger, MockPositionManager};
use dotenv::dotenv;
use prettytable::{Table, row};
use std::sync::Arc;
use tracing::{info, warn};

mod settings;

use settings::Settings;

#[derive(Parser)]
#[command(name = "clmm-provider")]
#[command(about = "Fee-taking concentrated liquidity provider", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a deposit end to end on in-memory backends
    Demo {
        /// Fee percentage kept by the provider
        #[arg(short, long, default_value_t = 5)]
        fee_percent: u32,

        /// Gross amount of token A
        #[arg(long, default_value_t = 1000)]
        amount_a: u64,

        /// Gross amount of token B
        #[arg(long, default_value_t = 2000)]
        amount_b: u64,

        /// Pool fee tier
        #[arg(long, default_value_t = 3000)]
        fee_tier: u32,

        /// Lower tick
        #[arg(long, default_value_t = -60000, allow_hyphen_values = true)]
        tick_lower: i32,

        /// Upper tick
        #[arg(long, default_value_t = 60000)]
        tick_upper: i32,
    },
    /// Serve the REST API
    Serve {
        /// Account to pre-fund and approve on the in-memory ledger
        #[arg(long)]
        seed: Vec<Address>,

        /// Token credited to every seeded account
        #[arg(long = "seed-token")]
        seed_tokens: Vec<Address>,

        /// Amount of each seed token credited
        #[arg(long, default_value_t = 1_000_000)]
        seed_amount: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let settings = Settings::from_env()?;

    match cli.command {
        Commands::Demo {
            fee_percent,
            amount_a,
            amount_b,
            fee_tier,
            tick_lower,
            tick_upper,
        } => {
            let params = AddLiquidityParams {
                token_a: Address::from_low_u64(0xa),
                token_b: Address::from_low_u64(0xb),
                amount_a: amount_a.into(),
                amount_b: amount_b.into(),
                fee_tier: FeeTier(fee_tier),
                tick_range: TickRange::new(tick_lower, tick_upper),
            };
            run_demo(&settings, FeePercent::new(fee_percent), params).await?;
        }
        Commands::Serve {
            seed,
            seed_tokens,
            seed_amount,
        } => {
            let repository: Arc<dyn PositionRepository> = match &settings.database_url {
                Some(url) => {
                    let db = Database::connect(url)
                        .await
                        .context("failed to connect to the position database")?;
                    db.migrate().await.context("failed to run migrations")?;
                    info!("Position records stored in PostgreSQL");
                    Arc::new(db.positions())
                }
                None => {
                    warn!("DATABASE_URL not set, position records are kept in memory");
                    Arc::new(InMemoryPositionRepository::new())
                }
            };

            let ledger = Arc::new(InMemoryLedger::new());
            let custody = settings.provider.provider_address;
            for account in &seed {
                for token in &seed_tokens {
                    let amount = TokenAmount::from(seed_amount);
                    ledger.mint(*token, *account, amount).await?;
                    ledger.approve(*token, *account, custody, amount).await?;
                }
                info!(account = %account, tokens = seed_tokens.len(), "Seeded account");
            }

            let provider = Arc::new(LiquidityProvider::new(
                settings.owner,
                settings.provider,
                ledger,
                Arc::new(MockPositionManager::new()),
                repository,
            ));

            let auth = if settings.api_keys.is_empty() {
                warn!("LP_API_KEYS is empty; commands will be refused");
                AuthConfig::default()
            } else {
                AuthConfig::with_api_keys(settings.api_keys.clone())
            };
            let server = ApiServer::new(
                ServerConfig {
                    bind_addr: settings.bind_addr,
                    auth,
                },
                AppState::new(provider),
            );
            server.run().await?;
        }
    }

    Ok(())
}

/// Funds a depositor, runs one deposit and prints what moved.
async fn run_demo(
    settings: &Settings,
    fee_percent: FeePercent,
    params: AddLiquidityParams,
) -> Result<()> {
    let depositor = Address::from_low_u64(0xd00d);
    let ledger = Arc::new(InMemoryLedger::new());
    let manager = Arc::new(MockPositionManager::new());
    let config = settings.provider;
    let custody = config.provider_address;

    let provider = LiquidityProvider::new(
        settings.owner,
        config,
        ledger.clone(),
        manager.clone(),
        Arc::new(InMemoryPositionRepository::new()),
    );
    provider.set_fee_percent(settings.owner, fee_percent).await?;

    for (token, amount) in [
        (params.token_a, params.amount_a),
        (params.token_b, params.amount_b),
    ] {
        ledger.mint(token, depositor, amount).await?;
        ledger.approve(token, depositor, custody, amount).await?;
    }

    println!(
        "Depositing {} A and {} B at {} fee...",
        params.amount_a, params.amount_b, fee_percent
    );
    let receipt = provider.add_liquidity(depositor, params).await?;

    let mut splits = Table::new();
    splits.add_row(row!["Token", "Gross", "Fee", "Net"]);
    for (name, split) in [("A", receipt.split_a), ("B", receipt.split_b)] {
        splits.add_row(row![name, split.gross, split.fee, split.net]);
    }
    splits.printstd();

    let mut balances = Table::new();
    balances.add_row(row!["Account", "Token A", "Token B"]);
    for (name, account) in [
        ("depositor", depositor),
        ("custody", custody),
        ("position manager", config.position_manager),
    ] {
        balances.add_row(row![
            name,
            ledger.balance_of(params.token_a, account).await,
            ledger.balance_of(params.token_b, account).await
        ]);
    }
    balances.add_row(row![
        "allowance to position manager",
        ledger
            .allowance(params.token_a, custody, config.position_manager)
            .await,
        ledger
            .allowance(params.token_b, custody, config.position_manager)
            .await
    ]);
    balances.printstd();

    let record = provider
        .position(depositor)
        .await?
        .context("deposit committed without a position record")?;
    println!(
        "Position #{} ({} / {}) recorded for {}",
        record.token_id, record.token_a, record.token_b, depositor
    );
    println!("Minted positions: {}", manager.minted().await.len());

    Ok(())
}
