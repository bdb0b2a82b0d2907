use std::sync::Arc;

use tempfile::TempDir;

use portfolio_ledger_core::assets::{Asset, AssetRepository, AssetRepositoryTrait, NewAsset};
use portfolio_ledger_core::cash::{CashRepository, CashService};
use portfolio_ledger_core::cashflow::CashFlowService;
use portfolio_ledger_core::cost_basis::LotRepository;
use portfolio_ledger_core::db::{self, DbPool};
use portfolio_ledger_core::dividends::{DividendRepository, DividendService};
use portfolio_ledger_core::portfolios::{
    NewPortfolio, Portfolio, PortfolioRepository, PortfolioRepositoryTrait,
};
use portfolio_ledger_core::transactions::{TransactionRepository, TransactionService};

/// Everything wired together against one throwaway SQLite database. The
/// temp dir is dropped (and the database deleted) with the context.
pub struct TestContext {
    pub pool: Arc<DbPool>,
    pub portfolios: PortfolioRepository,
    pub assets: Arc<AssetRepository>,
    pub lots: Arc<LotRepository>,
    pub cash: Arc<CashService>,
    pub transactions: TransactionService,
    pub dividends: DividendService,
    pub cashflow: CashFlowService,
    _data_dir: TempDir,
}

pub fn setup() -> TestContext {
    let data_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path =
        db::init(data_dir.path().to_str().expect("Temp dir path is not valid UTF-8"))
            .expect("Failed to initialize database");
    let pool = db::create_pool(&db_path).expect("Failed to create database pool");
    db::run_migrations(&pool).expect("Failed to run migrations");

    let asset_repository = Arc::new(AssetRepository::new(pool.clone()));
    let lot_repository = Arc::new(LotRepository::new(pool.clone()));
    let cash_repository = Arc::new(CashRepository::new(pool.clone()));
    let cash_service = Arc::new(CashService::new(cash_repository));
    let transaction_repository = Arc::new(TransactionRepository::new(pool.clone()));
    let dividend_repository = Arc::new(DividendRepository::new(pool.clone()));

    TestContext {
        transactions: TransactionService::new(
            transaction_repository,
            asset_repository.clone(),
            lot_repository.clone(),
            cash_service.clone(),
        ),
        dividends: DividendService::new(
            dividend_repository.clone(),
            asset_repository.clone(),
            cash_service.clone(),
        ),
        cashflow: CashFlowService::new(
            cash_service.clone(),
            dividend_repository,
            asset_repository.clone(),
        ),
        portfolios: PortfolioRepository::new(pool.clone()),
        assets: asset_repository,
        lots: lot_repository,
        cash: cash_service,
        pool,
        _data_dir: data_dir,
    }
}

pub fn seed_portfolio(ctx: &TestContext) -> Portfolio {
    ctx.portfolios
        .create_portfolio(NewPortfolio {
            id: None,
            name: "Test Portfolio".to_string(),
            base_currency: "USD".to_string(),
        })
        .expect("Failed to create portfolio")
}

pub fn seed_asset(ctx: &TestContext, portfolio_id: &str, symbol: &str) -> Asset {
    ctx.assets
        .get_or_create_asset(NewAsset {
            id: None,
            portfolio_id: portfolio_id.to_string(),
            symbol: symbol.to_string(),
            asset_type: "STOCK".to_string(),
            currency: "USD".to_string(),
        })
        .expect("Failed to create asset")
}
