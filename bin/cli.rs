//! CLI tool for deploying and operating the lending protocol contracts.

use basalt_lending::collateral::{CollateralManager, CollateralManagerInitArgs};
use basalt_lending::interest::InterestRateModel;
use basalt_lending::oracle::PriceOracle;
use basalt_lending::pool::{LendingPool, LendingPoolInitArgs};
use basalt_lending::registry::TokenRegistry;
use basalt_lending::reserve::ReserveLedger;
use odra::casper_types::U256;
use odra::host::{HostEnv, NoArgs};
use odra::prelude::{Address, Addressable};
use odra::schema::casper_contract_schema::NamedCLType;
use odra_cli::{
    deploy::DeployScript,
    scenario::{Args, Error, Scenario, ScenarioMetadata},
    CommandArg, ContractProvider, DeployedContractsContainer, DeployerExt,
    OdraCli,
};

/// Deploys the standalone leaf contracts: registry, oracle, rate model
/// and reserve ledger.
pub struct CoreDeployScript;

impl DeployScript for CoreDeployScript {
    fn deploy(
        &self,
        env: &HostEnv,
        container: &mut DeployedContractsContainer,
    ) -> Result<(), odra_cli::deploy::Error> {
        let _registry = TokenRegistry::load_or_deploy(
            &env,
            NoArgs,
            container,
            300_000_000_000, // Gas limit for registry deployment
        )?;

        let _oracle = PriceOracle::load_or_deploy(&env, NoArgs, container, 300_000_000_000)?;

        let _model = InterestRateModel::load_or_deploy(&env, NoArgs, container, 300_000_000_000)?;

        let _ledger = ReserveLedger::load_or_deploy(&env, NoArgs, container, 300_000_000_000)?;

        Ok(())
    }
}

/// Deploys the collateral manager.
/// Requires the oracle to be deployed first.
pub struct ManagerDeployScript;

impl DeployScript for ManagerDeployScript {
    fn deploy(
        &self,
        env: &HostEnv,
        container: &mut DeployedContractsContainer,
    ) -> Result<(), odra_cli::deploy::Error> {
        let oracle = container.contract_ref::<PriceOracle>(env)?;
        let oracle_address = oracle.address().clone();

        let _manager = CollateralManager::load_or_deploy(
            &env,
            CollateralManagerInitArgs {
                price_oracle: oracle_address,
            },
            container,
            400_000_000_000,
        )?;

        Ok(())
    }
}

/// Deploys the lending pool against the already-deployed collaborators.
pub struct PoolDeployScript;

impl DeployScript for PoolDeployScript {
    fn deploy(
        &self,
        env: &HostEnv,
        container: &mut DeployedContractsContainer,
    ) -> Result<(), odra_cli::deploy::Error> {
        let registry = container.contract_ref::<TokenRegistry>(env)?;
        let oracle = container.contract_ref::<PriceOracle>(env)?;
        let model = container.contract_ref::<InterestRateModel>(env)?;
        let ledger = container.contract_ref::<ReserveLedger>(env)?;
        let manager = container.contract_ref::<CollateralManager>(env)?;

        let _pool = LendingPool::load_or_deploy(
            &env,
            LendingPoolInitArgs {
                token_registry: registry.address().clone(),
                price_oracle: oracle.address().clone(),
                interest_rate_model: model.address().clone(),
                reserve_ledger: ledger.address().clone(),
                collateral_manager: manager.address().clone(),
            },
            container,
            500_000_000_000, // Gas limit for pool deployment
        )?;

        Ok(())
    }
}

/// Deploys the complete protocol in dependency order.
pub struct ProtocolDeployScript;

impl DeployScript for ProtocolDeployScript {
    fn deploy(
        &self,
        env: &HostEnv,
        container: &mut DeployedContractsContainer,
    ) -> Result<(), odra_cli::deploy::Error> {
        CoreDeployScript.deploy(env, container)?;
        ManagerDeployScript.deploy(env, container)?;
        PoolDeployScript.deploy(env, container)?;

        Ok(())
    }
}

/// Scenario to wire the pool into the escrow and reserve contracts.
pub struct WireProtocolScenario;

impl Scenario for WireProtocolScenario {
    fn args(&self) -> Vec<CommandArg> {
        vec![]
    }

    fn run(
        &self,
        env: &HostEnv,
        container: &DeployedContractsContainer,
        _args: Args,
    ) -> Result<(), Error> {
        let pool = container.contract_ref::<LendingPool>(env)?;
        let pool_address = pool.address().clone();

        let mut manager = container.contract_ref::<CollateralManager>(env)?;
        let mut ledger = container.contract_ref::<ReserveLedger>(env)?;

        env.set_gas(300_000_000_000);
        manager.try_set_pool(pool_address)?;
        env.set_gas(300_000_000_000);
        ledger.try_set_pool(pool_address)?;

        println!("Protocol wired to pool {pool_address:?}");
        Ok(())
    }
}

impl ScenarioMetadata for WireProtocolScenario {
    const NAME: &'static str = "wire-protocol";
    const DESCRIPTION: &'static str =
        "Points the collateral manager and reserve ledger at the deployed pool";
}

/// Scenario to whitelist an asset in the registry.
pub struct RegisterAssetScenario;

impl Scenario for RegisterAssetScenario {
    fn args(&self) -> Vec<CommandArg> {
        vec![CommandArg::new(
            "asset",
            "Address of the CEP-18 asset to whitelist",
            NamedCLType::Key,
        )]
    }

    fn run(
        &self,
        env: &HostEnv,
        container: &DeployedContractsContainer,
        args: Args,
    ) -> Result<(), Error> {
        let mut registry = container.contract_ref::<TokenRegistry>(env)?;
        let asset = args.get_single::<Address>("asset")?;

        env.set_gas(300_000_000_000);
        registry.try_register_asset(asset)?;

        println!("Asset registered successfully!");
        Ok(())
    }
}

impl ScenarioMetadata for RegisterAssetScenario {
    const NAME: &'static str = "register-asset";
    const DESCRIPTION: &'static str = "Whitelists an asset for deposits and flash loans";
}

/// Scenario to push a price into the oracle.
pub struct SetPriceScenario;

impl Scenario for SetPriceScenario {
    fn args(&self) -> Vec<CommandArg> {
        vec![
            CommandArg::new("asset", "Address of the priced asset", NamedCLType::Key),
            CommandArg::new(
                "price",
                "Price with 8 fractional digits (1.0 = 100000000)",
                NamedCLType::U256,
            ),
        ]
    }

    fn run(
        &self,
        env: &HostEnv,
        container: &DeployedContractsContainer,
        args: Args,
    ) -> Result<(), Error> {
        let mut oracle = container.contract_ref::<PriceOracle>(env)?;
        let asset = args.get_single::<Address>("asset")?;
        let price = args.get_single::<U256>("price")?;

        env.set_gas(300_000_000_000);
        oracle.try_update_price(asset, price)?;

        println!("Price pushed successfully!");
        Ok(())
    }
}

impl ScenarioMetadata for SetPriceScenario {
    const NAME: &'static str = "set-price";
    const DESCRIPTION: &'static str = "Pushes a fresh price for an asset";
}

/// Main function to run the CLI tool.
pub fn main() {
    OdraCli::new()
        .about("CLI tool for the lending protocol smart contracts")
        // Deploy scripts
        .deploy(CoreDeployScript)
        .deploy(ManagerDeployScript)
        .deploy(PoolDeployScript)
        .deploy(ProtocolDeployScript)
        // Contract references
        .contract::<TokenRegistry>()
        .contract::<PriceOracle>()
        .contract::<InterestRateModel>()
        .contract::<ReserveLedger>()
        .contract::<CollateralManager>()
        .contract::<LendingPool>()
        // Scenarios
        .scenario(WireProtocolScenario)
        .scenario(RegisterAssetScenario)
        .scenario(SetPriceScenario)
        .build()
        .run();
}
