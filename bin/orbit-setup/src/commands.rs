//! Subcommand implementations.

use std::{
    io::{BufRead, Write},
    time::Duration,
};

use alloy_core::primitives::Address;
use anyhow::{Context, Result};
use comfy_table::Table;
use orbit_deploy::{
    ChainIdentity, ChainInfo, ConfigStore, NodeConfigBuilder, NodeType, PrepareNodeConfigParams,
    StandardNodeConfig, chain_config, funding, generate_chain_id, keys, node_config,
    prepare_das_config, rpc,
};
use serde_json::Value;

use crate::cli::{
    AccountsArgs, ChainInfoArgs, CheckFundingArgs, DasConfigArgs, PrepareChainConfigArgs,
    PrepareNodeConfigArgs, UpdateNodeConfigArgs,
};

pub fn prepare_chain_config(store: &ConfigStore, args: &PrepareChainConfigArgs) -> Result<()> {
    let chain_id = args.orbit_chain_id.unwrap_or_else(generate_chain_id);
    let owner = keys::address_of(&args.chain_owner_private_key)
        .context("Invalid chain owner private key")?;

    let chain_config = chain_config::prepare_chain_config(chain_id, owner, args.use_anytrust);
    let path = store.save_chain_config(&chain_config)?;

    tracing::info!(
        chain_id,
        %owner,
        anytrust = args.use_anytrust,
        "Chain configuration prepared"
    );
    println!("Chain configuration written to {}", path.display());

    Ok(())
}

pub fn prepare_node_config(store: &ConfigStore, args: &PrepareNodeConfigArgs) -> Result<()> {
    let parent_chain = args.parent_chain.resolve()?;
    let parent_chain_rpc_url = args.parent_chain.rpc_url(&parent_chain);

    let chain_config = store.read_chain_config()?;
    let core_contracts = store.read_core_contracts()?;
    let accounts = args.keys.accounts()?;

    let params = PrepareNodeConfigParams {
        chain_name: args.chain_name.clone(),
        chain_config,
        core_contracts,
        batch_poster_private_key: accounts.batch_poster.private_key.clone(),
        validator_private_key: accounts.staker.private_key.clone(),
        stake_token: args
            .stake_token
            .or(args.parent_chain.weth)
            .unwrap_or(Address::ZERO),
        parent_chain_id: parent_chain.chain_id(),
        parent_chain_rpc_url: parent_chain_rpc_url.clone(),
        parent_chain_beacon_rpc_url: parent_chain
            .is_l1()
            .then(|| args.parent_chain_beacon_rpc_url.clone())
            .flatten(),
        parent_chain_is_arbitrum: (!parent_chain.is_supported())
            .then(|| parent_chain.is_arbitrum()),
    };

    let builder = NodeConfigBuilder::new(store.clone(), args.node_options.to_options(store)?);

    if args.split_nodes {
        let paths = builder.build(&StandardNodeConfig, &params)?;
        println!("Batch poster configuration written to {}", paths.batch_poster.display());
        println!("Staker configuration written to {}", paths.staker.display());
        println!("RPC configuration written to {}", paths.rpc.display());
    } else {
        let path = builder.build_single(&StandardNodeConfig, &params)?;
        println!("Node configuration written to {}", path.display());
    }

    if params.chain_config.is_anytrust() {
        let das_config = prepare_das_config(
            &parent_chain_rpc_url,
            params.core_contracts.sequencer_inbox,
        );
        let path = store.save_das_config(&das_config)?;
        println!("DAS server configuration written to {}", path.display());
    }

    Ok(())
}

fn confirm(question: &str) -> Result<bool> {
    print!("{question} [y/N] ");
    std::io::stdout().flush().context("Failed to flush stdout")?;

    let mut answer = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read answer")?;

    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

pub fn update_node_config(store: &ConfigStore, args: &UpdateNodeConfigArgs) -> Result<()> {
    let patch: Value = match &args.patch {
        Some(path) => ConfigStore::read_json(path).context("Failed to load patch")?,
        None => node_config::default_update_patch(),
    };

    let path = store.node_config_path(args.node_type);
    if !args.yes {
        let patch_text = serde_json::to_string_pretty(&patch).context("Failed to render patch")?;
        println!("The following changes will be merged into {}:", path.display());
        println!("{patch_text}");
        if !confirm("Continue?")? {
            println!("Update cancelled");
            return Ok(());
        }
    }

    let update = node_config::update_node_config(store, args.node_type, &patch)?;
    println!("Previous configuration saved to {}", update.backup.display());
    println!("Configuration updated at {}", update.path.display());

    Ok(())
}

fn read_chain_info(store: &ConfigStore) -> Result<ChainInfo> {
    let rpc_config = store.read_node_config(NodeType::Rpc)?;
    ChainInfo::from_node_config(&rpc_config)
}

pub fn das_config(store: &ConfigStore, args: &DasConfigArgs) -> Result<()> {
    let info = read_chain_info(store)?;
    if !info.is_anytrust() {
        anyhow::bail!("Chain {} is not an Anytrust chain", info.chain_id);
    }

    let parent_chain = args.parent_chain.resolve()?;
    let parent_chain_rpc_url = args.parent_chain.rpc_url(&parent_chain);
    let core_contracts = store.read_core_contracts()?;

    let das_config = prepare_das_config(&parent_chain_rpc_url, core_contracts.sequencer_inbox);
    let path = store.save_das_config(&das_config)?;
    println!("DAS server configuration written to {}", path.display());

    Ok(())
}

pub fn chain_info(store: &ConfigStore, args: &ChainInfoArgs) -> Result<()> {
    let info = read_chain_info(store)?;
    let identity = ChainIdentity::for_chain(
        &info,
        &args.endpoint.nitro_rpc_url,
        args.endpoint.port()?,
        args.endpoint.block_explorer_url.as_deref(),
    );

    let mut table = Table::new();
    table.set_header(vec!["Field", "Value"]);
    table.add_row(vec!["Chain id".to_string(), identity.id.to_string()]);
    table.add_row(vec!["Name".to_string(), identity.name.clone()]);
    table.add_row(vec!["RPC URL".to_string(), identity.rpc_url.clone()]);
    table.add_row(vec![
        "Native currency".to_string(),
        format!(
            "{} ({}, {} decimals)",
            identity.native_currency.name,
            identity.native_currency.symbol,
            identity.native_currency.decimals
        ),
    ]);
    if let Some(explorer) = &identity.block_explorer_url {
        table.add_row(vec!["Block explorer".to_string(), explorer.clone()]);
    }
    table.add_row(vec![
        "Parent chain id".to_string(),
        info.parent_chain_id.to_string(),
    ]);
    table.add_row(vec!["Anytrust".to_string(), info.is_anytrust().to_string()]);
    table.add_row(vec!["Rollup".to_string(), info.rollup.rollup.to_string()]);
    table.add_row(vec!["Bridge".to_string(), info.rollup.bridge.to_string()]);
    table.add_row(vec!["Inbox".to_string(), info.rollup.inbox.to_string()]);
    table.add_row(vec![
        "Sequencer inbox".to_string(),
        info.rollup.sequencer_inbox.to_string(),
    ]);
    table.add_row(vec!["Stake token".to_string(), info.stake_token().to_string()]);
    table.add_row(vec![
        "Deployed at block".to_string(),
        info.rollup.deployed_at.to_string(),
    ]);

    println!("{table}");
    Ok(())
}

pub fn accounts(args: &AccountsArgs) -> Result<()> {
    let accounts = args.keys.accounts()?;

    let mut table = Table::new();
    let mut header = vec!["Role", "Address"];
    if args.show_private_keys {
        header.push("Private key");
    }
    table.set_header(header);

    for account in accounts.all() {
        let mut row = vec![account.role.to_string(), account.address.to_string()];
        if args.show_private_keys {
            row.push(account.private_key.clone());
        }
        table.add_row(row);
    }

    println!("{table}");
    Ok(())
}

pub async fn check_funding(args: &CheckFundingArgs) -> Result<()> {
    if !args.keys.has_operator_keys() {
        anyhow::bail!("Set BATCH_POSTER_PRIVATE_KEY and STAKER_PRIVATE_KEY to check funding");
    }

    let parent_chain = args.parent_chain.resolve()?;
    let url = args.parent_chain.rpc_url(&parent_chain);
    let operators = args.keys.accounts()?;
    let accounts = operators.all();
    let target = funding::parse_funding_amount(Some(&args.funding_amount))?;

    let client = rpc::create_client()?;
    let chain_id = rpc::chain_id(&client, &url).await?;
    if chain_id != parent_chain.chain_id() {
        anyhow::bail!(
            "RPC endpoint {url} serves chain {chain_id}, expected {}",
            parent_chain.chain_id()
        );
    }

    let checks = if args.wait {
        funding::wait_for_funding(
            &client,
            &url,
            &accounts,
            target,
            Duration::from_secs(args.poll_interval),
        )
        .await?
    } else {
        funding::check_funding(&client, &url, &accounts, target).await?
    };

    let mut table = Table::new();
    table.set_header(vec!["Role", "Address", "Balance", "Missing"]);
    for check in &checks {
        table.add_row(vec![
            check.role.to_string(),
            check.address.to_string(),
            check.balance_ether(),
            check.shortfall_ether(),
        ]);
    }
    println!("{table}");

    let unfunded = funding::unfunded(&checks);
    if !unfunded.is_empty() {
        anyhow::bail!("{} account(s) need funding on the parent chain", unfunded.len());
    }

    Ok(())
}
