use anyhow::Result;
use strk_airdrop_keeper::account::AccountResolver;
use strk_airdrop_keeper::units::parse_hex_felt;
use strk_airdrop_keeper::KeeperConfig;
use starknet::signers::SigningKey;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: {} <PRIVATE_KEY_HEX> [CONFIG_PATH]", args[0]);
        std::process::exit(1);
    }

    let config_path = args.get(2).map(String::as_str).unwrap_or("configs/mainnet.toml");
    let config = KeeperConfig::load(config_path)?;
    let resolver = AccountResolver::from_config(&config)?;

    let signing_key = SigningKey::from_secret_scalar(parse_hex_felt(&args[1])?);
    let public_key = signing_key.verifying_key().scalar();
    println!("🔑 Public key: {:#x}", public_key);
    println!(
        "🧮 Counterfactual address: {:#x}",
        resolver.counterfactual_address(public_key)
    );

    let account = resolver.resolve(&signing_key).await;
    println!("✅ Resolved account address: {:#x}", account.address());

    Ok(())
}
