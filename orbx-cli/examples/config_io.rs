//! Round-trip extractor configuration through JSON and TOML files.
//! Run with: cargo run --example config_io --features serde

use orbx_cli::ExtractorBuilder;
use orbx_extract::config;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = ExtractorBuilder::new()
        .n_features(1000)
        .levels(6)
        .thresholds(25, 9)
        .build()?;

    let dir = std::env::temp_dir();
    let json_path = dir.join("orbx_config.json");
    let toml_path = dir.join("orbx_config.toml");

    config::save_json(&cfg, &json_path)?;
    config::save_toml(&cfg, &toml_path)?;
    println!("wrote {} and {}", json_path.display(), toml_path.display());

    let from_json = config::load_json(&json_path)?;
    let from_toml = config::load_toml(&toml_path)?;
    assert_eq!(from_json.n_features, cfg.n_features);
    assert_eq!(from_toml.n_levels, cfg.n_levels);

    println!(
        "round-tripped: {} features, {} levels, thresholds {}/{}",
        from_json.n_features, from_json.n_levels, from_json.ini_threshold, from_json.min_threshold
    );
    Ok(())
}
