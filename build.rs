use std::fs;

fn main() {
    // Validate default config at compile time
    let config_path = "src/default_config.toml";
    println!("cargo:rerun-if-changed={}", config_path);

    let content = fs::read_to_string(config_path).expect("Failed to read default_config.toml");

    // Try to parse it as TOML to catch syntax errors
    let table = match content.parse::<toml::Table>() {
        Ok(table) => table,
        Err(e) => panic!("Invalid default_config.toml: {}", e),
    };

    if let Some(shift) = table.get("heading_shift").and_then(|v| v.as_integer()) {
        if !(0..=5).contains(&shift) {
            panic!("Invalid default_config.toml: heading_shift {} is outside 0..=5", shift);
        }
    }
}
