use anyhow::Result;

fn main() -> Result<()> {
    let schema = winport::config::WindowConfig::config_schema();
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
