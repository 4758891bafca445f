use anyhow::Result;

fn main() -> Result<()> {
    let doc = otp_hooks::api::openapi();
    let json = serde_json::to_string_pretty(&doc)?;
    println!("{json}");
    Ok(())
}
