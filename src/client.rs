use anyhow::{Result, anyhow};
use serde_json::Value;
use std::path::Path;

use crate::config::ClientConfig;

async fn build_form(config: &ClientConfig) -> Result<reqwest::multipart::Form> {
    let form = reqwest::multipart::Form::new();

    if let Some(ref file) = config.audio_file {
        let path = Path::new(file);
        if !path.exists() {
            return Err(anyhow!("Audio file not found: {}", file));
        }
        let audio_data = tokio::fs::read(path)
            .await
            .map_err(|e| anyhow!("Failed to read audio file: {}", e))?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.clone());

        println!("📁 Audio file: {} ({} bytes)", file, audio_data.len());

        return Ok(form.part(
            "file",
            reqwest::multipart::Part::bytes(audio_data).file_name(filename),
        ));
    }

    match config.text {
        Some(ref text) => {
            println!("📝 Text: {} characters", text.chars().count());
            Ok(form.text("text", text.clone()))
        }
        None => Err(anyhow!("No text or audio file specified")),
    }
}

pub async fn send_process_request(config: &ClientConfig) -> Result<Value> {
    let client = reqwest::Client::new();
    let form = build_form(config).await?;

    println!(
        "🚀 Sending correction request to: {}/process",
        config.server_url
    );

    let response = client
        .post(format!("{}/process", config.server_url))
        .multipart(form)
        .send()
        .await
        .map_err(|e| anyhow!("Failed to send request: {}", e))?;

    let status = response.status();
    let response_text = response
        .text()
        .await
        .map_err(|e| anyhow!("Failed to read response: {}", e))?;

    if !status.is_success() {
        return Err(anyhow!(
            "Server returned error {}: {}",
            status,
            response_text
        ));
    }

    let json: Value = serde_json::from_str(&response_text)
        .map_err(|e| anyhow!("Failed to parse JSON response: {}", e))?;

    Ok(json)
}

pub async fn check_server_health(server_url: &str) -> Result<()> {
    let client = reqwest::Client::new();

    println!("🔍 Checking server health at: {server_url}/health");

    let response = client
        .get(format!("{server_url}/health"))
        .send()
        .await
        .map_err(|e| anyhow!("Failed to connect to server: {}", e))?;

    if response.status().is_success() {
        println!("✅ Server is healthy");
        Ok(())
    } else {
        Err(anyhow!("Server health check failed: {}", response.status()))
    }
}

pub async fn run_client(config: ClientConfig) -> Result<()> {
    println!("📚 Tutor Relay Client");
    println!("=====================");

    if let Err(e) = check_server_health(&config.server_url).await {
        eprintln!("❌ {e}");
        eprintln!("💡 Make sure the server is running: tutor-relay serve");
        return Err(e);
    }

    match send_process_request(&config).await {
        Ok(result) => {
            println!("\n✅ Correction completed!");
            match result.get("result").and_then(Value::as_str) {
                Some(text) => println!("{text}"),
                None => println!("{}", serde_json::to_string_pretty(&result)?),
            }
        }
        Err(e) => {
            eprintln!("❌ Correction failed: {e}");
            return Err(e);
        }
    }

    Ok(())
}
