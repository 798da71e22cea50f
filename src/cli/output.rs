use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;
use wd_bridge::{ElementModel, WireResponse};

#[derive(Clone, Debug, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
    Yaml,
}

/// Prints a command response. Human output lists each returned handle with
/// the text and resource id captured when it was issued.
pub fn print_response(
    format: &OutputFormat,
    response: &WireResponse,
    elements: &[(String, ElementModel)],
) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(response)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(response)?),
        OutputFormat::Human => {
            if let Some(message) = response.message() {
                println!("status {}: {}", response.status, message);
                return Ok(());
            }
            if elements.is_empty() {
                match response.value.as_str() {
                    Some(text) => println!("{text}"),
                    None => println!("no elements"),
                }
                return Ok(());
            }
            for (handle, model) in elements {
                println!(
                    "{handle}\t{}\ttext={:?}\tid={:?}",
                    model.attribute("className").unwrap_or_default(),
                    model.text,
                    model.attribute("resourceId").unwrap_or_default()
                );
            }
        }
    }
    Ok(())
}

/// Prints any serializable report; human output falls back to YAML.
pub fn print_report<T: Serialize>(format: &OutputFormat, report: &T) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Yaml | OutputFormat::Human => print!("{}", serde_yaml::to_string(report)?),
    }
    Ok(())
}
