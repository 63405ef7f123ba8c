use anyhow::{Result, bail};
use bioportal::Client;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Example program that calls the library API.
    // Pass a file path to also save the table as CSV.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let mut client = Client::from_env()?;
    client.print_datasets();

    let dataset = "Casos por fecha de coleccion";
    let table = match client.download(dataset)? {
        Ok(payload) => match payload.as_table() {
            Some(table) => table,
            None => bail!("expected a table for {}", dataset),
        },
        Err(e) => bail!(e),
    };
    println!("{table}");

    if let Some(path) = std::env::args_os().nth(1).map(PathBuf::from) {
        table.to_csv_file(&path)?;
        println!("Saved to {}", path.display());
    }
    Ok(())
}
