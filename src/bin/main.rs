//! CLI tool for disklist

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "disklist")]
#[command(about = "List the block devices attached to this machine", long_about = None)]
#[command(version)]
struct Cli {
    /// Show all devices, not just removable ones
    #[arg(short, long)]
    all: bool,

    /// Output format (json or text)
    #[arg(short, long, default_value = "text")]
    format: String,

    /// Probe these paths instead of enumerating the device registry
    paths: Vec<std::path::PathBuf>,
}

#[cfg(feature = "cli")]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use bytesize::ByteSize;
    use disklist::{enumerate_disks, probe_path, Disk};

    env_logger::init();

    let cli = Cli::parse();

    let mut disks: Vec<Disk> = if cli.paths.is_empty() {
        let list = enumerate_disks()?;
        if cli.all {
            list.into_vec()
        } else {
            list.removable().cloned().collect()
        }
    } else {
        cli.paths
            .iter()
            .map(probe_path)
            .collect::<disklist::Result<_>>()?
    };

    // Display order only; the library reports discovery order
    disks.sort_by(|a, b| a.devnode.cmp(&b.devnode));

    match cli.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&disks)?),
        _ => {
            for disk in &disks {
                let size = disk
                    .size
                    .map(|s| ByteSize::b(s).to_string())
                    .unwrap_or_else(|| "[unknown size]".to_string());
                let model = disk.model.as_deref().unwrap_or("[unknown model]");
                println!(
                    "{} | {} - {} ({}, removable: {})",
                    disk.devnode.display(),
                    model,
                    size,
                    disk.class,
                    disk.removable
                );
            }
            if disks.is_empty() && !cli.all && cli.paths.is_empty() {
                eprintln!("No removable devices found. Re-run with --all to list every device.");
            }
        }
    }

    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI features not enabled. Please compile with --features cli");
    std::process::exit(1);
}
