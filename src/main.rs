use clap::Parser;
use std::fs;

/// Fixed filenames: the plaintext document and its encoded artifact.
const PLAIN_FILE: &str = "file";
const ARTIFACT_FILE: &str = "file.fc";

#[derive(Parser)]
#[command(name = "fc", about = "Fast Compress, the .fc text artifact CLI")]
struct Cli {
    /// Compress `file` into `file.fc`
    #[arg(long, conflicts_with = "decompress")]
    compress: bool,
    /// Decompress `file.fc` back into `file` (default mode)
    #[arg(long)]
    decompress: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.compress {
        let text = fs::read_to_string(PLAIN_FILE)?;
        fs::write(ARTIFACT_FILE, fastcompress::compress(&text)?)?;
        println!("Compressing {PLAIN_FILE}... Done");
        println!("See output: {ARTIFACT_FILE}");
    } else {
        let artifact = fs::read_to_string(ARTIFACT_FILE)?;
        fs::write(PLAIN_FILE, fastcompress::decompress(&artifact)?)?;
        println!("Decompressing {ARTIFACT_FILE}... Done");
        println!("See output: {PLAIN_FILE}");
    }

    Ok(())
}
