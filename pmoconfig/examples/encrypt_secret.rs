//! Outil CLI pour chiffrer/déchiffrer les secrets de la configuration
//!
//! Usage:
//!   cargo run -p pmoconfig --example encrypt_secret -- encrypt "client_secret"
//!   cargo run -p pmoconfig --example encrypt_secret -- decrypt "encrypted:ABC123..."

use anyhow::Result;
use pmoconfig::encryption::{decrypt_secret, encrypt_secret, is_encrypted};

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    match (args.get(1).map(String::as_str), args.get(2)) {
        (Some("encrypt"), Some(secret)) => {
            let encrypted = encrypt_secret(secret)?;
            println!("{}", encrypted);
            println!();
            println!("Paste this value into config.yaml, for example:");
            println!("  sources:");
            println!("    spotify:");
            println!("      client_secret: \"{}\"", encrypted);
        }
        (Some("decrypt"), Some(value)) => {
            if !is_encrypted(value) {
                eprintln!("Value is not encrypted (missing 'encrypted:' prefix)");
                std::process::exit(1);
            }
            println!("{}", decrypt_secret(value)?);
        }
        _ => print_usage(),
    }

    Ok(())
}

fn print_usage() {
    println!("Usage:");
    println!("  encrypt_secret encrypt <secret>");
    println!("  encrypt_secret decrypt <encrypted:...>");
}
