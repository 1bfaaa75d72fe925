// codex-g2p: normalize Arabic text and print its phoneme tokens
use anyhow::{Context, Result};
use std::io::Read;
use std::path::PathBuf;

use codex_tts::{Engine, EngineConfig};

const USAGE: &str = "\
Usage: codex-g2p [OPTIONS] [TEXT...]

Reads TEXT, or stdin when no text is given, and prints one phoneme token per line.

Options:
  --pausal               read the utterance in pausal form
  --json                 print tokens as JSON
  --normalize-only       print the normalized text and stop
  --config PATH          load the configuration from PATH
  --write-config PATH    write the effective configuration to PATH and exit
  -h, --help             show this help";

#[derive(Debug, Default)]
struct Args {
    pausal: bool,
    json: bool,
    normalize_only: bool,
    config: Option<PathBuf>,
    write_config: Option<PathBuf>,
    text: Vec<String>,
    help: bool,
}

fn parse_args(raw: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut args = Args::default();
    let mut raw = raw.into_iter();

    while let Some(arg) = raw.next() {
        match arg.as_str() {
            "--pausal" => args.pausal = true,
            "--json" => args.json = true,
            "--normalize-only" => args.normalize_only = true,
            "-h" | "--help" => args.help = true,
            "--config" => {
                let path = raw.next().context("--config needs a path")?;
                args.config = Some(PathBuf::from(path));
            }
            "--write-config" => {
                let path = raw.next().context("--write-config needs a path")?;
                args.write_config = Some(PathBuf::from(path));
            }
            "--" => {
                args.text.extend(raw.by_ref());
            }
            flag if flag.starts_with("--") => anyhow::bail!("unknown option: {}\n\n{}", flag, USAGE),
            _ => args.text.push(arg),
        }
    }

    Ok(args)
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    if args.help {
        println!("{}", USAGE);
        return Ok(());
    }

    // 1. Configuration
    let config = match &args.config {
        Some(path) => EngineConfig::load_from(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => EngineConfig::load()?,
    };

    if let Some(path) = &args.write_config {
        config.save_to(path)?;
        eprintln!("Configuration written to {}", path.display());
        return Ok(());
    }

    let engine = Engine::new(config)?;
    tracing::debug!("codex-g2p {}", codex_tts::engine_version());

    // 2. Input
    let input = if args.text.is_empty() {
        let mut bytes = Vec::new();
        std::io::stdin()
            .read_to_end(&mut bytes)
            .context("failed to read stdin")?;
        engine.normalize_bytes(&bytes)?
    } else {
        engine.normalize(&args.text.join(" "))
    };

    if args.normalize_only {
        println!("{}", input.trim_end());
        return Ok(());
    }

    // 3. Conversion
    let tokens = engine.convert(&input, args.pausal)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&tokens)?);
    } else {
        for token in &tokens {
            let mut flags = String::new();
            if token.is_emphatic {
                flags.push_str(" emphatic");
            }
            if token.duration_hint > 0.0 {
                flags.push_str(&format!(" x{}", token.duration_hint));
            }
            println!("{}{}", token.symbol, flags);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_flags() {
        let parsed = args(&["--pausal", "--json", "كتاب", "قلم"]).unwrap();
        assert!(parsed.pausal);
        assert!(parsed.json);
        assert!(!parsed.normalize_only);
        assert_eq!(parsed.text, ["كتاب", "قلم"]);
    }

    #[test]
    fn test_parse_paths() {
        let parsed = args(&["--config", "a.json", "--write-config", "b.json"]).unwrap();
        assert_eq!(parsed.config, Some(PathBuf::from("a.json")));
        assert_eq!(parsed.write_config, Some(PathBuf::from("b.json")));
        assert!(parsed.text.is_empty());
    }

    #[test]
    fn test_parse_errors() {
        assert!(args(&["--config"]).is_err());
        assert!(args(&["--verbose"]).is_err());
        // after "--" everything is text
        let parsed = args(&["--", "--pausal"]).unwrap();
        assert!(!parsed.pausal);
        assert_eq!(parsed.text, ["--pausal"]);
    }
}
