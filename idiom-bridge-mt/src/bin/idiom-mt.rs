use clap::{Arg, Command};
use idiom_bridge::{Direction, detect_language};
use idiom_bridge_mt::{HybridPipeline, MachineTranslator, MockMode, MockTranslator, NllbProvider};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Log filter used when `RUST_LOG` is unset
fn default_log_filter(verbose: bool) -> &'static str {
    if verbose {
        "warn,idiom_bridge=debug,idiom_bridge_mt=debug"
    } else {
        "warn"
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = Command::new("idiom-mt")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Idiom-aware English ↔ Sinhala translation")
        .arg(
            Arg::new("text")
                .help("Text to translate")
                .required_unless_present("list")
                .index(1),
        )
        .arg(
            Arg::new("direction")
                .long("direction")
                .short('d')
                .help("Translation direction: en-si, si-en or auto")
                .default_value("auto"),
        )
        .arg(
            Arg::new("idioms")
                .long("idioms")
                .short('i')
                .help("Idiom dictionary JSON file")
                .env("IDIOM_MAPPING_PATH")
                .default_value("data/idiom_mapping.json"),
        )
        .arg(
            Arg::new("corpus")
                .long("corpus")
                .short('c')
                .help("Parallel corpus JSON file for exact sentence matches")
                .env("CORPUS_PATH"),
        )
        .arg(
            Arg::new("mock")
                .long("mock")
                .short('m')
                .help("Use an echo translator instead of the NLLB endpoint")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("detect")
                .long("detect")
                .help("Only list the idioms found in the text")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("list")
                .long("list")
                .short('l')
                .help("Print the idiom dictionary and exit")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Show detailed translation process")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let idioms_path = matches
        .get_one::<String>("idioms")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data/idiom_mapping.json"));
    let corpus_path = matches.get_one::<String>("corpus").map(PathBuf::from);
    let use_mock = matches.get_flag("mock");
    let verbose = matches.get_flag("verbose");

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_log_filter(verbose))),
        )
        .with_writer(std::io::stderr)
        .init();

    // Only build a network client when a translation will actually run
    let needs_oracle = !matches.get_flag("list") && !matches.get_flag("detect");
    let oracle: Arc<dyn MachineTranslator> = if use_mock || !needs_oracle {
        Arc::new(MockTranslator::new(MockMode::NoOp))
    } else {
        if std::env::var("NLLB_ENDPOINT").is_err() {
            eprintln!("❌ NLLB_ENDPOINT environment variable not set");
            eprintln!("   Set it with: export NLLB_ENDPOINT=http://localhost:8000/translate");
            eprintln!("   Or use --mock to use the echo translator");
            return Err("Missing NLLB endpoint".into());
        }
        Arc::new(NllbProvider::from_env()?)
    };

    let pipeline = match HybridPipeline::from_files(&idioms_path, corpus_path.as_deref(), oracle)
    {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!("❌ Failed to load idioms: {}", e);
            return Err(e.into());
        }
    };

    if matches.get_flag("list") {
        for pair in pipeline.list_idioms() {
            println!("{}\t{}", pair.english, pair.sinhala);
        }
        return Ok(());
    }

    let Some(text) = matches.get_one::<String>("text") else {
        return Err("No text given".into());
    };
    let direction = match matches.get_one::<String>("direction").map(String::as_str) {
        None | Some("auto") => Direction::auto(text),
        Some(value) => value.parse::<Direction>()?,
    };

    if verbose {
        println!("📝 Source: \"{}\"", text);
        println!("🔤 Script: {:?}", detect_language(text));
        println!("🌍 {} → {}", direction.source(), direction.target());
        println!("📚 {} idioms loaded", pipeline.list_idioms().count());
        println!();
    }

    if matches.get_flag("detect") {
        let detected = pipeline.detect(text, direction.source());
        if detected.is_empty() {
            println!("No idioms found");
        }
        for idiom in &detected {
            println!(
                "[{}..{}] {} → {}",
                idiom.span.start,
                idiom.span.end,
                idiom.in_language(direction.source()),
                idiom.in_language(direction.target())
            );
        }
        return Ok(());
    }

    let result = match pipeline.translate(text, direction).await {
        Ok(result) => result,
        Err(e) => {
            eprintln!("❌ Translation failed: {}", e);
            return Err(e.into());
        }
    };

    if verbose {
        println!("🔍 Detected {} idiom(s):", result.detected_idioms.len());
        for idiom in &result.detected_idioms {
            println!("   \"{}\" → \"{}\"", idiom.english, idiom.sinhala);
        }
        println!("⚙️  Method: {}", result.method);
        println!("🎯 Idiom accuracy: {:.2}", result.idiom_accuracy);
        println!("📦 Corpus: {}", pipeline.corpus_status().label());
        println!();
        println!("🔧 Translation:");
    }
    println!("{}", result.translation);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_filter() {
        assert_eq!(default_log_filter(false), "warn");
        // --verbose turns on the pipeline stage logs
        let verbose = default_log_filter(true);
        assert!(verbose.contains("idiom_bridge_mt=debug"));
        assert!(EnvFilter::try_new(verbose).is_ok());
    }
}
