use anyhow::Context;
use clap::{Arg, Command};
use log::LevelFilter;
use phishguard::{AnalysisInput, AnalysisReport, HeuristicConfig, PhishingDetector, UrlReport};
use std::fs;
use std::path::Path;
use std::process;

fn main() {
    let matches = Command::new("phishguard")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Heuristic phishing risk scoring for emails and the links they contain")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Heuristics file (YAML); built-in tables are used when absent"),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Write the built-in heuristics to a YAML file")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("test-config")
                .long("test-config")
                .help("Validate the heuristics file and exit")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("FILE")
                .help("Email to analyze (JSON, or YAML for .yaml/.yml files)")
                .conflicts_with("url"),
        )
        .arg(
            Arg::new("url")
                .short('u')
                .long("url")
                .value_name("URL")
                .help("Score a single URL"),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .value_name("FORMAT")
                .help("Output format")
                .value_parser(["json", "text"])
                .default_value("text"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log every matched indicator")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if let Some(generate_path) = matches.get_one::<String>("generate-config") {
        generate_default_config(generate_path);
        return;
    }

    let config = match load_config(matches.get_one::<String>("config")) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading heuristics: {e:#}");
            process::exit(1);
        }
    };

    if matches.get_flag("test-config") {
        println!("🔍 Heuristics valid");
        println!("  Email phrases: {}", config.email.phrases.len());
        println!("  URL shorteners: {}", config.url.shorteners.len());
        println!("  Suspicious TLDs: {}", config.url.suspicious_tlds.len());
        println!(
            "  Legitimate domains: {}",
            config.url.legitimate_domains.len()
        );
        return;
    }

    let detector = PhishingDetector::from_config(&config);
    let json = matches
        .get_one::<String>("format")
        .is_some_and(|f| f == "json");

    let outcome = if let Some(url) = matches.get_one::<String>("url") {
        run_url(&detector, url, json)
    } else if let Some(input_path) = matches.get_one::<String>("input") {
        run_email(&detector, input_path, json)
    } else {
        eprintln!("Nothing to analyze: pass --input FILE or --url URL");
        process::exit(2);
    };

    if let Err(e) = outcome {
        eprintln!("❌ Analysis failed: {e:#}");
        process::exit(1);
    }
}

fn load_config(path: Option<&String>) -> anyhow::Result<HeuristicConfig> {
    match path {
        Some(path) if Path::new(path).exists() => HeuristicConfig::load_from_file(path),
        Some(path) => {
            log::warn!("Heuristics file '{path}' not found, using built-in heuristics");
            Ok(HeuristicConfig::default())
        }
        None => Ok(HeuristicConfig::default()),
    }
}

fn generate_default_config(path: &str) {
    let written = HeuristicConfig::default()
        .to_yaml()
        .and_then(|yaml| fs::write(path, yaml).context("Failed to write heuristics file"));

    match written {
        Ok(()) => println!("Default heuristics written to: {path}"),
        Err(e) => {
            eprintln!("Error writing heuristics file: {e:#}");
            process::exit(1);
        }
    }
}

fn read_input(path: &str) -> anyhow::Result<AnalysisInput> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read input file: {path}"))?;
    let is_yaml = Path::new(path)
        .extension()
        .is_some_and(|ext| ext == "yaml" || ext == "yml");

    if is_yaml {
        serde_yaml::from_str(&content).with_context(|| format!("Invalid YAML input: {path}"))
    } else {
        serde_json::from_str(&content).with_context(|| format!("Invalid JSON input: {path}"))
    }
}

fn run_email(detector: &PhishingDetector, input_path: &str, json: bool) -> anyhow::Result<()> {
    let input = read_input(input_path)?;
    let report = detector.analyze(&input)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_email_report(&input, &report);
    }
    Ok(())
}

fn run_url(detector: &PhishingDetector, url: &str, json: bool) -> anyhow::Result<()> {
    let report = detector.analyze_url(url)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_url_report(&report);
    }
    Ok(())
}

fn print_email_report(input: &AnalysisInput, report: &AnalysisReport) {
    println!("📧 {}", truncate_string(&input.subject, 70));
    println!("   From: {}", input.sender);
    println!();
    println!(
        "Email: {} (trust {}%, phishing {:.3})",
        report.email.risk_level, report.email.trust_percent, report.email.phishing_probability
    );
    println!("  {}", report.email.explanation);
    for flag in &report.email.flags {
        println!("  {flag}");
    }

    if !report.links.is_empty() {
        println!();
        println!("Links ({}):", report.links.len());
        for link in &report.links {
            println!(
                "  [{}] {} -> {} (trust {}%)",
                link.risk_level,
                truncate_string(&link.display_text, 40),
                truncate_string(&link.href, 60),
                link.trust_percent
            );
            for flag in &link.flags {
                println!("      {flag}");
            }
        }
    }

    println!();
    println!("Overall risk: {}", report.overall_risk_level);
}

fn print_url_report(report: &UrlReport) {
    println!("🔗 {}", report.url);
    println!(
        "Risk: {} (trust {}%, phishing {:.3})",
        report.risk_level, report.trust_percent, report.phishing_probability
    );
    println!("  {}", report.explanation);
    for flag in &report.flags {
        println!("  {flag}");
    }
    let f = &report.features;
    println!(
        "Features: length={} dots={} hyphens={} digits={} ip={} tld={} subdomains={} https={}",
        f.length,
        f.dot_count,
        f.hyphen_count,
        f.digit_count,
        f.has_ip,
        f.suspicious_tld,
        f.subdomain_count,
        f.is_https
    );
}

fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
