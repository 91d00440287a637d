use phishguard::{AnalysisInput, LinkInput, PhishingDetector};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    println!("Testing a typical account-suspension phishing email...");

    let input = AnalysisInput {
        sender: "security@paypa1-support.xyz".to_string(),
        subject: "URGENT: Your account has been suspended".to_string(),
        body_text: String::new(),
        body_html: r#"<html><body>
<p>We detected unusual activity on your account.</p>
<p>Please <a href="http://192.168.10.4/verify">click here</a> to verify your identity
and reactivate access before your session will expire.</p>
<p><a href="mailto:help@paypa1-support.xyz">Contact support</a></p>
<p><a href="https://bit.ly/3Acct">Reset password</a></p>
<p><a href="https://www.paypal.com/help">Help center</a></p>
</body></html>"#
            .to_string(),
        links: vec![
            LinkInput::new("http://192.168.10.4/verify", "click here"),
            LinkInput::new("mailto:help@paypa1-support.xyz", "Contact support"),
            LinkInput::new("https://bit.ly/3Acct", "Reset password"),
            LinkInput::new("https://www.paypal.com/help", "Help center"),
        ],
    };

    let detector = PhishingDetector::new();
    let report = detector.analyze(&input)?;

    println!(
        "Email: {} (trust {}%)",
        report.email.risk_level, report.email.trust_percent
    );
    for flag in &report.email.flags {
        println!("  {}", flag);
    }

    for link in &report.links {
        println!(
            "Link {} -> {} (trust {}%)",
            link.href, link.risk_level, link.trust_percent
        );
    }

    println!("Overall: {}", report.overall_risk_level);

    if report.links.iter().any(|l| l.href.starts_with("mailto:")) {
        println!("❌ mailto link should have been skipped");
    } else {
        println!("✅ mailto link skipped");
    }

    Ok(())
}
