//! The `backlog init` command.

use std::path::Path;

use anyhow::{Context, Result};

pub fn execute() -> Result<()> {
    write_if_absent(Path::new("backlog.toml"), SAMPLE_CONFIG)?;
    write_if_absent(Path::new("questionnaire.toml"), SAMPLE_QUESTIONNAIRE)?;

    println!("\nNext steps:");
    println!("  1. Edit questionnaire.toml to fit your team");
    println!("  2. Run: backlog validate --questionnaire questionnaire.toml");
    println!("  3. Run: backlog add --title \"My feature\" --answer No ...");

    Ok(())
}

fn write_if_absent(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# backlog configuration

questionnaire = "questionnaire.toml"

[store]
type = "json"
path = "backlog-data/requests.json"

# Uncomment to cap requests per client. Counters are kept in
# rate-limits.json beside the store unless state_path names another file.
# [rate_limit]
# state_path = "backlog-data/rate-limits.json"
#
# [rate_limit.general]
# window_ms = 86400000
# max_requests = 20
#
# [rate_limit.write]
# window_ms = 86400000
# max_requests = 10
"#;

const SAMPLE_QUESTIONNAIRE: &str = r#"[questionnaire]
id = "backlog-estimation"
name = "Backlog estimation"

[[questions]]
id = "external_integration"
text = "Do we have to integrate or adapt the solution of an external partner?"
options = [
    { label = "No", score = 0 },
    { label = "Yes, standard API, already used by lot of other clients", score = 100 },
    { label = "Yes, but partner creates specifications for us", score = 250 },
    { label = "No, but we have to enhance their system drastically", score = 75 },
]

[[questions]]
id = "app_touch"
text = "Do we have to touch all parts of the app?"
options = [
    { label = "Yes", score = 100 },
    { label = "No, but 2 YS squads impacted", score = 75 },
    { label = "No only 1 squad", score = 30 },
]

[[questions]]
id = "new_business"
text = "Is this new business for the company?"
options = [
    { label = "No", score = 0 },
    { label = "Yes, but already exists at Company 2", score = 50 },
    { label = "Yes for 1 & 2, but not complex", score = 100 },
    { label = "Yes for 1 & 2, and complex", score = 150 },
]

[[questions]]
id = "future_scope"
text = "Is the future scope clear?"
options = [
    { label = "Yes, clear and probability of change is very low", score = 50 },
    { label = "Yes, but high probability of change is high", score = 75 },
    { label = "No", score = 100 },
]

[[questions]]
id = "swe_dependencies"
text = "Do we have very high dependencies on other engineering teams?"
options = [
    { label = "No", score = 0 },
    { label = "Yes, high impact on multiple teams", score = 300 },
    { label = "Yes, high impact on one team or medium impact on multiple teams", score = 150 },
    { label = "Yes, but small impacts", score = 50 },
]

[[questions]]
id = "fraud_compliance"
text = "Do we have impacts on fraud or compliance workflows?"
options = [
    { label = "No", score = 0 },
    { label = "Yes", score = 20 },
]

[[questions]]
id = "it_dependencies"
text = "Do we have IT dependencies on new hardware to order?"
options = [
    { label = "No", score = 0 },
    { label = "Yes", score = 50 },
]

[[questions]]
id = "security_analysis"
text = "Do we need a complex IT security or legal analysis?"
options = [
    { label = "No", score = 0 },
    { label = "Yes, with potential big impacts on solution", score = 150 },
    { label = "Yes, but no impact on solution", score = 20 },
]

[[questions]]
id = "new_technology"
text = "Do we have to use a new technology?"
options = [
    { label = "No", score = 0 },
    { label = "Yes", score = 100 },
]

[[questions]]
id = "new_architecture"
text = "Do we have to put in place a new architecture?"
options = [
    { label = "No, only upgrade on current one", score = 0 },
    { label = "Yes, but a new small piece", score = 20 },
    { label = "Yes, and big impact on current one", score = 100 },
]

# Inclusive upper bounds; the last band has no max.
[[complexity_bands]]
max = 100
label = "Low Complexity"

[[complexity_bands]]
max = 250
label = "Medium Complexity"

[[complexity_bands]]
max = 400
label = "High Complexity"

[[complexity_bands]]
label = "Very High Complexity"

[[time_bands]]
max = 50
label = "Less than 1 week"

[[time_bands]]
max = 150
label = "1-3 weeks"

[[time_bands]]
max = 300
label = "1-2 months"

[[time_bands]]
max = 500
label = "3-6 months"

[[time_bands]]
label = "More than 6 months"
"#;
