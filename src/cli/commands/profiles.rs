//! Profiles command implementation

use super::EXIT_SUCCESS;
use crate::core::profile::{estimate_performance_impact, ImpactLevel, ProfilePreset};
use clap::Args;

/// Arguments for the profiles command
#[derive(Args, Debug)]
pub struct ProfilesArgs {
    /// Print the full toggles of every preset as JSON
    #[arg(long)]
    pub json: bool,
}

impl ProfilesArgs {
    /// Execute the profiles command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        if self.json {
            let presets: serde_json::Map<String, serde_json::Value> = ProfilePreset::all()
                .iter()
                .map(|preset| Ok((preset.to_string(), serde_json::to_value(preset.profile())?)))
                .collect::<Result<_, serde_json::Error>>()?;
            println!("{}", serde_json::to_string_pretty(&presets)?);
            return Ok(EXIT_SUCCESS);
        }

        println!("Collection profiles:");
        println!();
        for preset in ProfilePreset::all() {
            let score = estimate_performance_impact(&preset.profile());
            println!(
                "  {:<18} impact {:.2} ({})",
                preset.as_str(),
                score,
                ImpactLevel::from_score(score)
            );
            println!("  {:<18} {}", "", preset.description());
        }
        println!();
        Ok(EXIT_SUCCESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_profiles_lists_every_preset() {
        assert_eq!(ProfilesArgs { json: false }.execute().await.unwrap(), 0);
        assert_eq!(ProfilesArgs { json: true }.execute().await.unwrap(), 0);
    }
}
