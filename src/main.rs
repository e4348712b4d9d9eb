use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use std::fs;
use std::path::PathBuf;
use tabled::{Table, Tabled};

use fitwell::config::{AppConfig, ProfileSettings};
use fitwell::logging::init_logging;
use fitwell::risk::RiskCategory;
use fitwell::{
    AlcoholConsumption, CompletionTracker, Diet, DiseaseRiskEstimator, HealthStanding,
    LifestyleProfile, RiskLevel, SmokingStatus, StressBand, StressEstimator, TrainingPlan,
    VitalsSample, WellnessScoreCalculator,
};

/// FitWell - Health signal and adaptive plan engine
///
/// Scores lifestyle inputs, estimates disease risks and reports training plan
/// progress.
#[derive(Parser)]
#[command(name = "fitwell")]
#[command(version)]
#[command(about = "Health signal and adaptive plan engine", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Lifestyle overrides; anything omitted comes from the stored profile
#[derive(Args, Debug, Clone, Default)]
struct ProfileArgs {
    /// Diet (vegetarian, vegan, pescatarian, keto, paleo, gluten-free, dairy-free, non-vegetarian)
    #[arg(long)]
    diet: Option<String>,

    /// Smoking status (non-smoker, occasional, regular, heavy)
    #[arg(long)]
    smoking: Option<SmokingStatus>,

    /// Alcohol consumption (none, occasional, moderate, heavy)
    #[arg(long)]
    alcohol: Option<AlcoholConsumption>,

    /// Explicit stress percentage (0-100)
    #[arg(long)]
    stress: Option<f64>,

    /// Systolic blood pressure (mmHg)
    #[arg(long, requires = "diastolic")]
    systolic: Option<f64>,

    /// Diastolic blood pressure (mmHg)
    #[arg(long, requires = "systolic")]
    diastolic: Option<f64>,
}

impl ProfileArgs {
    fn apply(&self, base: &ProfileSettings) -> ProfileSettings {
        let mut profile = base.clone();
        if let Some(diet) = &self.diet {
            profile.diet = Some(Diet::from_label(diet));
        }
        if self.smoking.is_some() {
            profile.smoking = self.smoking;
        }
        if self.alcohol.is_some() {
            profile.alcohol = self.alcohol;
        }
        if let (Some(systolic), Some(diastolic)) = (self.systolic, self.diastolic) {
            profile.vitals = Some(VitalsSample::blood_pressure(systolic, diastolic));
            // A fresh reading replaces a stale explicit value unless one is given too
            profile.stress_percent = None;
        }
        if let Some(stress) = self.stress {
            profile.stress_percent = Some(stress);
        }
        profile
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate the composite wellness score
    Score {
        #[command(flatten)]
        profile: ProfileArgs,
    },

    /// Estimate cardiac, hepatic and renal risk
    Risk {
        #[command(flatten)]
        profile: ProfileArgs,
    },

    /// Estimate stress from a blood pressure reading
    Stress {
        /// Systolic blood pressure (mmHg)
        #[arg(long)]
        systolic: f64,

        /// Diastolic blood pressure (mmHg)
        #[arg(long)]
        diastolic: f64,
    },

    /// Show or update the stored lifestyle profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Inspect training plans
    Plan {
        #[command(subcommand)]
        action: PlanAction,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Print the stored profile
    Show,
    /// Overwrite stored lifestyle fields
    Set {
        #[command(flatten)]
        profile: ProfileArgs,

        /// Forget the explicit stress value
        #[arg(long)]
        clear_stress: bool,
    },
}

#[derive(Subcommand)]
enum PlanAction {
    /// Report completion progress of a plan stored as JSON
    Progress {
        /// Plan file path
        #[arg(short, long)]
        file: PathBuf,
    },
}

#[derive(Tabled)]
struct RiskRow {
    #[tabled(rename = "Condition")]
    condition: &'static str,
    #[tabled(rename = "Risk")]
    risk: String,
    #[tabled(rename = "Level")]
    level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(AppConfig::default_config_path);
    let mut config = AppConfig::load_or_default(&config_path)?;
    init_logging(&config.logging.clone().with_verbosity(cli.verbose))?;

    match cli.command {
        Commands::Score { profile } => {
            let lifestyle = profile.apply(&config.profile).lifestyle();
            print_score(&lifestyle);
        }

        Commands::Risk { profile } => {
            let lifestyle = profile.apply(&config.profile).lifestyle();
            print_risks(&lifestyle);
        }

        Commands::Stress { systolic, diastolic } => {
            let stress = StressEstimator::from_blood_pressure(systolic, diastolic);
            let band = StressBand::from_percent(stress);
            println!("{}", "Stress estimate".cyan().bold());
            println!("  Blood pressure: {}/{} mmHg", systolic, diastolic);
            println!("  Stress: {} ({})", format!("{:.1}%", stress).bold(), band.description());
        }

        Commands::Profile { action } => match action {
            ProfileAction::Show => print_profile(&config.profile),
            ProfileAction::Set {
                profile,
                clear_stress,
            } => {
                let mut updated = profile.apply(&config.profile);
                if clear_stress {
                    updated.stress_percent = None;
                }
                config.set_profile(updated);
                config.save_to_file(&config_path)?;
                println!("{}", "✓ Profile updated".green());
                print_profile(&config.profile);
            }
        },

        Commands::Plan { action } => match action {
            PlanAction::Progress { file } => {
                let content = fs::read_to_string(&file)
                    .with_context(|| format!("Failed to read plan file: {}", file.display()))?;
                let plan: TrainingPlan = serde_json::from_str(&content)
                    .with_context(|| "Failed to parse plan JSON")?;
                if let Err(err) = plan.validate() {
                    anyhow::bail!("{}", err.user_message());
                }
                print_progress(&plan);
            }
        },
    }

    Ok(())
}

fn print_score(profile: &LifestyleProfile) {
    let score = WellnessScoreCalculator::calculate(profile);
    let standing = score.standing();
    let score_text = format!("{}/100", score.score);
    let colored_score = match standing {
        HealthStanding::Healthy => score_text.green(),
        HealthStanding::Good | HealthStanding::NeedsImprovement => score_text.yellow(),
        HealthStanding::NeedsAttention => score_text.red(),
    };

    println!("{}", "Wellness score".blue().bold());
    println!("  Score: {}", colored_score.bold());
    println!("  {}", standing.message());
    println!(
        "  Stress: {:.1}% ({})",
        profile.stress_percent,
        StressBand::from_percent(profile.stress_percent)
    );
}

fn print_risks(profile: &LifestyleProfile) {
    let risks = DiseaseRiskEstimator::estimate(profile);
    let rows: Vec<RiskRow> = RiskCategory::ALL
        .iter()
        .map(|category| {
            let value = risks.get(*category);
            let level = RiskLevel::classify(value);
            let level_text = match level {
                RiskLevel::Low => level.to_string().green(),
                RiskLevel::Moderate => level.to_string().yellow(),
                RiskLevel::High => level.to_string().red(),
            };
            RiskRow {
                condition: category.label(),
                risk: format!("{}%", value),
                level: level_text.to_string(),
            }
        })
        .collect();

    println!("{}", "Disease risks".magenta().bold());
    println!("{}", Table::new(rows));
}

fn print_profile(profile: &ProfileSettings) {
    println!("{}", "Lifestyle profile".white().bold());
    if !profile.has_lifestyle_data() {
        println!("{}", "  Lifestyle info not set, showing defaults".dimmed());
    }
    println!("  Diet: {}", label_or_default(profile.diet));
    println!("  Smoking: {}", label_or_default(profile.smoking));
    println!("  Alcohol: {}", label_or_default(profile.alcohol));
    match (profile.stress_percent, profile.vitals) {
        (Some(stress), _) => println!("  Stress: {:.1}% (entered)", stress),
        (None, Some(vitals)) => match StressEstimator::estimate(&vitals) {
            Some(stress) => println!("  Stress: {:.1}% (from blood pressure)", stress),
            None => println!("  Stress: unknown (incomplete blood pressure)"),
        },
        (None, None) => println!("  Stress: unknown"),
    }
}

fn label_or_default<T: std::fmt::Display + Default>(value: Option<T>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => format!("{} (default)", T::default()),
    }
}

fn print_progress(plan: &TrainingPlan) {
    let progress = CompletionTracker::progress(plan);
    println!("{}", plan.title.bold());
    println!("  Kind: {}", plan.kind);
    println!(
        "  Progress: {}/{} ({}%)",
        progress.completed,
        progress.total,
        progress.percent()
    );

    for item in plan.countable_items() {
        let mark = if item.completed { "✓".green() } else { "·".dimmed() };
        println!("    {} item {}", mark, item.id);
    }

    if progress.is_complete() {
        println!("{}", "✓ All items completed, feedback pending".green());
    }
}
