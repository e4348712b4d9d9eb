use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Normalize a user-facing label: case-insensitive, with spaces, hyphens and
/// underscores treated alike.
fn normalize_label(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '_' { '-' } else { c })
        .collect()
}

/// Dietary pattern as entered in the lifestyle profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Diet {
    #[default]
    Vegetarian,
    Vegan,
    Pescatarian,
    Keto,
    Paleo,
    GlutenFree,
    DairyFree,
    #[serde(alias = "non-veg")]
    NonVegetarian,
    /// Any label we do not recognize; carries no penalty
    #[serde(other)]
    Unknown,
}

impl Diet {
    pub const ALL: [Diet; 8] = [
        Diet::Vegetarian,
        Diet::Vegan,
        Diet::Pescatarian,
        Diet::Keto,
        Diet::Paleo,
        Diet::GlutenFree,
        Diet::DairyFree,
        Diet::NonVegetarian,
    ];

    /// Parse a label, mapping anything unrecognized to `Unknown`
    pub fn from_label(s: &str) -> Self {
        match normalize_label(s).as_str() {
            "vegetarian" => Diet::Vegetarian,
            "vegan" => Diet::Vegan,
            "pescatarian" => Diet::Pescatarian,
            "keto" => Diet::Keto,
            "paleo" => Diet::Paleo,
            "gluten-free" => Diet::GlutenFree,
            "dairy-free" => Diet::DairyFree,
            "non-vegetarian" | "non-veg" => Diet::NonVegetarian,
            _ => Diet::Unknown,
        }
    }
}

impl fmt::Display for Diet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diet::Vegetarian => write!(f, "Vegetarian"),
            Diet::Vegan => write!(f, "Vegan"),
            Diet::Pescatarian => write!(f, "Pescatarian"),
            Diet::Keto => write!(f, "Keto"),
            Diet::Paleo => write!(f, "Paleo"),
            Diet::GlutenFree => write!(f, "Gluten Free"),
            Diet::DairyFree => write!(f, "Dairy Free"),
            Diet::NonVegetarian => write!(f, "Non-vegetarian"),
            Diet::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Smoking habit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SmokingStatus {
    #[default]
    NonSmoker,
    Occasional,
    Regular,
    Heavy,
}

impl SmokingStatus {
    pub const ALL: [SmokingStatus; 4] = [
        SmokingStatus::NonSmoker,
        SmokingStatus::Occasional,
        SmokingStatus::Regular,
        SmokingStatus::Heavy,
    ];
}

impl FromStr for SmokingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "non-smoker" | "none" | "never" => Ok(SmokingStatus::NonSmoker),
            "occasional" => Ok(SmokingStatus::Occasional),
            "regular" => Ok(SmokingStatus::Regular),
            "heavy" => Ok(SmokingStatus::Heavy),
            _ => Err(format!("Unknown smoking status: {}", s)),
        }
    }
}

impl fmt::Display for SmokingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SmokingStatus::NonSmoker => write!(f, "Non-smoker"),
            SmokingStatus::Occasional => write!(f, "Occasional"),
            SmokingStatus::Regular => write!(f, "Regular"),
            SmokingStatus::Heavy => write!(f, "Heavy"),
        }
    }
}

/// Alcohol consumption habit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum AlcoholConsumption {
    #[default]
    None,
    Occasional,
    Moderate,
    Heavy,
}

impl AlcoholConsumption {
    pub const ALL: [AlcoholConsumption; 4] = [
        AlcoholConsumption::None,
        AlcoholConsumption::Occasional,
        AlcoholConsumption::Moderate,
        AlcoholConsumption::Heavy,
    ];
}

impl FromStr for AlcoholConsumption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "none" | "never" => Ok(AlcoholConsumption::None),
            "occasional" => Ok(AlcoholConsumption::Occasional),
            "moderate" => Ok(AlcoholConsumption::Moderate),
            "heavy" => Ok(AlcoholConsumption::Heavy),
            _ => Err(format!("Unknown alcohol consumption: {}", s)),
        }
    }
}

impl fmt::Display for AlcoholConsumption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlcoholConsumption::None => write!(f, "None"),
            AlcoholConsumption::Occasional => write!(f, "Occasional"),
            AlcoholConsumption::Moderate => write!(f, "Moderate"),
            AlcoholConsumption::Heavy => write!(f, "Heavy"),
        }
    }
}

/// Current lifestyle inputs for scoring
///
/// Always pass the profile as it is now; nothing derived from it is cached.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct LifestyleProfile {
    pub diet: Diet,
    pub smoking: SmokingStatus,
    pub alcohol: AlcoholConsumption,
    /// Stress percentage (0-100)
    pub stress_percent: f64,
}

impl LifestyleProfile {
    pub fn new(
        diet: Diet,
        smoking: SmokingStatus,
        alcohol: AlcoholConsumption,
        stress_percent: f64,
    ) -> Self {
        Self {
            diet,
            smoking,
            alcohol,
            stress_percent,
        }
    }
}

/// A single blood pressure observation in mmHg
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct VitalsSample {
    pub systolic: Option<f64>,
    pub diastolic: Option<f64>,
}

impl VitalsSample {
    pub fn blood_pressure(systolic: f64, diastolic: f64) -> Self {
        Self {
            systolic: Some(systolic),
            diastolic: Some(diastolic),
        }
    }
}

/// The two independent plan lifecycles a user can have
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanKind {
    Workout,
    RaceTraining,
}

impl PlanKind {
    pub const ALL: [PlanKind; 2] = [PlanKind::Workout, PlanKind::RaceTraining];
}

impl fmt::Display for PlanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanKind::Workout => write!(f, "workout"),
            PlanKind::RaceTraining => write!(f, "race-training"),
        }
    }
}

/// How hard the finished plan felt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    JustRight,
    Difficult,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::JustRight => "just_right",
            Difficulty::Difficult => "difficult",
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "easy" | "too-easy" => Ok(Difficulty::Easy),
            "just-right" => Ok(Difficulty::JustRight),
            "difficult" | "too-difficult" => Ok(Difficulty::Difficult),
            _ => Err(format!("Unknown difficulty: {}", s)),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the user wants the next plan to be like
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preference {
    Easier,
    Same,
    Harder,
}

impl Preference {
    pub fn as_str(&self) -> &'static str {
        match self {
            Preference::Easier => "easier",
            Preference::Same => "same",
            Preference::Harder => "harder",
        }
    }
}

impl FromStr for Preference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "easier" => Ok(Preference::Easier),
            "same" => Ok(Preference::Same),
            "harder" => Ok(Preference::Harder),
            _ => Err(format!("Unknown preference: {}", s)),
        }
    }
}

impl fmt::Display for Preference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
