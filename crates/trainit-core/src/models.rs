//! Backend Models
//!
//! Records exchanged with the TrainIt REST API, plus the request payloads
//! the dashboard sends.

use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::FormError;

/// Largest session estimate the dashboard accepts for a step
pub const MAX_ESTIMATED_SESSIONS: u32 = 999;

/// Logged-in user identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u32,
    pub email: String,
    #[serde(default)]
    pub organization_id: Option<u32>,
}

impl User {
    /// Placeholder identity used until `/auth/me` answers
    pub fn from_email(email: &str) -> Self {
        Self {
            id: 0,
            email: email.to_string(),
            organization_id: None,
        }
    }
}

/// Species offered by the roster form.
///
/// Values the backend knows but this list does not are kept in `Other`
/// so a single unexpected row never breaks the whole roster.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Species {
    BelugaWhale,
    BottleNoseDolphin,
    CommonDolphin,
    PacificWhiteSidedDolphin,
    FalseKillerWhale,
    KillerWhale,
    BlackSeaDolphin,
    Manatee,
    CaliforniaSeaLion,
    SeaOtter,
    HarborSeal,
    FurSeal,
    GreySeal,
    NorthernElephantSeal,
    Walrus,
    Other(String),
}

impl Species {
    pub const ALL: [Species; 15] = [
        Species::BelugaWhale,
        Species::BottleNoseDolphin,
        Species::CommonDolphin,
        Species::PacificWhiteSidedDolphin,
        Species::FalseKillerWhale,
        Species::KillerWhale,
        Species::BlackSeaDolphin,
        Species::Manatee,
        Species::CaliforniaSeaLion,
        Species::SeaOtter,
        Species::HarborSeal,
        Species::FurSeal,
        Species::GreySeal,
        Species::NorthernElephantSeal,
        Species::Walrus,
    ];

    /// Wire value
    pub fn as_str(&self) -> &str {
        match self {
            Species::BelugaWhale => "Beluga Whale",
            Species::BottleNoseDolphin => "Bottle Nose Dolphin",
            Species::CommonDolphin => "Common Dolphin",
            Species::PacificWhiteSidedDolphin => "Pacific White-sided Dolphin",
            Species::FalseKillerWhale => "False Killer Whale",
            Species::KillerWhale => "Killer Whale",
            Species::BlackSeaDolphin => "Black Sea Dolphin",
            Species::Manatee => "Manatee",
            Species::CaliforniaSeaLion => "California Sea Lion",
            Species::SeaOtter => "Sea Otter",
            Species::HarborSeal => "Harbor Seal",
            Species::FurSeal => "Fur Seal",
            Species::GreySeal => "Grey Seal",
            Species::NorthernElephantSeal => "Northern Elephant Seal",
            Species::Walrus => "Walrus",
            Species::Other(name) => name,
        }
    }

    /// Name shown in the species selector
    pub fn label(&self) -> &str {
        match self {
            Species::NorthernElephantSeal => "Elephant Seal",
            other => other.as_str(),
        }
    }
}

impl From<String> for Species {
    fn from(value: String) -> Self {
        Species::ALL
            .iter()
            .find(|s| s.as_str() == value)
            .cloned()
            .unwrap_or(Species::Other(value))
    }
}

impl From<Species> for String {
    fn from(value: Species) -> Self {
        value.as_str().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Sex {
    Male,
    Female,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Sex {
    pub const ALL: [Sex; 3] = [Sex::Male, Sex::Female, Sex::Unknown];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "Male",
            Sex::Female => "Female",
            Sex::Unknown => "Unknown",
        }
    }
}

impl FromStr for Sex {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Sex::ALL
            .into_iter()
            .find(|sex| sex.as_str() == s)
            .ok_or(FormError::Missing("sex"))
    }
}

/// Training plan category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Husbandry,
    Aerial,
    Conceptual,
    Stationary,
    Vocal,
    Interaction,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Husbandry,
        Category::Aerial,
        Category::Conceptual,
        Category::Stationary,
        Category::Vocal,
        Category::Interaction,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Husbandry => "Husbandry",
            Category::Aerial => "Aerial",
            Category::Conceptual => "Conceptual",
            Category::Stationary => "Stationary",
            Category::Vocal => "Vocal",
            Category::Interaction => "Interaction",
        }
    }
}

impl FromStr for Category {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or(FormError::Missing("category"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animal {
    pub id: u32,
    pub name: String,
    pub species: Species,
    pub sex: Sex,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingPlan {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cue_description: Option<String>,
    #[serde(default)]
    pub criteria: Option<String>,
    #[serde(default, deserialize_with = "lenient_category")]
    pub category: Option<Category>,
    #[serde(default)]
    pub started_date: Option<NaiveDate>,
    #[serde(default)]
    pub animal_id: u32,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub order: u32,
    #[serde(default = "one", deserialize_with = "positive_sessions")]
    pub estimated_sessions: u32,
    #[serde(default)]
    pub is_complete: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionNote {
    pub id: u32,
    #[serde(default)]
    pub step_id: u32,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub session_count: Option<u32>,
    #[serde(default)]
    pub performed_date: Option<NaiveDate>,
}

impl SessionNote {
    /// Note text if it has any visible content
    pub fn text(&self) -> Option<&str> {
        self.note.as_deref().filter(|n| !n.trim().is_empty())
    }
}

fn one() -> u32 {
    1
}

/// Null or zero session estimates become 1 so layout offsets stay strictly increasing
fn positive_sessions<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = Option::<u32>::deserialize(deserializer)?;
    Ok(value.unwrap_or(1).max(1))
}

fn lenient_category<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Category>, D::Error> {
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.parse().ok()))
}

// ========================
// Request Payloads
// ========================

#[derive(Debug, Clone, Serialize)]
pub struct Credentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub organization_name: &'a str,
}

/// `/auth/login` answer; `/auth/signup` may carry the same token fields
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignupResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub id: Option<u32>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub organization_id: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewAnimal {
    pub name: String,
    pub species: Species,
    pub sex: Sex,
    pub age: Option<u32>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewStep {
    pub name: String,
    pub description: String,
    pub order: u32,
    pub estimated_sessions: u32,
    pub is_complete: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPlan {
    pub name: String,
    pub cue_description: String,
    pub criteria: String,
    pub category: Category,
    pub started_date: Option<NaiveDate>,
    pub steps: Vec<NewStep>,
}

/// Partial step update for `PUT /steps/{id}`
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct StepUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_sessions: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_complete: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewSessionNote {
    pub note: Option<String>,
    pub performed_date: Option<NaiveDate>,
}
