//! Roster Manager
//!
//! Animal list state, client-side sorting and the add-animal form.

use std::cmp::Ordering;

use feruca::Collator;

use crate::error::{ApiError, ApiResult, FormError};
use crate::models::{Animal, NewAnimal, Sex, Species};

pub const LOAD_FAILED: &str = "Failed to load animals";
pub const ADD_FAILED: &str = "Failed to add animal";
pub const DELETE_FAILED: &str = "Failed to delete animal";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortField {
    Name,
    Species,
    Sex,
    Age,
    Location,
}

impl SortField {
    pub const ALL: [SortField; 5] = [
        SortField::Name,
        SortField::Species,
        SortField::Sex,
        SortField::Age,
        SortField::Location,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SortField::Name => "Name",
            SortField::Species => "Species",
            SortField::Sex => "Sex",
            SortField::Age => "Age",
            SortField::Location => "Location",
        }
    }

    /// Lowercased text the column sorts by; missing values sort as ""
    fn key(&self, animal: &Animal) -> String {
        let raw = match self {
            SortField::Name => animal.name.clone(),
            SortField::Species => animal.species.as_str().to_string(),
            SortField::Sex => animal.sex.as_str().to_string(),
            SortField::Age => animal.age.map(|a| a.to_string()).unwrap_or_default(),
            SortField::Location => animal.location.clone().unwrap_or_default(),
        };
        raw.to_lowercase()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            field: SortField::Name,
            direction: SortDirection::Ascending,
        }
    }
}

impl SortState {
    /// Column header click: same column flips, new column starts ascending
    pub fn toggle(&mut self, field: SortField) {
        if self.field == field {
            self.direction = self.direction.flipped();
        } else {
            self.field = field;
            self.direction = SortDirection::Ascending;
        }
    }

    pub fn indicator(&self, field: SortField) -> &'static str {
        if self.field != field {
            return "↕️";
        }
        match self.direction {
            SortDirection::Ascending => "↑",
            SortDirection::Descending => "↓",
        }
    }
}

/// Unicode collation (CLDR root order), falling back to code points so
/// only identical keys compare equal
fn collate(collator: &mut Collator, a: &str, b: &str) -> Ordering {
    collator.collate(a, b).then_with(|| a.cmp(b))
}

/// Stable sort by the active column, in collation order, so "Émile" sorts
/// between "Ava" and "Zoe".
///
/// Ages compare as text, so "10" sorts before "9".
pub fn sort_animals(animals: &[Animal], sort: SortState) -> Vec<Animal> {
    let mut collator = Collator::default();
    let mut keyed: Vec<(String, &Animal)> = animals
        .iter()
        .map(|a| (sort.field.key(a), a))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| match sort.direction {
        SortDirection::Ascending => collate(&mut collator, a, b),
        SortDirection::Descending => collate(&mut collator, b, a),
    });
    keyed.into_iter().map(|(_, a)| a.clone()).collect()
}

/// Add-animal form, held as the raw input strings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimalForm {
    pub name: String,
    pub species: String,
    pub sex: String,
    pub age: String,
    pub location: String,
}

impl AnimalForm {
    pub fn to_new_animal(&self) -> Result<NewAnimal, FormError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(FormError::Missing("name"));
        }
        if self.species.is_empty() {
            return Err(FormError::Missing("species"));
        }
        let sex = self.sex.parse::<Sex>()?;
        let age = match self.age.trim() {
            "" => None,
            text => Some(text.parse::<u32>().map_err(|_| FormError::InvalidAge)?),
        };
        let location = Some(self.location.trim().to_string()).filter(|l| !l.is_empty());

        Ok(NewAnimal {
            name: name.to_string(),
            species: Species::from(self.species.clone()),
            sex,
            age,
            location,
        })
    }
}

/// Everything the roster page shows
#[derive(Debug, Clone, PartialEq)]
pub struct RosterState {
    pub animals: Vec<Animal>,
    pub loading: bool,
    pub error: Option<String>,
    pub submitting: bool,
    pub form: AnimalForm,
    pub sort: SortState,
}

impl Default for RosterState {
    fn default() -> Self {
        Self {
            animals: Vec::new(),
            loading: true,
            error: None,
            submitting: false,
            form: AnimalForm::default(),
            sort: SortState::default(),
        }
    }
}

impl RosterState {
    pub fn sorted(&self) -> Vec<Animal> {
        sort_animals(&self.animals, self.sort)
    }

    pub fn begin_load(&mut self) {
        self.loading = true;
    }

    /// A 401 has already ended the session, so it only stops the spinner
    pub fn finish_load(&mut self, result: ApiResult<Vec<Animal>>) {
        self.loading = false;
        match result {
            Ok(animals) => self.animals = animals,
            Err(e) => {
                if let Some(message) = e.user_message(LOAD_FAILED) {
                    self.error = Some(message);
                }
            }
        }
    }

    /// Validated payload, or `None` while a submission is in flight or the
    /// form is incomplete
    pub fn begin_submit(&mut self) -> Option<NewAnimal> {
        if self.submitting {
            return None;
        }
        match self.form.to_new_animal() {
            Ok(animal) => {
                self.submitting = true;
                self.error = None;
                Some(animal)
            }
            Err(e) => {
                self.error = Some(e.to_string());
                None
            }
        }
    }

    pub fn finish_submit(&mut self, result: ApiResult<Animal>) {
        self.submitting = false;
        match result {
            Ok(animal) => {
                log::info!("[ROSTER] added {} (#{})", animal.name, animal.id);
                self.form = AnimalForm::default();
            }
            Err(ApiError::Unauthorized) => {}
            Err(_) => self.error = Some(ADD_FAILED.to_string()),
        }
    }

    pub fn finish_delete(&mut self, animal_id: u32, result: ApiResult<()>) {
        match result {
            Ok(()) => self.animals.retain(|a| a.id != animal_id),
            Err(e) => {
                if let Some(message) = e.user_message(DELETE_FAILED) {
                    self.error = Some(message);
                }
            }
        }
    }
}
