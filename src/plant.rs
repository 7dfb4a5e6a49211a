use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

fn default_moisture_opt() -> f64 {
    60.0
}

fn default_humidity_min() -> f64 {
    40.0
}

fn default_humidity_max() -> f64 {
    70.0
}

/// One species entry of the plant catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantRecord {
    pub id: String,
    #[serde(alias = "name_kr", default)]
    pub name: String,
    #[serde(default)]
    pub latin: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub light_level: i32,
    #[serde(default)]
    pub water_days: u32,
    pub min_temp: i32,
    pub max_temp: i32,
    #[serde(default = "default_moisture_opt")]
    pub moisture_opt: f64,
    #[serde(default)]
    pub temp_min: Option<f64>,
    #[serde(default)]
    pub temp_max: Option<f64>,
    #[serde(default = "default_humidity_min")]
    pub humidity_min: f64,
    #[serde(default = "default_humidity_max")]
    pub humidity_max: f64,
}

impl PlantRecord {
    pub fn bounds(&self) -> PlantBounds {
        PlantBounds {
            moisture_opt: self.moisture_opt.clamp(0.0, 100.0),
            temp_min: self.temp_min.unwrap_or(self.min_temp as f64),
            temp_max: self.temp_max.unwrap_or(self.max_temp as f64),
            humidity_min: self.humidity_min,
            humidity_max: self.humidity_max,
            water_days: self.water_days,
            light_level: self.light_level.clamp(0, 2) as u8,
        }
    }
}

/// Care requirements of the selected species; fixed for a session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlantBounds {
    pub moisture_opt: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity_min: f64,
    pub humidity_max: f64,
    pub water_days: u32,
    pub light_level: u8,
}

#[derive(Debug, Error)]
pub enum CatalogueError {
    #[error("failed to read plant catalogue: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse plant catalogue: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("plant catalogue is empty")]
    Empty,
}

#[derive(Debug, Clone, Default)]
pub struct PlantCatalogue {
    plants: Vec<PlantRecord>,
}

impl PlantCatalogue {
    pub fn new(plants: Vec<PlantRecord>) -> Self {
        Self { plants }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogueError> {
        let text = fs::read_to_string(path.as_ref())?;
        let catalogue = Self::from_json(&text)?;
        info!(
            path = %path.as_ref().display(),
            count = catalogue.len(),
            "plant catalogue loaded"
        );
        Ok(catalogue)
    }

    pub fn from_json(text: &str) -> Result<Self, CatalogueError> {
        let plants: Vec<PlantRecord> = serde_json::from_str(text)?;
        if plants.is_empty() {
            return Err(CatalogueError::Empty);
        }
        Ok(Self { plants })
    }

    pub fn len(&self) -> usize {
        self.plants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plants.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PlantRecord> {
        self.plants.get(index)
    }

    pub fn find_index(&self, id: &str) -> Option<usize> {
        if id.is_empty() {
            return None;
        }
        self.plants.iter().position(|plant| plant.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlantRecord> {
        self.plants.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOGUE: &str = r#"[
        {"id": "monstera", "name_kr": "몬스테라", "latin": "Monstera deliciosa",
         "light_level": 1, "water_days": 7, "min_temp": 18, "max_temp": 27,
         "moisture_opt": 55, "humidity_min": 50, "humidity_max": 80},
        {"id": "cactus", "name": "Cactus", "light_level": 5, "water_days": 21,
         "min_temp": 10, "max_temp": 35}
    ]"#;

    #[test]
    fn parses_records_and_defaults() {
        let catalogue = PlantCatalogue::from_json(CATALOGUE).unwrap();
        assert_eq!(catalogue.len(), 2);

        let monstera = catalogue.get(0).unwrap();
        assert_eq!(monstera.name, "몬스테라");
        let bounds = monstera.bounds();
        assert_eq!(bounds.moisture_opt, 55.0);
        assert_eq!((bounds.temp_min, bounds.temp_max), (18.0, 27.0));

        let cactus = catalogue.get(1).unwrap().bounds();
        assert_eq!(cactus.light_level, 2, "light level clamps into 0..=2");
        assert_eq!(cactus.moisture_opt, 60.0);
        assert_eq!((cactus.humidity_min, cactus.humidity_max), (40.0, 70.0));
    }

    #[test]
    fn finds_by_id() {
        let catalogue = PlantCatalogue::from_json(CATALOGUE).unwrap();
        assert_eq!(catalogue.find_index("cactus"), Some(1));
        assert_eq!(catalogue.find_index("fern"), None);
        assert_eq!(catalogue.find_index(""), None);
        assert!(catalogue.get(2).is_none());
    }

    #[test]
    fn empty_or_broken_catalogue_is_rejected() {
        assert!(matches!(
            PlantCatalogue::from_json("[]"),
            Err(CatalogueError::Empty)
        ));
        assert!(matches!(
            PlantCatalogue::from_json("{"),
            Err(CatalogueError::Parse(_))
        ));
    }
}
