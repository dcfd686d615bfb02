use std::{collections::HashSet, fs::File, path::Path};

use serde::{Deserialize, Serialize};

const CATALOGDB: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/src/catalogdb.json"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Station {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spacecraft {
    pub id: u32,
    pub name: String,
}

/// Names for the station and spacecraft identifiers found in file headers.
///
/// The default catalog is embedded at compile-time. Use [Catalog::with_file] to load
/// a custom catalog, optionally merged with the built-in entries.
///
/// # Example
/// ```
/// use designation::Catalog;
///
/// let catalog = Catalog::default();
/// assert_eq!(catalog.station(12512).unwrap().name, "MOSX");
/// assert_eq!(catalog.spacecraft(720).unwrap().name, "Spektr-RG");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    stations: Vec<Station>,
    #[serde(default)]
    spacecrafts: Vec<Spacecraft>,
}

impl Default for Catalog {
    fn default() -> Self {
        serde_json::from_str(CATALOGDB).expect("built-in catalog is not valid")
    }
}

impl Catalog {
    /// Load a catalog from a JSON file. When `built_in` is set, built-in entries
    /// whose ids are not present in the file are added.
    ///
    /// # Errors
    /// If the file cannot be read or is not a valid catalog.
    pub fn with_file<P: AsRef<Path>>(path: P, built_in: bool) -> Result<Catalog, std::io::Error> {
        let mut catalog: Catalog = serde_json::from_reader(File::open(path)?)?;

        if built_in {
            let builtin = Catalog::default();

            let ids: HashSet<u32> = catalog.stations.iter().map(|s| s.id).collect();
            for station in builtin.stations {
                // file entries win
                if !ids.contains(&station.id) {
                    catalog.stations.push(station);
                }
            }
            let ids: HashSet<u32> = catalog.spacecrafts.iter().map(|s| s.id).collect();
            for spacecraft in builtin.spacecrafts {
                if !ids.contains(&spacecraft.id) {
                    catalog.spacecrafts.push(spacecraft);
                }
            }
        }

        Ok(catalog)
    }

    #[must_use]
    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    #[must_use]
    pub fn spacecrafts(&self) -> &[Spacecraft] {
        &self.spacecrafts
    }

    #[must_use]
    pub fn station(&self, id: u32) -> Option<&Station> {
        self.stations.iter().find(|s| s.id == id)
    }

    #[must_use]
    pub fn spacecraft(&self, id: u32) -> Option<&Spacecraft> {
        self.spacecrafts.iter().find(|s| s.id == id)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn default() {
        let catalog = Catalog::default();
        assert_eq!(catalog.station(32270).unwrap().name, "USS");
        assert!(catalog.station(1).is_none());
        assert_eq!(catalog.spacecraft(720).unwrap().name, "Spektr-RG");
    }

    #[test]
    fn with_file() {
        let tmpdir = tempfile::tempdir().unwrap();
        let out_path = tmpdir.path().join("catalog.json");
        fs::write(
            &out_path,
            r#"{
  "stations": [
    { "id": 12512, "name": "Medvezhi Ozera" },
    { "id": 1, "name": "TEST" }
  ]
}"#,
        )
        .unwrap();

        let catalog = Catalog::with_file(&out_path, false).unwrap();
        assert_eq!(catalog.stations().len(), 2);
        assert!(catalog.spacecrafts().is_empty());

        let catalog = Catalog::with_file(&out_path, true).unwrap();
        assert_eq!(
            catalog.station(12512).unwrap().name,
            "Medvezhi Ozera",
            "file entries should take precedence over built-ins"
        );
        assert_eq!(catalog.station(1).unwrap().name, "TEST");
        assert_eq!(catalog.station(12970).unwrap().name, "EVP");
        assert_eq!(catalog.spacecraft(720).unwrap().name, "Spektr-RG");
    }

    #[test]
    fn with_invalid_file() {
        let tmpdir = tempfile::tempdir().unwrap();
        let out_path = tmpdir.path().join("catalog.json");
        fs::write(&out_path, "not json").unwrap();

        assert!(Catalog::with_file(&out_path, true).is_err());
        assert!(Catalog::with_file(tmpdir.path().join("missing.json"), true).is_err());
    }
}
