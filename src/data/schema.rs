use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// CategorySchema – how a dataset family encodes attributes in filenames
// ---------------------------------------------------------------------------

/// Declarative description of one dataset category.
///
/// A file `<prefix>_<a1>_<a2>_..._<aN>.csv` maps its underscore-separated
/// tokens positionally onto `attributes`. When `tail_absorbs_remainder` is set
/// the last attribute takes every remaining token, re-joined with `_`.
#[derive(Debug, PartialEq, Eq)]
pub struct CategorySchema {
    /// Display name, also the key in the dropdown cache.
    pub name: &'static str,
    /// Directory under the base location holding this category's CSVs.
    pub dir_name: &'static str,
    /// Filename prefix token (without the trailing `_`).
    pub prefix: &'static str,
    /// Ordered attribute names; also the CSV column names they filter on.
    pub attributes: &'static [&'static str],
    pub tail_absorbs_remainder: bool,
}

pub const COASTAL: CategorySchema = CategorySchema {
    name: "Coastal",
    dir_name: "Coastal",
    prefix: "inuncoast",
    attributes: &[
        "ClimateScenario",
        "Subsidence",
        "Year",
        "ReturnPeriod",
        "SeaLevelRiseScenario",
    ],
    tail_absorbs_remainder: true,
};

pub const RIVERINE: CategorySchema = CategorySchema {
    name: "Riverine",
    dir_name: "Riverine",
    prefix: "inunriver",
    attributes: &["ClimateScenario", "GlobalCirculationModel", "Year", "ReturnPeriod"],
    tail_absorbs_remainder: false,
};

/// All known categories, in UI order.
pub static CATEGORIES: [&CategorySchema; 2] = [&COASTAL, &RIVERINE];

impl CategorySchema {
    /// Parse a file name (with or without `.csv`) into attribute values.
    ///
    /// Returns `None` when there are fewer tokens than the prefix plus one per
    /// attribute. The prefix token itself is not checked.
    pub fn parse_filename(&self, file_name: &str) -> Option<BTreeMap<&'static str, String>> {
        let stem = file_name.strip_suffix(".csv").unwrap_or(file_name);
        let tokens: Vec<&str> = stem.split('_').collect();
        if tokens.len() < self.attributes.len() + 1 {
            return None;
        }

        let last = self.attributes.len() - 1;
        let mut values = BTreeMap::new();
        for (i, attr) in self.attributes.iter().enumerate() {
            let value = if i == last && self.tail_absorbs_remainder {
                tokens[i + 1..].join("_")
            } else {
                tokens[i + 1].to_string()
            };
            values.insert(*attr, value);
        }
        Some(values)
    }

    /// Rebuild the expected file name from one concrete value per attribute,
    /// in schema order.
    ///
    /// Returns `None` if any attribute is missing from `values`.
    pub fn target_filename<'a>(&self, values: impl Fn(&str) -> Option<&'a str>) -> Option<String> {
        let mut name = String::from(self.prefix);
        for attr in self.attributes {
            name.push('_');
            name.push_str(values(*attr)?);
        }
        name.push_str(".csv");
        Some(name)
    }
}
