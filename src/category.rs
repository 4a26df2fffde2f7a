//! Tag-to-category mapping
//!
//! OpenStreetMap records carry loosely structured key/value tags. The mapping
//! into [`PoiCategory`] is an ordered rule table: rules are evaluated top to
//! bottom and the first one that matches decides the category.

use std::collections::HashMap;

use crate::models::PoiCategory;

/// A single mapping rule keyed on one tag
#[derive(Debug)]
enum Rule {
    /// Tag value looked up in a fixed table
    Lookup {
        key: &'static str,
        table: &'static [(&'static str, PoiCategory)],
    },
    /// Tag present with any value
    Present {
        key: &'static str,
        category: PoiCategory,
    },
    /// Tag value is one of a fixed set
    OneOf {
        key: &'static str,
        values: &'static [&'static str],
        category: PoiCategory,
    },
}

impl Rule {
    fn evaluate(&self, tags: &HashMap<String, String>) -> Option<PoiCategory> {
        match self {
            Rule::Lookup { key, table } => {
                let value = tags.get(*key)?;
                table
                    .iter()
                    .find(|(candidate, _)| *candidate == value.as_str())
                    .map(|(_, category)| *category)
            }
            Rule::Present { key, category } => tags.get(*key).map(|_| *category),
            Rule::OneOf {
                key,
                values,
                category,
            } => {
                let value = tags.get(*key)?;
                values.contains(&value.as_str()).then_some(*category)
            }
        }
    }
}

const AMENITY_TABLE: &[(&str, PoiCategory)] = &[
    ("restaurant", PoiCategory::Restaurant),
    ("fast_food", PoiCategory::Restaurant),
    ("cafe", PoiCategory::Cafe),
    ("bar", PoiCategory::Bar),
    ("pub", PoiCategory::Bar),
    ("pharmacy", PoiCategory::Pharmacy),
    ("bank", PoiCategory::Bank),
    ("atm", PoiCategory::Bank),
    ("fuel", PoiCategory::GasStation),
    ("hospital", PoiCategory::Hospital),
    ("clinic", PoiCategory::Hospital),
    ("parking", PoiCategory::Parking),
];

const TOURISM_TABLE: &[(&str, PoiCategory)] = &[
    ("hotel", PoiCategory::Hotel),
    ("hostel", PoiCategory::Hotel),
    ("motel", PoiCategory::Hotel),
    ("museum", PoiCategory::Museum),
    ("gallery", PoiCategory::Museum),
    ("attraction", PoiCategory::Attraction),
    ("viewpoint", PoiCategory::Attraction),
];

const RULES: &[Rule] = &[
    Rule::Lookup {
        key: "amenity",
        table: AMENITY_TABLE,
    },
    Rule::Lookup {
        key: "tourism",
        table: TOURISM_TABLE,
    },
    Rule::Present {
        key: "shop",
        category: PoiCategory::Shop,
    },
    Rule::OneOf {
        key: "leisure",
        values: &["park", "garden"],
        category: PoiCategory::Park,
    },
];

/// Map a tag set to exactly one category, falling back to `Other`
#[must_use]
pub fn map_category(tags: &HashMap<String, String>) -> PoiCategory {
    RULES
        .iter()
        .find_map(|rule| rule.evaluate(tags))
        .unwrap_or(PoiCategory::Other)
}
