// ============================================================
// Layer 3 — Form Field Layout
// ============================================================
// Human-readable labels and help text for the housing columns
// the form knows about. The trained schema decides which
// fields actually exist; this table only decorates them and
// supplies a layout when running without artifacts.

/// Display metadata for one form field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldInfo {
    pub name:  &'static str,
    pub label: &'static str,
    pub help:  &'static str,
}

pub const NUMERIC_FIELDS: [FieldInfo; 9] = [
    FieldInfo { name: "lotSize",    label: "Lot size (acres)",         help: "Total land area of the lot." },
    FieldInfo { name: "age",        label: "Age (years)",              help: "Age of the property in years." },
    FieldInfo { name: "landValue",  label: "Land value ($)",           help: "Estimated value of the land without the house." },
    FieldInfo { name: "livingArea", label: "Living area (sqft)",       help: "Built living area in square feet." },
    FieldInfo { name: "pctCollege", label: "% college educated",       help: "Share of the neighbourhood with a college degree." },
    FieldInfo { name: "bedrooms",   label: "Bedrooms",                 help: "Number of bedrooms." },
    FieldInfo { name: "fireplaces", label: "Fireplaces",               help: "Number of fireplaces in the house." },
    FieldInfo { name: "bathrooms",  label: "Bathrooms",                help: "Number of full bathrooms." },
    FieldInfo { name: "rooms",      label: "Rooms",                    help: "Total number of rooms, kitchen and living room included." },
];

pub const CATEGORICAL_FIELDS: [FieldInfo; 6] = [
    FieldInfo { name: "heating",         label: "Heating type",     help: "Heating system of the house." },
    FieldInfo { name: "fuel",            label: "Fuel source",      help: "Fuel used for heating." },
    FieldInfo { name: "sewer",           label: "Sewer system",     help: "Kind of sewage connection." },
    FieldInfo { name: "waterfront",      label: "Waterfront",       help: "Whether the property faces water." },
    FieldInfo { name: "newConstruction", label: "New construction", help: "Whether the house is newly built." },
    FieldInfo { name: "centralAir",      label: "Central air",      help: "Whether the house has central air conditioning." },
];

/// Fields that must be non-zero before the form submits a request.
pub const REQUIRED_POSITIVE_FIELDS: [&str; 2] = ["livingArea", "lotSize"];

/// Option shown for every categorical field in demo mode.
pub const DEMO_OPTION: &str = "Demo";

fn lookup(name: &str) -> Option<&'static FieldInfo> {
    NUMERIC_FIELDS
        .iter()
        .chain(CATEGORICAL_FIELDS.iter())
        .find(|f| f.name == name)
}

/// Display label for a column, falling back to the raw name.
pub fn label_for(name: &str) -> &str {
    lookup(name).map(|f| f.label).unwrap_or(name)
}

pub fn help_for(name: &str) -> Option<&'static str> {
    lookup(name).map(|f| f.help)
}
