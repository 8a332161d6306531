//! Column mapping used when no mapping document is supplied.

/// Output column → accepted aliases, in output order.
pub(super) const DEFAULT_COLUMNS: &[(&str, &[&str])] = &[
    (
        "POS Name",
        &[
            "POS Name",
            "Store Name",
            "STORE DATA JANUARY 2025",
            "STORE DATA AS OF JANUARY 31",
        ],
    ),
    ("Retailer", &["Retailer", "Retailer Name"]),
    ("Territory", &["Territory", "Store Tagging Territory"]),
    ("TSM", &["TSM"]),
    ("Retail Sales", &["Retail Sales"]),
    ("Tonik Sales", &["Tonik Sales"]),
    ("NC Sales", &["NC Sales", "HC Sales"]),
    ("Skyro Sales", &["Skyro Sales"]),
    ("Salmon", &["Salmon"]),
    ("In-House", &["In-House"]),
    ("Credit card", &["Credit card"]),
    ("Cash Sales", &["Cash Sales"]),
    ("Others", &["Others"]),
    ("Retailer Headcount", &["Retailer Headcount"]),
    ("Tonik Headcount", &["Tonik Headcount", "Tonik Promoter Count"]),
    ("NC Headcount", &["NC Headcount", "HC Promoter Count"]),
    ("Skyro Headcount", &["Skyro Headcount"]),
    ("Salmon Headcount", &["Salmon Headcount"]),
    ("Remarks", &["Remarks"]),
];
