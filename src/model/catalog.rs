/// Club models offered by the bag form. "Other" switches the form to free text.
pub const CLUB_MODELS: &[&str] = &[
    "Cleveland RTX 6",
    "Cleveland RTX 6 ZipCore",
    "Cleveland RTX 5",
    "Cleveland RTX 4",
    "Cleveland CBX 4",
    "Cleveland CBX 3",
    "Cleveland Smart Sole 4",
    "Titleist Vokey SM10",
    "Titleist Vokey SM9",
    "Titleist Vokey SM8",
    "Titleist Vokey SM7",
    "Titleist Vokey SM6",
    "Callaway Jaws Raw",
    "Callaway Jaws MD5",
    "Callaway Jaws MD4",
    "Callaway Mack Daddy 5",
    "Callaway Mack Daddy 4",
    "TaylorMade MG4",
    "TaylorMade MG3",
    "TaylorMade MG2",
    "TaylorMade Hi-Toe Raw",
    "TaylorMade Hi-Toe 3",
    "Ping Glide 4.0",
    "Ping Glide 3.0",
    "Ping Glide 2.0",
    "Ping ChipR",
    "Mizuno T24",
    "Mizuno T22",
    "Mizuno T20",
    "Cobra King Snakebite",
    "Cobra King Wedge",
    "Wilson Harmonized",
    "Cleveland 588 RTX",
    "Cleveland 588 RTX 2.0",
    OTHER_CLUB,
];

pub const OTHER_CLUB: &str = "Other";

pub const DEFAULT_LOFT: u32 = 50;

#[must_use]
pub fn loft_options() -> Vec<u32> {
    (44..=64).step_by(2).collect()
}

/// Resolve the select + free-text pair from the bag form into a club name.
#[must_use]
pub fn resolve_club(selected: &str, custom: Option<&str>) -> String {
    if selected == OTHER_CLUB {
        custom.unwrap_or_default().trim().to_string()
    } else {
        selected.trim().to_string()
    }
}
