//! Bundled image assets
//!
//! Sign images are referenced by filename in the question source and mapped
//! to bundled files through a static table. Unknown names have no asset.

use serde::Serialize;

/// Handle to a bundled image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct AssetKey(pub &'static str);

impl AssetKey {
    /// Path of the bundled file, relative to the page
    pub fn path(&self) -> &'static str {
        self.0
    }
}

/// Scene artwork that is not tied to a question
pub const SKY: AssetKey = AssetKey("assets/scene/sky.png");
pub const CAR: AssetKey = AssetKey("assets/scene/car.png");

/// Question image filename -> bundled sign artwork
const SIGN_TABLE: &[(&str, AssetKey)] = &[
    ("stop.png", AssetKey("assets/signs/stop.png")),
    ("give_way.png", AssetKey("assets/signs/give_way.png")),
    ("no_entry.png", AssetKey("assets/signs/no_entry.png")),
    ("no_overtaking.png", AssetKey("assets/signs/no_overtaking.png")),
    ("no_parking.png", AssetKey("assets/signs/no_parking.png")),
    ("speed_limit_30.png", AssetKey("assets/signs/speed_limit_30.png")),
    ("speed_limit_50.png", AssetKey("assets/signs/speed_limit_50.png")),
    ("school_zone.png", AssetKey("assets/signs/school_zone.png")),
    ("pedestrian_crossing.png", AssetKey("assets/signs/pedestrian_crossing.png")),
    ("roundabout.png", AssetKey("assets/signs/roundabout.png")),
    ("sharp_left.png", AssetKey("assets/signs/sharp_left.png")),
    ("sharp_right.png", AssetKey("assets/signs/sharp_right.png")),
    ("traffic_light.png", AssetKey("assets/signs/traffic_light.png")),
    ("u_turn_prohibited.png", AssetKey("assets/signs/u_turn_prohibited.png")),
    ("horn_prohibited.png", AssetKey("assets/signs/horn_prohibited.png")),
];

/// Resolve a question image filename (case-insensitive)
pub fn lookup(filename: &str) -> Option<AssetKey> {
    let name = filename.trim();
    SIGN_TABLE
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(name))
        .map(|(_, key)| *key)
}

/// Every asset the scene may draw, for preloading
pub fn all() -> impl Iterator<Item = AssetKey> {
    [SKY, CAR]
        .into_iter()
        .chain(SIGN_TABLE.iter().map(|(_, key)| *key))
}
