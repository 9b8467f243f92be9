//! The built-in term table.
//!
//! Keys are lowercase and space-separated; dash variants are derived when the
//! dictionary is built. Order matters when precedence is `dictionary-order`.

pub(super) const BUILTIN_TERMS: &[(&str, &str)] = &[
    // Acronyms & technical terms
    ("api", "API"),
    ("bbox", "BBox"),
    ("csv", "CSV"),
    ("geojson", "GeoJSON"),
    ("gtfs", "GTFS"),
    ("ios", "iOS"),
    ("ixn", "IXN"),
    ("josm", "JOSM"),
    ("json", "JSON"),
    ("osm", "OSM"),
    ("osw", "OSW"),
    ("pbf", "PBF"),
    ("sclio", "SCLIO"),
    ("tcat", "TCAT"),
    ("tdei", "TDEI"),
    ("url", "URL"),
    ("us", "US"),
    // Products & projects
    ("accessmap", "AccessMap"),
    ("aviv scoutroute", "AVIV ScoutRoute"),
    ("opensidewalks", "OpenSidewalks"),
    ("openstreetmap", "OpenStreetMap"),
    ("os connect", "OS-CONNECT"),
    ("rapid", "Rapid"),
    ("tcat wiki", "TCAT Wiki"),
    ("tdei core", "TDEI Core"),
    ("tdei walkshed", "TDEI Walkshed"),
    ("tdei workspaces", "TDEI Workspaces"),
    ("walksheds", "Walksheds"),
    ("workspaces", "Workspaces"),
    // UI & navigation terms
    ("guides list", "Guides List"),
    ("how to", "How To"),
    ("log in", "Log In"),
    ("logging in", "Logging In"),
    ("qa qc", "QA/QC"),
    ("subreport a", "Subreport A"),
    ("user manual", "User Manual"),
    // Events
    ("mny26", "Mappy New Year 2026"),
    ("nda vancouver", "Clark County Walk/Roll Event"),
    ("olympia connected", "Olympia, Connected"),
    ("oswmh", "OpenSidewalks Mappy Hours"),
    ("otp26", "OpenThePaths 2026"),
    // Articles, prepositions & conjunctions
    ("a", "a"),
    ("an", "an"),
    ("and", "and"),
    ("are", "are"),
    ("as", "as"),
    ("for", "for"),
    ("in", "in"),
    ("is", "is"),
    ("of", "of"),
    ("on", "on"),
    ("or", "or"),
    ("the", "the"),
    ("to", "to"),
    ("via", "via"),
    ("with", "with"),
    ("your", "your"),
];
