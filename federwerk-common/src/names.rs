//! Random display names. Users never pick their own name; one is rolled
//! at registration and re-rolled on login or on demand.

const ADJECTIVES: &[&str] = &[
    "Amber", "Bold", "Brisk", "Clever", "Crimson", "Daring", "Dusty", "Eager", "Gentle", "Golden",
    "Hazy", "Jolly", "Keen", "Lively", "Lunar", "Mellow", "Nimble", "Quiet", "Rustic", "Silent",
    "Snowy", "Stormy", "Swift", "Velvet", "Wandering", "Witty",
];

const NOUNS: &[&str] = &[
    "Badger", "Bison", "Crane", "Falcon", "Fox", "Heron", "Ibex", "Lynx", "Magpie", "Marten",
    "Otter", "Owl", "Pike", "Raven", "Robin", "Salmon", "Sparrow", "Stag", "Swallow", "Weasel",
    "Wolf", "Wren",
];

/// Rolls a fresh `Adjective Noun` display name. Repeats are allowed.
#[must_use]
pub fn generate_name() -> String {
    let adjective = ADJECTIVES[rand::random_range(0..ADJECTIVES.len())];
    let noun = NOUNS[rand::random_range(0..NOUNS.len())];

    format!("{adjective} {noun}")
}
