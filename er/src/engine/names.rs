//! Entity names and titan forms used by the narrative

use rand::Rng;
use rand::seq::IndexedRandom;

/// The twelve titan forms a cycle's entities take on
pub const TITAN_FORMS: [&str; 12] = [
    "Sky", "Earth", "Ocean", "Romance", "Burden", "Reason", "Trickery", "Strife", "Death", "Time", "Law", "Passage",
];

const PREFIXES: &[&str] = &[
    "Helios", "Erebus", "Hemera", "Tartarus", "Gaea", "Phoebe", "Rhea", "Theia", "Iapetus", "Krios", "Hyperion",
    "Chronos", "Mnemosyne", "Astraeus", "Aether", "Okeanos", "Pontus", "Thalassa", "Nyx", "Eos", "Selene", "Hypnos",
    "Thanatos", "Ananke", "Metis", "Pallas", "Perses", "Echidna", "Typhon", "Aion", "Neikos", "Leto", "Tethys",
    "Nesoi", "Uranus", "Chaos", "Asteria", "Lans",
];

const SUFFIXES: &[&str] = &[
    "Krios", "Uranus", "Phoebe", "Gaea", "Helios", "Astraeus", "Leto", "Tartarus", "Okeanos", "Echidna", "Typhon",
    "Pontus", "Thalassa", "Nesoi", "Hemera", "Selene", "Hypnos", "Aether", "Mnemosyne", "Nyx", "Eos", "Theia", "Rhea",
    "Iapetus", "Chronos", "Ananke", "Metis", "Pallas", "Perses", "Aion", "Neikos", "Tethys", "Chaos", "Asteria",
    "Lans", "Erebus", "Hyperion",
];

/// Generate a `{Prefix}{Suffix}-{code}` entity name
pub fn entity_name<R: Rng>(rng: &mut R) -> String {
    let prefix = PREFIXES.choose(rng).unwrap_or(&"Chaos");
    let suffix = SUFFIXES.choose(rng).unwrap_or(&"Aion");
    let code = rng.random_range(1000..=9999);
    format!("{}{}-{}", prefix, suffix, code)
}

/// Pick one of the titan forms
pub fn titan_form<R: Rng>(rng: &mut R) -> &'static str {
    TITAN_FORMS.choose(rng).copied().unwrap_or("Strife")
}

/// Reissue an entity's name with a fresh code, keeping the name part
pub fn inherit_name<R: Rng>(rng: &mut R, entity: &str) -> String {
    let stem = entity.split('-').next().unwrap_or(entity);
    format!("{}-{:04}", stem, rng.random_range(1..=9999))
}
