/// Common identifying field for event identities (i.e., activities)
///
/// _Note_: While the concept XES extension is the de-facto standard for identifying activity names,
/// some XES files might not use `concept:name` or have events without a `concept:name` attribute.
/// Such events are rejected during import unless a global event default is declared.
pub const ACTIVITY_NAME: &str = "concept:name";
