pub mod discussion;
pub mod read_state;

/// SurrealDB reports a unique-index hit with an "already contains" message.
/// The create path treats it as "row exists", not as a failure.
pub(in crate::database) fn is_unique_index_violation(err: &surrealdb::Error) -> bool {
    err.to_string().contains("already contains")
}
