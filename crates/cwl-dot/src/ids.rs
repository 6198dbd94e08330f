//! Pure projections over URI-shaped identifiers.
//!
//! Identifiers produced by the loader look like `file:///dir/wf.cwl#step/port`
//! or, for packed documents, `file:///dir/wf.cwl#main/step/port`. None of these
//! helpers allocate or fail.

/// Last path segment of the fragment, or of the path when there is no fragment.
pub fn shortname(id: &str) -> &str {
    let tail = match id.rfind('#') {
        Some(hash) if hash + 1 < id.len() => &id[hash + 1..],
        Some(hash) => &id[..hash],
        None => id,
    };
    end_of_uri(tail)
}

/// Everything after the last `/`.
pub fn end_of_uri(id: &str) -> &str {
    id.rsplit('/').next().unwrap_or(id)
}

/// Everything before the last `#`, or the whole id when there is none.
pub fn before_hash(id: &str) -> &str {
    match id.rfind('#') {
        Some(hash) => &id[..hash],
        None => id,
    }
}

/// Everything after whichever of `#` or `/` comes last.
pub fn after_last_hash_or_slash(id: &str) -> &str {
    match (id.rfind('#'), id.rfind('/')) {
        (None, None) => id,
        (hash, slash) => {
            let cut = hash.max(slash).unwrap_or_default();
            &id[cut + 1..]
        }
    }
}

/// Human-facing name of a process, step or port.
///
/// With exactly one `#` the whole fragment is used (so `wf.cwl#main/step`
/// reads `main/step`); otherwise the last path segment.
pub fn display_name(id: &str) -> &str {
    let mut regions = id.split('#');
    match (regions.next(), regions.next(), regions.next()) {
        (Some(_), Some(fragment), None) => fragment,
        _ => end_of_uri(id),
    }
}

/// Identifier of the process (or step) that owns `port_id`.
///
/// When the fragment starts after the last `/` the id already names a
/// process; otherwise the last `/` segment is dropped.
pub fn owning_process_id(port_id: &str) -> &str {
    match (port_id.rfind('/'), port_id.rfind('#')) {
        (Some(slash), Some(hash)) if slash < hash => port_id,
        (None, Some(_)) => port_id,
        (Some(slash), _) => &port_id[..slash],
        (None, None) => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEP_PORT: &str = "file:///work/wf.cwl#align/reads";

    #[test]
    fn shortname_fragment_and_path_expected_last_segment() {
        assert_eq!(shortname(STEP_PORT), "reads");
        assert_eq!(shortname("file:///work/tools/bwa.cwl"), "bwa.cwl");
        assert_eq!(shortname("file:///work/tools/bwa.cwl#index"), "index");
        assert_eq!(shortname("plain"), "plain");
    }

    #[test]
    fn before_hash_without_fragment_expected_identity() {
        assert_eq!(before_hash(STEP_PORT), "file:///work/wf.cwl");
        assert_eq!(before_hash("file:///work/wf.cwl"), "file:///work/wf.cwl");
    }

    #[test]
    fn after_last_hash_or_slash_expected_trailing_name() {
        assert_eq!(after_last_hash_or_slash(STEP_PORT), "reads");
        assert_eq!(after_last_hash_or_slash("file:///work/wf.cwl#input"), "input");
        assert_eq!(after_last_hash_or_slash("nothing"), "nothing");
    }

    #[test]
    fn display_name_single_fragment_expected_whole_fragment() {
        assert_eq!(display_name("file:///work/wf.cwl#main/align"), "main/align");
        assert_eq!(display_name("file:///work/wf.cwl"), "wf.cwl");
        assert_eq!(display_name("file:///a#b#c/d"), "d");
    }

    #[test]
    fn owning_process_id_port_expected_step_id() {
        assert_eq!(owning_process_id(STEP_PORT), "file:///work/wf.cwl#align");
        assert_eq!(
            owning_process_id("file:///work/wf.cwl#align"),
            "file:///work/wf.cwl#align"
        );
        assert_eq!(owning_process_id("#input"), "#input");
        assert_eq!(owning_process_id("literal3"), "");
    }
}
