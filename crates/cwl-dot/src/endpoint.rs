//! Maps a step's externally visible port onto the matching port of the
//! process it embeds.

use crate::{CwlDotError, Process, shortname};

/// First candidate whose shortname equals the shortname of `port_id`.
pub fn resolve_endpoint<'a, I>(port_id: &str, candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let wanted = shortname(port_id);
    candidates
        .into_iter()
        .find(|candidate| shortname(candidate) == wanted)
}

pub fn resolve_input_endpoint<'p>(
    port_id: &str,
    process: &'p Process,
) -> Result<&'p str, CwlDotError> {
    resolve_endpoint(port_id, process.input_ids()).ok_or_else(|| unresolved(port_id, process))
}

pub fn resolve_output_endpoint<'p>(
    port_id: &str,
    process: &'p Process,
) -> Result<&'p str, CwlDotError> {
    resolve_endpoint(port_id, process.output_ids()).ok_or_else(|| unresolved(port_id, process))
}

fn unresolved(port_id: &str, process: &Process) -> CwlDotError {
    CwlDotError::UnresolvedEndpoint {
        port: port_id.to_string(),
        process: process.id().to_string(),
    }
}
