//! Request fingerprints for duplicate-job detection.

use super::job::GenerationJob;

fn canonical<S: AsRef<str>>(ids: &[S]) -> String {
    let mut sorted: Vec<&str> = ids.iter().map(|s| s.as_ref()).collect();
    sorted.sort_unstable();
    sorted.join(",")
}

/// `sorted categories joined by "," | sorted prompts joined by ","`.
///
/// Input order never matters. Duplicates are kept, so `[a, a]` and `[a]`
/// differ.
pub fn fingerprint<S: AsRef<str>, P: AsRef<str>>(category_ids: &[S], prompt_ids: &[P]) -> String {
    format!("{}|{}", canonical(category_ids), canonical(prompt_ids))
}

pub fn job_fingerprint(job: &GenerationJob) -> String {
    fingerprint(&job.category_ids, &job.selected_prompts)
}

/// First job in `candidates` with the given fingerprint. Callers pass jobs
/// newest first, so the most recent match wins.
pub fn find_duplicate<'a>(candidates: &'a [GenerationJob], fp: &str) -> Option<&'a GenerationJob> {
    candidates.iter().find(|job| job_fingerprint(job) == fp)
}
