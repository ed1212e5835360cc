//! Path utilities: lexical relative paths and locale-aware collation
//!
//! Relative paths are computed lexically (no symlink resolution), so two
//! paths that reach the same file through different links stay distinct.

use std::cmp::Ordering;
use std::path::{Component, Path, PathBuf};
use icu_collator::{Collator, CollatorOptions};

/// Resolve `path` against `base` and drop `.`/`..` components lexically
pub fn absolutize(base: &Path, path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Never pop past the root
                if normalized.file_name().is_some() {
                    normalized.pop();
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Path of `target` relative to `base`, both resolved against `cwd`
///
/// Returns an empty string when both resolve to the same location.
pub fn relative_to(cwd: &Path, base: &Path, target: &Path) -> String {
    let base = absolutize(cwd, base);
    let target = absolutize(cwd, target);

    let base_components: Vec<Component<'_>> = base.components().collect();
    let target_components: Vec<Component<'_>> = target.components().collect();

    let common = base_components
        .iter()
        .zip(target_components.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..base_components.len() {
        relative.push("..");
    }
    for component in &target_components[common..] {
        relative.push(component.as_os_str());
    }
    relative.to_string_lossy().into_owned()
}

thread_local! {
    static ROOT_COLLATOR: Option<Collator> =
        Collator::try_new(&Default::default(), CollatorOptions::new()).ok();
}

/// Root-locale (CLDR) collation order only; canonically equivalent strings
/// compare equal
fn collate(a: &str, b: &str) -> Ordering {
    ROOT_COLLATOR.with(|collator| match collator {
        Some(collator) => collator.compare(a, b),
        None => a.cmp(b),
    })
}

/// Locale-aware string comparison
///
/// Root-locale collation (the ordering JavaScript's `localeCompare` gives
/// without a locale argument): punctuation and symbols in CLDR order, then
/// digits, then letters; accents secondary; lowercase before uppercase.
/// Strings that collate equal fall back to code point order so the result
/// is a total order.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    collate(a, b).then_with(|| a.cmp(b))
}
