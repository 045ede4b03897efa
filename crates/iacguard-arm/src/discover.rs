use anyhow::{Context, bail};
use camino::{Utf8Path, Utf8PathBuf};
use globset::{Glob, GlobSet, GlobSetBuilder};
use iacguard_types::SourcePath;
use std::path::PathBuf;
use walkdir::WalkDir;

/// Find candidate template files (`*.json`) under `dir`, relative to `fs_root`.
///
/// Paths come back relative to `fs_root` with `/` separators, sorted, minus anything matching
/// `exclude`. Unreadable entries below `dir` are skipped; a missing `dir` is an error.
pub fn discover_templates(
    fs_root: &Utf8Path,
    dir: &str,
    exclude: Option<&GlobSet>,
) -> anyhow::Result<Vec<SourcePath>> {
    let start = if dir.is_empty() || dir == "." {
        fs_root.to_path_buf()
    } else {
        fs_root.join(dir)
    };
    if !start.is_dir() {
        bail!("scan directory {start} does not exist");
    }

    let mut out: Vec<SourcePath> = WalkDir::new(&start)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| pathbuf_to_utf8(e.path().to_path_buf()))
        .filter(|abs| {
            abs.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
        })
        .map(|abs| {
            let rel = abs
                .strip_prefix(fs_root)
                .unwrap_or(&abs)
                .as_str()
                .replace('\\', "/");
            SourcePath::new(rel)
        })
        .filter(|rel| !exclude.is_some_and(|set| set.is_match(rel.as_str())))
        .collect();

    // Stable order.
    out.sort();
    out.dedup();
    Ok(out)
}

pub fn build_globset(patterns: &[String]) -> anyhow::Result<GlobSet> {
    let mut b = GlobSetBuilder::new();
    for p in patterns {
        b.add(Glob::new(p).with_context(|| format!("invalid exclude pattern {p:?}"))?);
    }
    Ok(b.build()?)
}

fn pathbuf_to_utf8(path: PathBuf) -> Option<Utf8PathBuf> {
    Utf8PathBuf::from_path_buf(path).ok()
}
